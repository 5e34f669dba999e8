use crate::controller::Controller;
use crate::model::{Entry, format_header_date};
use crate::tui::state::{AppState, Focus, InputMode};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

pub const STAR_FILLED: &str = "★";
pub const STAR_EMPTY: &str = "☆";

pub const NO_DATE_PROMPT: &str = "select a date to get birthdays";
pub const NO_FAVORITES: &str = "No birthdays added";
pub const FETCH_ERROR: &str = "Error fetching birthdays";

fn entry_item<'a>(controller: &Controller, entry: &'a Entry) -> ListItem<'a> {
    // Star state comes from the favorites set at render time.
    let (star, star_style) = if controller.is_favorite(entry) {
        (STAR_FILLED, Style::default().fg(Color::Yellow))
    } else {
        (STAR_EMPTY, Style::default().fg(Color::DarkGray))
    };
    ListItem::new(Line::from(vec![
        Span::styled(star, star_style),
        Span::raw(" "),
        Span::raw(entry.to_string()),
    ]))
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style)
}

fn highlight() -> Style {
    Style::default()
        .add_modifier(Modifier::BOLD)
        .bg(Color::DarkGray)
}

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(v_chunks[1]);

    // --- Date selector ---
    let selector_text = match state.mode {
        InputMode::EnteringDate => format!("> {}", state.input_buffer),
        InputMode::Normal => match state.controller.selected_date() {
            Some(d) => format!("{}  ({})", d.format("%Y-%m-%d"), format_header_date(d)),
            None => "Press / to enter a date".to_string(),
        },
    };
    let selector_style = if state.mode == InputMode::EnteringDate {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let mut selector_title = " Select a date ".to_string();
    if state.controller.is_loading() {
        selector_title.push_str("(Loading...) ");
    }
    let selector = Paragraph::new(selector_text)
        .style(selector_style)
        .block(Block::default().borders(Borders::ALL).title(selector_title));
    f.render_widget(selector, v_chunks[0]);
    if state.mode == InputMode::EnteringDate {
        let cursor_x = v_chunks[0].x + 3 + state.cursor_position as u16;
        f.set_cursor_position((cursor_x, v_chunks[0].y + 1));
    }

    // --- Results ---
    let results_focused = state.active_focus == Focus::Results;
    match state.controller.selected_date() {
        None => {
            let prompt = Paragraph::new(NO_DATE_PROMPT)
                .block(panel_block(" Birthdays ".to_string(), results_focused));
            f.render_widget(prompt, h_chunks[0]);
        }
        Some(d) => {
            let block = panel_block(
                format!(" Birthdays on {}: ", format_header_date(d)),
                results_focused,
            );
            if state.controller.is_loading() {
                let loading = Paragraph::new("Loading...")
                    .style(Style::default().fg(Color::Cyan))
                    .block(block);
                f.render_widget(loading, h_chunks[0]);
            } else {
                let items: Vec<ListItem> = state
                    .controller
                    .results()
                    .iter()
                    .map(|e| entry_item(&state.controller, e))
                    .collect();
                let list = List::new(items).block(block).highlight_style(highlight());
                f.render_stateful_widget(list, h_chunks[0], &mut state.results_state);
            }
        }
    }

    // --- Favorites ---
    let fav_block = panel_block(
        " Favorite Birthdays: ".to_string(),
        state.active_focus == Focus::Favorites,
    );
    if state.controller.favorites().is_empty() {
        f.render_widget(Paragraph::new(NO_FAVORITES).block(fav_block), h_chunks[1]);
    } else {
        let items: Vec<ListItem> = state
            .controller
            .favorites()
            .iter()
            .map(|e| entry_item(&state.controller, e))
            .collect();
        let list = List::new(items).block(fav_block).highlight_style(highlight());
        f.render_stateful_widget(list, h_chunks[1], &mut state.favorites_state);
    }

    // --- Footer ---
    let f_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(v_chunks[2]);
    let status_color = if state.message.contains("Error") {
        Color::Red
    } else {
        Color::Cyan
    };
    let status = Paragraph::new(state.message.clone())
        .style(Style::default().fg(status_color))
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                .title(" Status "),
        );
    let help_text = match state.mode {
        InputMode::EnteringDate => "Enter: Select | Esc: Cancel",
        InputMode::Normal => "/:Date [/]:Day t:Today Tab:Panel Space:Star q:Quit",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                .title(" Actions "),
        );
    f.render_widget(status, f_chunks[0]);
    f.render_widget(help, f_chunks[1]);

    // --- Error modal ---
    if state.controller.pending_error().is_some() {
        let area = popup_area(f.area(), 40, 5);
        let popup = Paragraph::new(vec![
            Line::from(FETCH_ERROR),
            Line::from(Span::styled(
                "Press any key to dismiss",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title(" Error "));
        f.render_widget(Clear, area);
        f.render_widget(popup, area);
    }
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    popup
}
