use crate::controller::{Controller, FetchOutcome, FetchRequest};
use crate::feed::FetchError;
use crate::model::{Entry, parse_date_input};
use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use ratatui::widgets::ListState;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Focus {
    Results,
    Favorites,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum InputMode {
    Normal,
    EnteringDate,
}

pub struct AppState {
    pub controller: Controller,
    pub results_state: ListState,
    pub favorites_state: ListState,
    pub active_focus: Focus,
    pub message: String,
    pub mode: InputMode,
    pub input_buffer: String,
    pub cursor_position: usize,
}

impl AppState {
    pub fn new(controller: Controller) -> Self {
        let mut r_state = ListState::default();
        r_state.select(Some(0));
        let mut f_state = ListState::default();
        f_state.select(Some(0));
        Self {
            controller,
            results_state: r_state,
            favorites_state: f_state,
            active_focus: Focus::Results,
            message: "/: Date | Tab: Panel | Space: Star | q: Quit".to_string(),
            mode: InputMode::Normal,
            input_buffer: String::new(),
            cursor_position: 0,
        }
    }

    pub fn move_cursor_left(&mut self) {
        let cursor_moved_left = self.cursor_position.saturating_sub(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_left);
    }
    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.cursor_position.saturating_add(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_right);
    }
    pub fn enter_char(&mut self, new_char: char) {
        let byte_index = self.byte_index();
        self.input_buffer.insert(byte_index, new_char);
        self.move_cursor_right();
    }
    pub fn delete_char(&mut self) {
        if self.cursor_position != 0 {
            let current_index = self.cursor_position;
            let from_left_to_current_index = current_index - 1;
            let before_char_to_delete = self.input_buffer.chars().take(from_left_to_current_index);
            let after_char_to_delete = self.input_buffer.chars().skip(current_index);
            self.input_buffer = before_char_to_delete.chain(after_char_to_delete).collect();
            self.move_cursor_left();
        }
    }
    pub fn reset_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }
    fn byte_index(&self) -> usize {
        self.input_buffer
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor_position)
            .unwrap_or(self.input_buffer.len())
    }
    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.input_buffer.chars().count())
    }

    pub fn start_date_entry(&mut self) {
        self.mode = InputMode::EnteringDate;
        self.reset_input();
        if let Some(d) = self.controller.selected_date() {
            for c in d.format("%Y-%m-%d").to_string().chars() {
                self.enter_char(c);
            }
        }
        self.message = "Example: 2022-01-01 or 01/01/2022".to_string();
    }

    pub fn cancel_date_entry(&mut self) {
        self.mode = InputMode::Normal;
        self.reset_input();
    }

    /// Parses the typed date. Invalid input keeps the prompt open.
    pub fn submit_date_entry(&mut self) -> Option<FetchRequest> {
        match parse_date_input(&self.input_buffer) {
            Some(date) => {
                self.mode = InputMode::Normal;
                self.reset_input();
                self.select_date(Some(date))
            }
            None => {
                self.message = format!("Invalid date: {}", self.input_buffer.trim());
                None
            }
        }
    }

    pub fn select_date(&mut self, date: Option<NaiveDate>) -> Option<FetchRequest> {
        let req = self.controller.select_date(date);
        self.results_state.select(Some(0));
        if req.is_some() {
            self.message = "Fetching birthdays...".to_string();
        }
        req
    }

    pub fn select_today(&mut self) -> Option<FetchRequest> {
        self.select_date(Some(Local::now().date_naive()))
    }

    /// Steps the selection by `delta` days, starting from today when nothing is selected.
    pub fn shift_date(&mut self, delta: i64) -> Option<FetchRequest> {
        let base = self
            .controller
            .selected_date()
            .unwrap_or_else(|| Local::now().date_naive());
        let days = Days::new(delta.unsigned_abs());
        let next = if delta >= 0 {
            base.checked_add_days(days)
        } else {
            base.checked_sub_days(days)
        };
        next.and_then(|d| self.select_date(Some(d)))
    }

    pub fn apply_fetch(&mut self, seq: u64, result: Result<Vec<Entry>, FetchError>) {
        match self.controller.complete_fetch(seq, result) {
            FetchOutcome::Applied => {
                self.results_state.select(Some(0));
                self.message = format!("Birthdays: {}", self.controller.results().len());
            }
            FetchOutcome::Failed => {
                self.message = "Error fetching birthdays".to_string();
            }
            FetchOutcome::Stale => {}
        }
    }

    fn focused_len(&self) -> usize {
        match self.active_focus {
            Focus::Results => self.controller.results().len(),
            Focus::Favorites => self.controller.favorites().len(),
        }
    }

    fn focused_list_state(&mut self) -> &mut ListState {
        match self.active_focus {
            Focus::Results => &mut self.results_state,
            Focus::Favorites => &mut self.favorites_state,
        }
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        let (entries, state) = match self.active_focus {
            Focus::Results => (self.controller.results(), &self.results_state),
            Focus::Favorites => (self.controller.favorites(), &self.favorites_state),
        };
        state.selected().and_then(|i| entries.get(i))
    }

    /// Toggles the highlighted row. `Ok(None)` when nothing is highlighted.
    pub fn toggle_selected(&mut self) -> Result<Option<bool>> {
        let Some(entry) = self.selected_entry().cloned() else {
            return Ok(None);
        };
        let result = self.controller.toggle_favorite(&entry);
        self.clamp_favorites_selection();
        result.map(Some)
    }

    fn clamp_favorites_selection(&mut self) {
        let len = self.controller.favorites().len();
        let sel = self.favorites_state.selected().unwrap_or(0);
        if len == 0 {
            self.favorites_state.select(Some(0));
        } else if sel >= len {
            self.favorites_state.select(Some(len - 1));
        }
    }

    pub fn next(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let state = self.focused_list_state();
        let i = match state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }
    pub fn previous(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let state = self.focused_list_state();
        let i = match state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }
    pub fn jump_forward(&mut self, step: usize) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let state = self.focused_list_state();
        let current = state.selected().unwrap_or(0);
        state.select(Some((current + step).min(len - 1)));
    }
    pub fn jump_backward(&mut self, step: usize) {
        if self.focused_len() == 0 {
            return;
        }
        let state = self.focused_list_state();
        let current = state.selected().unwrap_or(0);
        state.select(Some(current.saturating_sub(step)));
    }
    pub fn toggle_focus(&mut self) {
        self.active_focus = match self.active_focus {
            Focus::Results => Focus::Favorites,
            Focus::Favorites => Focus::Results,
        }
    }
}
