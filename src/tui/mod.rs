pub mod action;
pub mod state;
pub mod view;

use crate::config::Config;
use crate::controller::Controller;
use crate::feed::FeedClient;
use crate::logging;
use crate::model::parse_date_input;
use crate::storage::FavoritesStore;
use action::{Action, AppEvent};
use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use state::{AppState, InputMode};
use std::{env, fs, io, time::Duration};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Maps a key press to state changes. Returns the action for the network actor, if any.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<Action> {
    // The error modal swallows the key that dismisses it.
    if state.controller.pending_error().is_some() {
        state.controller.dismiss_error();
        return None;
    }

    match state.mode {
        InputMode::EnteringDate => match key.code {
            KeyCode::Enter => state.submit_date_entry().map(Action::Fetch),
            KeyCode::Esc => {
                state.cancel_date_entry();
                None
            }
            KeyCode::Char(c) => {
                state.enter_char(c);
                None
            }
            KeyCode::Backspace => {
                state.delete_char();
                None
            }
            KeyCode::Left => {
                state.move_cursor_left();
                None
            }
            KeyCode::Right => {
                state.move_cursor_right();
                None
            }
            _ => None,
        },
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('/') | KeyCode::Char('i') => {
                state.start_date_entry();
                None
            }
            KeyCode::Char('t') => state.select_today().map(Action::Fetch),
            KeyCode::Char('[') => state.shift_date(-1).map(Action::Fetch),
            KeyCode::Char(']') => state.shift_date(1).map(Action::Fetch),
            KeyCode::Tab => {
                state.toggle_focus();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                state.next();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                state.previous();
                None
            }
            KeyCode::PageDown => {
                state.jump_forward(10);
                None
            }
            KeyCode::PageUp => {
                state.jump_backward(10);
                None
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                match state.toggle_selected() {
                    Ok(Some(true)) => state.message = "Added to favorites".to_string(),
                    Ok(Some(false)) => state.message = "Removed from favorites".to_string(),
                    Ok(None) => {}
                    Err(e) => {
                        error!(error = %e, "saving favorites failed");
                        state.message = "Error: could not save favorites".to_string();
                    }
                }
                None
            }
            _ => None,
        },
    }
}

pub async fn run() -> Result<()> {
    let config = Config::load()?;
    let data_dir = Config::data_dir().context("no data directory available")?;
    fs::create_dir_all(&data_dir)?;
    logging::init(&data_dir, &config.log_level)?;

    let initial_date = match env::args().nth(1) {
        Some(arg) => match parse_date_input(&arg) {
            Some(d) => Some(d),
            None => {
                eprintln!("Usage: onthisday [YYYY-MM-DD | MM/DD/YYYY]");
                return Ok(());
            }
        },
        None => None,
    };

    // Panic Hook: restore the terminal before printing the panic
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        error!("panic: {}", info);
        default_hook(info);
    }));

    let store = FavoritesStore::in_dir(&data_dir);
    info!(path = %store.path().display(), feed = %config.feed_url, "starting");
    let mut app_state = AppState::new(Controller::new(store));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (action_tx, mut action_rx) = mpsc::channel::<Action>(10);
    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(10);

    // SPAWN ACTOR
    tokio::spawn(async move {
        let client = FeedClient::new(&config.feed_url, config.allow_insecure_certs);
        if let Err(e) = &client {
            error!(error = %e, "feed client unavailable");
            let _ = event_tx.send(AppEvent::Status(format!("Error: {}", e))).await;
        }

        while let Some(action) = action_rx.recv().await {
            match action {
                Action::Quit => break,
                Action::Fetch(req) => {
                    // One task per request; late answers are sorted out by seq.
                    let client = client.clone();
                    let tx = event_tx.clone();
                    tokio::spawn(async move {
                        let result = match client {
                            Ok(c) => c.fetch_births(req.month, req.day).await,
                            Err(e) => Err(e),
                        };
                        let _ = tx
                            .send(AppEvent::BirthsLoaded {
                                seq: req.seq,
                                result,
                            })
                            .await;
                    });
                }
            }
        }
    });

    if let Some(req) = app_state.select_date(initial_date) {
        let _ = action_tx.send(Action::Fetch(req)).await;
    }

    // UI Loop
    loop {
        terminal.draw(|f| view::draw(f, &mut app_state))?;

        while let Ok(event) = event_rx.try_recv() {
            match event {
                AppEvent::BirthsLoaded { seq, result } => app_state.apply_fetch(seq, result),
                AppEvent::Status(msg) => app_state.message = msg,
            }
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Mouse(mouse_event) => match mouse_event.kind {
                    MouseEventKind::ScrollDown => app_state.next(),
                    MouseEventKind::ScrollUp => app_state.previous(),
                    _ => {}
                },
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match handle_key(&mut app_state, key) {
                        Some(Action::Quit) => {
                            let _ = action_tx.send(Action::Quit).await;
                            break;
                        }
                        Some(action) => {
                            let _ = action_tx.send(action).await;
                        }
                        None => {}
                    }
                }
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
