//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use retreat_roster_core::models::Status;
use retreat_roster_core::session::{can_add_field_char, FormField};

use crate::app::{App, AppState, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::Editing => {
            handle_editing_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingClear => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Normal;
                    app.clear_identity();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('1') => app.current_tab = Tab::Roster,
        KeyCode::Char('2') => app.current_tab = Tab::Map,
        KeyCode::Char('3') => app.current_tab = Tab::Form,
        KeyCode::Left => app.current_tab = app.current_tab.prev(),
        KeyCode::Right => app.current_tab = app.current_tab.next(),
        KeyCode::Char('u') => app.refresh_background(),
        _ => match app.current_tab {
            Tab::Roster => handle_roster_input(app, key),
            Tab::Map => handle_map_input(app, key),
            Tab::Form => handle_form_input(app, key),
        },
    }

    Ok(false)
}

fn next_group(status: Status, forward: bool) -> Status {
    let all = Status::ALL;
    let i = all.iter().position(|s| *s == status).unwrap_or(0);
    if forward {
        all[(i + 1) % all.len()]
    } else {
        all[(i + all.len() - 1) % all.len()]
    }
}

fn handle_roster_input(app: &mut App, key: KeyEvent) {
    let len = app.focused_group_len();
    match key.code {
        KeyCode::Char('y') => app.cycle_list_year(true),
        KeyCode::Char('Y') => app.cycle_list_year(false),
        KeyCode::Tab => {
            app.focused_group = next_group(app.focused_group, true);
            app.group_scroll = 0;
        }
        KeyCode::BackTab => {
            app.focused_group = next_group(app.focused_group, false);
            app.group_scroll = 0;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.group_scroll = app.group_scroll.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.group_scroll + 1 < len {
                app.group_scroll += 1;
            }
        }
        KeyCode::PageUp => {
            app.group_scroll = app.group_scroll.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            app.group_scroll = (app.group_scroll + PAGE_SCROLL_SIZE).min(len.saturating_sub(1));
        }
        KeyCode::Home => app.group_scroll = 0,
        KeyCode::End => app.group_scroll = len.saturating_sub(1),
        _ => {}
    }
}

fn handle_map_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') => app.cycle_map_year(true),
        KeyCode::Char('Y') => app.cycle_map_year(false),
        KeyCode::Char('r') => app.reroll_pins(),
        _ => {}
    }
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::BackTab => app.form_focus = app.form_focus.prev(),
        KeyCode::Down | KeyCode::Tab => app.form_focus = app.form_focus.next(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if app.form_focus == FormField::Status {
                app.session.form.cycle_status();
            } else {
                app.state = AppState::Editing;
            }
        }
        KeyCode::Char('s') => app.submit_background(),
        KeyCode::Char('l') => app.lookup_current_email(),
        KeyCode::Char('c') => {
            if app.session.can_clear_identity() {
                app.state = AppState::ConfirmingClear;
            }
        }
        _ => {}
    }
}

fn handle_editing_input(app: &mut App, key: KeyEvent) {
    let field = app.form_focus;
    match key.code {
        KeyCode::Esc | KeyCode::Enter => finish_editing(app, field),
        KeyCode::Tab => {
            finish_editing(app, field);
            app.form_focus = field.next();
        }
        KeyCode::Backspace => {
            if let Some(text) = app.session.form.text_mut(field) {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(text) = app.session.form.text_mut(field) {
                if can_add_field_char(text.chars().count(), c) {
                    text.push(c);
                }
            }
        }
        _ => {}
    }
}

/// Leaving the email field looks up an earlier submission, like a blur
fn finish_editing(app: &mut App, field: FormField) {
    app.state = AppState::Normal;
    if field == FormField::Email {
        app.lookup_current_email();
    }
}
