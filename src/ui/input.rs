//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{
    can_add_password_char, can_add_username_char, App, AppState, AuthMode, Focus, LoginFocus,
    PasswordFocus, Tab, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Modal states first
    match app.state {
        AppState::LoggingIn => return handle_auth_input(app, key).await,
        AppState::EditingConference => return handle_form_input(app, key),
        AppState::ChangingPassword => return handle_password_input(app, key),
        AppState::Searching => return handle_search_input(app, key),
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
        AppState::ConfirmingDeleteConference => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.delete_confirmed_conference();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.pending_conference_delete = None;
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDeleteUser => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.delete_confirmed_user();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.pending_user_delete = None;
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingPromoteUser => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.promote_confirmed_user();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.pending_user_promote = None;
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
        KeyCode::Char('1') => app.navigate_to(Tab::Conferences),
        KeyCode::Char('2') => app.navigate_to(Tab::Users),
        KeyCode::Char('3') => app.navigate_to(Tab::Account),
        KeyCode::Left => {
            let target = app.current_tab.prev();
            app.navigate_to(target);
        }
        KeyCode::Right => {
            let target = app.current_tab.next();
            app.navigate_to(target);
        }
        KeyCode::Char('u') => app.refresh_data(),
        KeyCode::Char('/') => {
            if app.current_tab == Tab::Conferences {
                app.state = AppState::Searching;
                app.search_query.clear();
                app.conference_selection = 0;
            }
        }
        KeyCode::Tab => {
            // Toggle focus between list and detail panels
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::Esc => {
            app.search_query.clear();
            app.focus = Focus::List;
        }
        _ => {
            // Tab-specific input
            match app.current_tab {
                Tab::Conferences => handle_conferences_input(app, key),
                Tab::Users => handle_users_input(app, key),
                Tab::Account => handle_account_input(app, key),
            }
        }
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
        }
        KeyCode::Enter => {
            // Keep the query active as a filter
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.conference_selection = 0;
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.conference_selection = 0;
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_auth_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Ctrl+T flips between sign-in and account creation
    if key.code == KeyCode::Char('t') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.auth_mode = match app.auth_mode {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        };
        app.login_error = None;
        app.auth_notice = None;
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            // Quit if on the auth screen; there is nothing behind it
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => match app.auth_mode {
                AuthMode::Login => app.attempt_login().await,
                AuthMode::Signup => app.attempt_signup(),
            },
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(&app.login_username) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(&app.login_password) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_password_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.clear_password_form();
            app.account_error = None;
            app.state = AppState::Normal;
        }
        KeyCode::Down | KeyCode::Tab => app.password_focus = app.password_focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.password_focus = app.password_focus.prev(),
        KeyCode::Enter => match app.password_focus {
            PasswordFocus::Button | PasswordFocus::Confirm => app.submit_password_change(),
            _ => app.password_focus = app.password_focus.next(),
        },
        KeyCode::Backspace => {
            match app.password_focus {
                PasswordFocus::Old => app.old_password.pop(),
                PasswordFocus::New => app.new_password.pop(),
                PasswordFocus::Confirm => app.confirm_password.pop(),
                PasswordFocus::Button => None,
            };
        }
        KeyCode::Char(c) => {
            let field = match app.password_focus {
                PasswordFocus::Old => Some(&mut app.old_password),
                PasswordFocus::New => Some(&mut app.new_password),
                PasswordFocus::Confirm => Some(&mut app.confirm_password),
                PasswordFocus::Button => None,
            };
            if let Some(field) = field {
                if can_add_password_char(field) {
                    field.push(c);
                }
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.cancel_conference_form(),
        KeyCode::Enter => app.submit_conference_form(),
        KeyCode::Down | KeyCode::Tab => {
            if let Some(ref mut form) = app.form {
                form.select_next();
            }
        }
        KeyCode::Up | KeyCode::BackTab => {
            if let Some(ref mut form) = app.form {
                form.select_prev();
            }
        }
        KeyCode::Backspace => {
            if let Some(ref mut form) = app.form {
                form.pop_char();
            }
        }
        KeyCode::Char(c) => {
            if let Some(ref mut form) = app.form {
                form.push_char(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_conferences_input(app: &mut App, key: KeyEvent) {
    let count = app.filtered_conferences().len();

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if count > 0 && app.conference_selection + 1 < count {
                app.conference_selection += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.conference_selection = app.conference_selection.saturating_sub(1);
        }
        KeyCode::PageDown => {
            if count > 0 {
                app.conference_selection =
                    (app.conference_selection + PAGE_SCROLL_SIZE).min(count - 1);
            }
        }
        KeyCode::PageUp => {
            app.conference_selection = app.conference_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::Home => app.conference_selection = 0,
        KeyCode::End => app.conference_selection = count.saturating_sub(1),
        KeyCode::Enter => app.focus = Focus::Detail,
        // Admin catalog actions
        KeyCode::Char('n') => {
            if app.is_admin() {
                app.start_create_conference();
            }
        }
        KeyCode::Char('e') => {
            if app.is_admin() {
                app.start_edit_conference();
            }
        }
        KeyCode::Char('D') => {
            if app.is_admin() {
                app.confirm_delete_conference();
            }
        }
        _ => {}
    }
}

fn handle_users_input(app: &mut App, key: KeyEvent) {
    // The table only reacts when the guard lets it render at all
    if !app.is_admin() {
        return;
    }

    let count = app.users.len();

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if count > 0 && app.user_selection + 1 < count {
                app.user_selection += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.user_selection = app.user_selection.saturating_sub(1);
        }
        KeyCode::Home => app.user_selection = 0,
        KeyCode::End => app.user_selection = count.saturating_sub(1),
        KeyCode::Char('p') => app.confirm_promote_user(),
        KeyCode::Char('D') => app.confirm_delete_user(),
        _ => {}
    }
}

fn handle_account_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('p') => app.start_change_password(),
        KeyCode::Char('o') => app.logout(),
        _ => {}
    }
}
