use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, AuthMode, ConferenceField, LoginFocus, PasswordFocus, Tab};

use super::styles;
use super::tabs::{account, conferences, users};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_auth_overlay(frame, app),
        AppState::EditingConference => render_conference_form_overlay(frame, app),
        AppState::ChangingPassword => render_password_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingDeleteConference => {
            let target = app.pending_conference_delete.clone().unwrap_or_default();
            render_confirm_overlay(frame, "Delete conference?", &target);
        }
        AppState::ConfirmingDeleteUser => {
            let target = app.pending_user_delete.clone().unwrap_or_default();
            render_confirm_overlay(frame, "Delete account?", &target);
        }
        AppState::ConfirmingPromoteUser => {
            let target = app.pending_user_promote.clone().unwrap_or_default();
            render_confirm_overlay(frame, "Promote to administrator?", &target);
        }
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, _app: &App, area: Rect) {
    let title = "  confdeck";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4) as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [Tab::Conferences, Tab::Users, Tab::Account];

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    if matches!(app.state, AppState::Searching) {
        spans.push(Span::styled("    /", styles::search_style()));
        spans.push(Span::styled(
            app.search_query.clone(),
            styles::search_style(),
        ));
        spans.push(Span::styled("▌", styles::search_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Conferences => conferences::render(frame, app, area),
        Tab::Users => users::render(frame, app, area),
        Tab::Account => account::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pdate | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if let Some(user) = app.session.user() {
        format!(" Signed in as {} ", user.id)
    } else {
        " Not signed in ".to_string()
    };

    let right_text = format!(" {} ", shortcuts);
    let padding = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

/// Render a text input row: `Label: [value▌]`
fn input_line(label: &str, value: &str, focused: bool, masked: bool) -> Line<'static> {
    let display = if masked {
        "*".repeat(value.chars().count().min(24))
    } else {
        let chars: Vec<char> = value.chars().collect();
        let tail: String = chars
            .iter()
            .skip(chars.len().saturating_sub(24))
            .collect();
        tail
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };

    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}[", format!("{}:", label)), styles::muted_style()),
        Span::styled(format!("{}{}", display, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    if focused {
        Line::from(vec![
            Span::raw("          ["),
            Span::styled(format!(" ▶ {} ◀ ", label), style),
            Span::raw("]"),
        ])
    } else {
        Line::from(vec![
            Span::raw("          ["),
            Span::styled(format!("   {}   ", label), style),
            Span::raw("]"),
        ])
    }
}

fn render_auth_overlay(frame: &mut Frame, app: &App) {
    let mut height = 13;
    if app.login_error.is_some() {
        height += 2;
    }
    if app.auth_notice.is_some() {
        height += 2;
    }
    let area = centered_rect_fixed(48, height, frame.area());

    frame.render_widget(Clear, area);

    let (title, button) = match app.auth_mode {
        AuthMode::Login => ("Sign in", "Sign in"),
        AuthMode::Signup => ("Create account", "Create account"),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   {}", title),
            styles::title_style(),
        )),
        Line::from(""),
    ];

    if let Some(ref notice) = app.auth_notice {
        lines.push(Line::from(Span::styled(
            format!("  {}", notice),
            styles::success_style(),
        )));
        lines.push(Line::from(""));
    }

    lines.push(input_line(
        "Username",
        &app.login_username,
        app.login_focus == LoginFocus::Username,
        false,
    ));
    lines.push(input_line(
        "Password",
        &app.login_password,
        app.login_focus == LoginFocus::Password,
        true,
    ));
    lines.push(Line::from(""));
    lines.push(button_line(button, app.login_focus == LoginFocus::Button));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    let toggle_hint = match app.auth_mode {
        AuthMode::Login => "Ctrl+T: create an account instead",
        AuthMode::Signup => "Ctrl+T: back to sign in",
    };
    lines.push(Line::from(Span::styled(
        format!("  {}", toggle_hint),
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_password_overlay(frame: &mut Frame, app: &App) {
    let height = if app.account_error.is_some() { 13 } else { 11 };
    let area = centered_rect_fixed(48, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("   Change password", styles::title_style())),
        Line::from(""),
        input_line(
            "Current",
            &app.old_password,
            app.password_focus == PasswordFocus::Old,
            true,
        ),
        input_line(
            "New",
            &app.new_password,
            app.password_focus == PasswordFocus::New,
            true,
        ),
        input_line(
            "Confirm",
            &app.confirm_password,
            app.password_focus == PasswordFocus::Confirm,
            true,
        ),
        Line::from(""),
        button_line("Change", app.password_focus == PasswordFocus::Button),
    ];

    if let Some(ref error) = app.account_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_conference_form_overlay(frame: &mut Frame, app: &App) {
    let Some(ref form) = app.form else {
        return;
    };

    let field_count = ConferenceField::ALL.len() as u16;
    let height = (field_count + 7).min(frame.area().height);
    let area = centered_rect_fixed(72, height, frame.area());

    frame.render_widget(Clear, area);

    let title = match form.editing_id {
        Some(ref id) => format!("   Edit conference {}", id),
        None => "   New conference".to_string(),
    };

    let mut lines = vec![
        Line::from(Span::styled(title, styles::title_style())),
        Line::from(""),
    ];

    for (i, field) in ConferenceField::ALL.iter().enumerate() {
        let focused = i == form.selection;
        let value = form.value(*field);
        let label = match field.hint() {
            Some(hint) if focused => format!("{} ({})", field.label(), hint),
            _ => field.label().to_string(),
        };

        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let cursor = if focused { "▌" } else { "" };

        let chars: Vec<char> = value.chars().collect();
        let shown: String = chars
            .iter()
            .skip(chars.len().saturating_sub(40))
            .collect();

        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(format!("{:<22}", label), styles::muted_style()),
            Span::styled(format!("{}{}", shown, cursor), style),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(ref error) = form.error {
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " [Tab] next field   [Enter] save   [Esc] cancel",
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(56, 22, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let key = styles::help_key_style();
    let desc = styles::help_desc_style();

    let help_text = vec![
        Line::from(Span::styled("   confdeck", styles::title_style())),
        Line::from(Span::styled(
            format!("   version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  1-3       ", key),
            Span::styled("Switch tabs", desc),
        ]),
        Line::from(vec![
            Span::styled("  ←/→       ", key),
            Span::styled("Prev/next tab", desc),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓       ", key),
            Span::styled("Navigate list", desc),
        ]),
        Line::from(vec![
            Span::styled("  Tab       ", key),
            Span::styled("Switch focus (list ↔ detail)", desc),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  /         ", key),
            Span::styled("Filter conferences", desc),
        ]),
        Line::from(vec![
            Span::styled("  u         ", key),
            Span::styled("Update data from the service", desc),
        ]),
        Line::from(vec![
            Span::styled("  n/e/D     ", key),
            Span::styled("New/edit/delete conference (admin)", desc),
        ]),
        Line::from(vec![
            Span::styled("  p/D       ", key),
            Span::styled("Promote/delete account (Users tab)", desc),
        ]),
        Line::from(vec![
            Span::styled("  q         ", key),
            Span::styled("Quit", desc),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("     Press ", styles::muted_style()),
            Span::styled("?", key),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", key),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_confirm_overlay(frame: &mut Frame, question: &str, target: &str) {
    let area = centered_rect_fixed(48, 9, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   {}", question),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("   {}", crate::utils::truncate_string(target, 40)),
            styles::list_item_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to confirm, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(48, 8, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
