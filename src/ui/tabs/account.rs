use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

/// Render the Account tab: identity summary plus entry points for the
/// change-password overlay and sign-out.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from("")];

    match app.session.user() {
        Some(user) => {
            lines.push(Line::from(vec![
                Span::styled("  Signed in as:  ", styles::muted_style()),
                Span::styled(user.id.clone(), styles::title_style()),
            ]));
            let role_style = if user.role.is_admin() {
                styles::admin_badge_style()
            } else {
                styles::list_item_style()
            };
            lines.push(Line::from(vec![
                Span::styled("  Role:          ", styles::muted_style()),
                Span::styled(user.role.to_string(), role_style),
            ]));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "  Not signed in",
                styles::muted_style(),
            )));
        }
    }

    lines.push(Line::from(""));

    if let Some(ref notice) = app.account_notice {
        lines.push(Line::from(Span::styled(
            format!("  {}", notice),
            styles::success_style(),
        )));
        lines.push(Line::from(""));
    }
    if let Some(ref error) = app.account_error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("  [p] ", styles::help_key_style()),
        Span::styled("Change password", styles::help_desc_style()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  [o] ", styles::help_key_style()),
        Span::styled("Sign out", styles::help_desc_style()),
    ]));

    let block = Block::default()
        .title(" Account ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
