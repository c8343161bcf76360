use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::auth::GuardDecision;
use crate::models::Role;
use crate::ui::styles;

/// Render the Users tab. The guard verdict is taken fresh every frame:
/// a session that lost the admin role mid-flight sees the refusal notice
/// on the next draw, not the table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab_decision() {
        GuardDecision::Render => render_table(frame, app, area),
        _ => render_access_denied(frame, area),
    }
}

fn render_access_denied(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Access denied", styles::error_style())),
        Line::from(""),
        Line::from(Span::styled(
            "  You do not have permission to view this section.",
            styles::list_item_style(),
        )),
        Line::from(Span::styled(
            "  Only administrators can manage user accounts.",
            styles::list_item_style(),
        )),
    ];

    let block = Block::default()
        .title(" Users ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let admin_count = app.users.iter().filter(|u| u.role.is_admin()).count();
    let own_id = app.current_user_id();

    let header = Row::new([Cell::from("Account"), Cell::from("Role")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let style = if i == app.user_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let name = if own_id == Some(user.id.as_str()) {
                format!("{} (you)", user.id)
            } else {
                user.id.clone()
            };

            let role_cell = match user.role {
                Role::Admin => Cell::from("admin").style(styles::admin_badge_style()),
                Role::User => Cell::from("user"),
            };

            Row::new([Cell::from(name), role_cell]).style(style)
        })
        .collect();

    let widths = [ratatui::layout::Constraint::Fill(3), ratatui::layout::Constraint::Length(8)];

    let title = format!(
        " Users ({} accounts, {} admins) - [p]romote [D]elete ",
        app.users.len(),
        admin_count
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.user_selection));

    frame.render_stateful_widget(table, area, &mut state);
}
