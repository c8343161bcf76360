use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::Conference;
use crate::ui::styles;
use crate::utils::{format_date, truncate_string};

/// Render the Conferences tab - catalog table plus detail pane
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_table(frame, app, chunks[0]);
    render_detail(frame, app, chunks[1]);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let conferences = app.filtered_conferences();
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Title"),
        Cell::from("Date"),
        Cell::from("Duration"),
        Cell::from("Speakers"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = conferences
        .iter()
        .enumerate()
        .map(|(i, conference)| {
            let style = if i == app.conference_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new([
                Cell::from(truncate_string(&conference.title, 40)),
                Cell::from(format_date(&conference.date)),
                Cell::from(conference.duration_display()),
                Cell::from(truncate_string(&conference.speakers_display(), 24)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(3),    // Title
        Constraint::Length(13), // Date
        Constraint::Length(10), // Duration
        Constraint::Fill(2),    // Speakers
    ];

    let mut title = format!(" Conferences ({}) ", conferences.len());
    if !app.search_query.is_empty() {
        title = format!(" Conferences ({}) - filter: {} ", conferences.len(), app.search_query);
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.conference_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let selected = app.selected_conference();

    let content = match selected {
        Some(conference) => detail_lines(conference),
        None => vec![Line::from(Span::styled(
            "No conference selected",
            styles::muted_style(),
        ))],
    };

    let mut footer = String::new();
    if app.is_admin() {
        footer = " [n]ew [e]dit [D]elete ".to_string();
    }

    let block = Block::default()
        .title(" Detail ")
        .title_style(styles::muted_style())
        .title_bottom(Line::from(footer).right_aligned())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn detail_lines(conference: &Conference) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            conference.title.clone(),
            styles::title_style(),
        )),
        Line::from(""),
    ];

    lines.push(Line::from(vec![
        Span::styled("Date:      ", styles::muted_style()),
        Span::raw(format_date(&conference.date)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Duration:  ", styles::muted_style()),
        Span::raw(conference.duration_display()),
    ]));

    if let Some(venue) = conference.venue_display() {
        lines.push(Line::from(vec![
            Span::styled("Venue:     ", styles::muted_style()),
            Span::raw(venue),
        ]));
    }

    if let Some(ref design) = conference.design {
        let colors = [
            design.main_color.as_deref(),
            design.second_color.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" / ");
        if !colors.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Colors:    ", styles::muted_style()),
                Span::raw(colors),
            ]));
        }
    }

    if !conference.speakers.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Speakers", styles::highlight_style())));
        for speaker in &conference.speakers {
            lines.push(Line::from(format!("  {}", speaker.full_name())));
        }
    }

    if !conference.stakeholders.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Stakeholders",
            styles::highlight_style(),
        )));
        for stakeholder in &conference.stakeholders {
            let line = match stakeholder.job.as_deref() {
                Some(job) if !job.is_empty() => {
                    format!("  {} - {}", stakeholder.full_name(), job)
                }
                _ => format!("  {}", stakeholder.full_name()),
            };
            lines.push(Line::from(line));
        }
    }

    if !conference.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Description",
            styles::highlight_style(),
        )));
        lines.push(Line::from(conference.description.clone()));
    }

    if !conference.content.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(conference.content.clone()));
    }

    lines
}
