use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use retreat_roster_core::models::Status;
use retreat_roster_core::roster::sanitize_terminal;
use retreat_roster_core::session::{FormField, FormMode};
use retreat_roster_core::utils::format_timestamp;

use crate::app::{App, AppState};
use crate::ui::styles;

/// Width of the visible part of a text field
const FIELD_WIDTH: usize = 32;

/// Render the register/update form
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_fields(frame, app, chunks[0]);
    render_hints(frame, app, chunks[1]);
}

fn render_fields(frame: &mut Frame, app: &App, area: Rect) {
    let mode = app.session.mode();
    let editing = matches!(app.state, AppState::Editing);

    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", mode.title()), styles::title_style())),
        Line::from(""),
    ];

    if mode == FormMode::Update {
        if let Some(email) = app.session.remembered_email() {
            lines.push(Line::from(vec![
                Span::styled(" Signed in as ", styles::muted_style()),
                Span::styled(sanitize_terminal(email), styles::highlight_style()),
            ]));
        }
        if app.session.form.submitted_at.is_some() {
            lines.push(Line::from(vec![
                Span::styled(" Last saved   ", styles::muted_style()),
                Span::raw(format_timestamp(app.session.form.submitted_at.as_ref())),
            ]));
        }
        lines.push(Line::from(""));
    }

    for field in FormField::ALL {
        let focused = app.form_focus == field;
        lines.push(field_line(app, field, focused, focused && editing));
    }

    lines.push(Line::from(""));
    let button = format!("[ {} ]", mode.submit_label());
    let button_style = if app.submitting {
        styles::muted_style()
    } else {
        styles::help_key_style()
    };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled(button, button_style),
        Span::styled("  press s", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(app: &App, field: FormField, focused: bool, editing: bool) -> Line<'static> {
    let label = format!(" {:>11}: ", field.label());
    let marker = if focused { "▶" } else { " " };

    if field == FormField::Status {
        let chosen = app.session.form.status;
        let mut spans = vec![
            Span::styled(marker.to_string(), styles::highlight_style()),
            Span::styled(label, styles::muted_style()),
        ];
        for status in Status::ALL {
            let text = format!(" {} ", status.label());
            if chosen == Some(status) {
                spans.push(Span::styled(format!("({})", text.trim()), styles::status_style(status)));
            } else {
                spans.push(Span::styled(text, styles::muted_style()));
            }
        }
        return Line::from(spans);
    }

    let value = sanitize_terminal(&app.session.form.text(field));
    let shown = tail(&value, FIELD_WIDTH);
    let cursor = if editing { "▌" } else { "" };
    let value_style = if editing {
        styles::editing_style()
    } else if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };

    Line::from(vec![
        Span::styled(marker.to_string(), styles::highlight_style()),
        Span::styled(label, styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(format!("{:<width$}", format!("{}{}", shown, cursor), width = FIELD_WIDTH), value_style),
        Span::styled("]", styles::muted_style()),
    ])
}

/// Last `width` characters, so the cursor end stays visible
fn tail(value: &str, width: usize) -> String {
    let len = value.chars().count();
    value.chars().skip(len.saturating_sub(width)).collect()
}

fn render_hints(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(" Keys", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  ↑/↓ Tab  ", styles::help_key_style()),
            Span::styled("Move between fields", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Enter    ", styles::help_key_style()),
            Span::styled("Edit field / cycle status", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  s        ", styles::help_key_style()),
            Span::styled(app.session.mode().submit_label(), styles::help_desc_style()),
        ]),
    ];

    if app.session.mode() == FormMode::Register {
        lines.push(Line::from(vec![
            Span::styled("  l        ", styles::help_key_style()),
            Span::styled("Find my previous submission", styles::help_desc_style()),
        ]));
    }
    if app.session.can_clear_identity() {
        lines.push(Line::from(vec![
            Span::styled("  c        ", styles::help_key_style()),
            Span::styled("Submit as someone different", styles::help_desc_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Years are comma separated, e.g. 2018, 2019. State is a 2-letter code used to place you on the map.",
        styles::muted_style(),
    )));

    if app.is_demo() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Demo mode: submissions are disabled.",
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_keeps_end_of_long_value() {
        assert_eq!(tail("short", 10), "short");
        assert_eq!(tail("abcdefghij", 4), "ghij");
        assert_eq!(tail("ééééé", 2), "éé");
    }
}
