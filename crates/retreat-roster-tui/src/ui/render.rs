use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use retreat_roster_core::demo::FALLBACK_NOTICE;
use retreat_roster_core::session::FormMode;

use crate::app::{App, AppState, Tab};

use super::styles;
use super::tabs::{form, map, roster};

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

    // Overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingClear => render_clear_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Retreat Roster";
    let help_hint = "[?] Help";
    let badge = if app.is_demo() {
        "  (demo)"
    } else if app.loading {
        "  loading..."
    } else {
        ""
    };

    let used = title.len() + badge.len() + help_hint.len() + 4;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(badge, styles::highlight_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let form_title = match app.session.mode() {
        FormMode::Register => Tab::Form.title(),
        FormMode::Update => "Update",
    };
    let main_tabs = [
        (format!("[1] {}", Tab::Roster.title()), app.current_tab == Tab::Roster),
        (format!("[2] {}", Tab::Map.title()), app.current_tab == Tab::Map),
        (format!("[3] {}", form_title), app.current_tab == Tab::Form),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in main_tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *selected {
            spans.push(Span::styled(label.clone(), styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label.clone(), styles::muted_style()));
        }
    }

    // Year selection for the current view, right aligned
    let year_label = match app.current_tab {
        Tab::Roster => Some(format!("[y]ear: {}", app.session.list_filter.label())),
        Tab::Map => Some(format!("[y]ear: {}", app.session.map_filter.label())),
        Tab::Form => None,
    };
    if let Some(year_label) = year_label {
        let main_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = (area.width as usize).saturating_sub(main_width + year_label.chars().count() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(year_label, styles::highlight_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Roster => roster::render(frame, app, area),
        Tab::Map => map::render(frame, app, area),
        Tab::Form => form::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pdate | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if let Some(snapshot) = app.session.snapshot() {
        format!(" Updated {} ", snapshot.age_display())
    } else {
        " Not loaded ".to_string()
    };

    let left_style = match app.status_message.as_deref() {
        Some(FALLBACK_NOTICE) => styles::error_style(),
        Some(msg) if msg.starts_with("Error") || msg.starts_with("Network") => styles::error_style(),
        Some(msg) if msg.starts_with("Successfully") => styles::success_style(),
        _ => styles::muted_style(),
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 27, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  Retreat Roster", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-3", "Switch tabs"),
        help_line("←/→", "Prev/next tab"),
        help_line("↑/↓", "Scroll list / move between fields"),
        help_line("Tab", "Next status column / next field"),
        help_line("Esc", "Close overlay / stop editing"),
        Line::from(""),
        Line::from(Span::styled(" Roster & Map", styles::highlight_style())),
        help_line("y / Y", "Next / previous year"),
        help_line("r", "Re-scatter map pins"),
        help_line("u", "Reload attendees"),
        Line::from(""),
        Line::from(Span::styled(" Form", styles::highlight_style())),
        help_line("Enter", "Edit field / cycle status"),
        help_line("l", "Look up my previous submission"),
        help_line("s", "Submit or update"),
        help_line("c", "Submit as someone different"),
        Line::from(""),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_confirm_overlay(frame: &mut Frame, question: &'static str, action: &'static str) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
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

fn render_clear_overlay(frame: &mut Frame) {
    render_confirm_overlay(frame, "Forget your saved details?", "clear");
}

fn render_quit_overlay(frame: &mut Frame) {
    render_confirm_overlay(frame, "Are you sure you want to quit?", "quit");
}
