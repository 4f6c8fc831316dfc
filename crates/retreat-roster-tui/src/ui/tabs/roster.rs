use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use retreat_roster_core::models::Status;
use retreat_roster_core::roster::{display_group, Escape, GroupDisplay, EMPTY_GROUP_TEXT};
use retreat_roster_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

/// Render the Roster tab: one column per status
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let groups = app.session.groups();
    for (status, chunk) in Status::ALL.iter().zip(chunks.iter()) {
        let display = display_group(groups.group(*status), Escape::Terminal);
        render_group(frame, app, *status, &display, *chunk);
    }
}

fn render_group(frame: &mut Frame, app: &App, status: Status, display: &GroupDisplay, area: Rect) {
    let focused = app.focused_group == status;
    let title = format!(" {} ({}) ", status.label(), display.len());
    let block = Block::default()
        .title(Span::styled(title, styles::status_style(status)))
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let entries = match display {
        GroupDisplay::Empty => {
            let placeholder = Paragraph::new(Line::from(Span::styled(
                format!(" {}", EMPTY_GROUP_TEXT),
                styles::muted_style(),
            )))
            .block(block);
            frame.render_widget(placeholder, area);
            return;
        }
        GroupDisplay::Entries(entries) => entries,
    };

    // Inside the borders, minus the highlight gutter
    let width = (area.width as usize).saturating_sub(3);

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let mut details = vec![Span::styled(entry.years.clone(), styles::highlight_style())];
            if !entry.place.is_empty() {
                let room = width.saturating_sub(entry.years.chars().count() + 2);
                details.push(Span::styled(
                    format!("  {}", truncate_string(&entry.place, room)),
                    styles::muted_style(),
                ));
            }
            ListItem::new(vec![
                Line::from(Span::styled(truncate_string(&entry.name, width), styles::list_item_style())),
                Line::from(details),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.group_scroll.min(entries.len().saturating_sub(1))));
    }

    frame.render_stateful_widget(list, area, &mut state);
}
