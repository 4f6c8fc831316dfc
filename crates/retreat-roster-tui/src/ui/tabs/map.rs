use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use retreat_roster_core::models::Status;
use retreat_roster_core::roster::geocode::{MAP_NORTH_EAST, MAP_SOUTH_WEST};
use retreat_roster_core::roster::{sanitize_terminal, Pin};

use crate::app::App;
use crate::ui::styles;

/// Render the Map tab: pins over North America plus a legend
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(area);

    render_canvas(frame, app, chunks[0]);
    render_legend(frame, app, chunks[1]);
}

/// Pin positions for one status as (x = lng, y = lat)
fn coords_for(pins: &[Pin], status: Status) -> Vec<(f64, f64)> {
    pins.iter()
        .filter(|p| p.status == status)
        .map(|p| (p.coord.lng, p.coord.lat))
        .collect()
}

fn render_canvas(frame: &mut Frame, app: &App, area: Rect) {
    let interested = coords_for(&app.pins, Status::Interested);
    let committed = coords_for(&app.pins, Status::Committed);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(" Where people are coming from ({}) ", app.pins.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds([MAP_SOUTH_WEST.1, MAP_NORTH_EAST.1])
        .y_bounds([MAP_SOUTH_WEST.0, MAP_NORTH_EAST.0])
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::Rgb(72, 72, 88),
                resolution: MapResolution::High,
            });
            ctx.layer();
            ctx.draw(&Points {
                coords: &interested,
                color: styles::status_color(Status::Interested),
            });
            ctx.draw(&Points {
                coords: &committed,
                color: styles::status_color(Status::Committed),
            });
        });

    frame.render_widget(canvas, area);
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" ● ", styles::status_style(Status::Committed)),
            Span::raw(Status::Committed.label()),
        ]),
        Line::from(vec![
            Span::styled(" ● ", styles::status_style(Status::Interested)),
            Span::raw(Status::Interested.label()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " Positions are approximate",
            styles::muted_style(),
        )),
        Line::from(Span::styled(" [r] re-scatter pins", styles::muted_style())),
        Line::from(""),
    ];

    let mut pins: Vec<&Pin> = app.pins.iter().collect();
    pins.sort_by(|a, b| a.place.cmp(&b.place).then_with(|| a.name.cmp(&b.name)));
    for pin in pins {
        lines.push(Line::from(vec![
            Span::styled(" ● ", styles::status_style(pin.status)),
            Span::styled(sanitize_terminal(&pin.name), styles::list_item_style()),
        ]));
        lines.push(Line::from(Span::styled(
            format!("   {}", sanitize_terminal(&pin.place)),
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .title(" Legend ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use retreat_roster_core::roster::Coord;

    fn pin(name: &str, status: Status, lat: f64, lng: f64) -> Pin {
        Pin {
            coord: Coord { lat, lng },
            status,
            name: name.to_string(),
            years: "2019".to_string(),
            place: String::new(),
        }
    }

    #[test]
    fn test_coords_are_lng_lat_per_status() {
        let pins = vec![
            pin("Amy", Status::Interested, 39.0, -105.0),
            pin("Bob", Status::Committed, 31.0, -97.0),
        ];
        assert_eq!(coords_for(&pins, Status::Interested), vec![(-105.0, 39.0)]);
        assert_eq!(coords_for(&pins, Status::Committed), vec![(-97.0, 31.0)]);
        assert!(coords_for(&pins, Status::NotGoing).is_empty());
    }
}
