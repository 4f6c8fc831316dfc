//! Roster aggregation: the pure logic behind the lists and the map.
//!
//! - `years`: distinct year tags across the roster
//! - `filter`: year selection and status partitioning
//! - `display`: name ordering, escaping and group formatting
//! - `geocode`: approximate region coordinates for map pins
//!
//! Nothing here touches the network or the terminal.

pub mod display;
pub mod filter;
pub mod geocode;
pub mod years;

pub use display::{display_group, escape_html, render_html_group, sanitize_terminal, sort_by_name, DisplayEntry, Escape, GroupDisplay, EMPTY_GROUP_TEXT};
pub use filter::{filter_by_year, map_candidates, matches_year, partition_by_status, StatusGroups, YearFilter, ALL_YEARS};
pub use geocode::{approximate, centroid, plot_pins, Coord, Pin};
pub use years::{extract_years, YearSet};
