//! Approximate map coordinates for attendees.
//!
//! This is a region-centroid lookup, not a geocoder. Each call adds a small
//! uniform jitter so several pins for the same state do not stack exactly;
//! positions therefore move slightly every time the map is rebuilt.

use rand::Rng;
use tracing::trace;

use crate::models::{Attendee, Status};

use super::filter::{map_candidates, YearFilter};

/// Maximum jitter applied on each axis, in degrees
pub const JITTER_DEGREES: f64 = 0.25;

/// South-west corner of the map view (lat, lng)
pub const MAP_SOUTH_WEST: (f64, f64) = (15.0, -170.0);

/// North-east corner of the map view (lat, lng)
pub const MAP_NORTH_EAST: (f64, f64) = (75.0, -50.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

/// US state and Canadian province centroids
const REGION_CENTROIDS: &[(&str, f64, f64)] = &[
    // US states
    ("AL", 32.806671, -86.791130),
    ("AK", 61.370716, -152.404419),
    ("AZ", 33.729759, -111.431221),
    ("AR", 34.969704, -92.373123),
    ("CA", 36.116203, -119.681564),
    ("CO", 39.059811, -105.311104),
    ("CT", 41.597782, -72.755371),
    ("DE", 39.318523, -75.507141),
    ("FL", 27.766279, -81.686783),
    ("GA", 33.040619, -83.643074),
    ("HI", 21.094318, -157.498337),
    ("ID", 44.240459, -114.478828),
    ("IL", 40.349457, -88.986137),
    ("IN", 39.849426, -86.258278),
    ("IA", 42.011539, -93.210526),
    ("KS", 38.526600, -96.726486),
    ("KY", 37.668140, -84.670067),
    ("LA", 31.169546, -91.867805),
    ("ME", 44.693947, -69.381927),
    ("MD", 39.063946, -76.802101),
    ("MA", 42.230171, -71.530106),
    ("MI", 43.326618, -84.536095),
    ("MN", 45.694454, -93.900192),
    ("MS", 32.741646, -89.678696),
    ("MO", 38.456085, -92.288368),
    ("MT", 46.921925, -110.454353),
    ("NE", 41.125370, -98.268082),
    ("NV", 38.313515, -117.055374),
    ("NH", 43.452492, -71.563896),
    ("NJ", 40.298904, -74.521011),
    ("NM", 34.840515, -106.248482),
    ("NY", 42.165726, -74.948051),
    ("NC", 35.630066, -79.806419),
    ("ND", 47.528912, -99.784012),
    ("OH", 40.388783, -82.764915),
    ("OK", 35.565342, -96.928917),
    ("OR", 44.572021, -122.070938),
    ("PA", 40.590752, -77.209755),
    ("RI", 41.680893, -71.511780),
    ("SC", 33.856892, -80.945007),
    ("SD", 44.299782, -99.438828),
    ("TN", 35.747845, -86.692345),
    ("TX", 31.054487, -97.563461),
    ("UT", 40.150032, -111.862434),
    ("VT", 44.045876, -72.710686),
    ("VA", 37.769337, -78.169968),
    ("WA", 47.400902, -121.490494),
    ("DC", 38.897438, -77.026817),
    ("WV", 38.491226, -80.954453),
    ("WI", 44.268543, -89.616508),
    ("WY", 42.755966, -107.302490),
    // Canadian provinces and territories
    ("AB", 53.933327, -116.576504),
    ("BC", 53.726669, -127.647621),
    ("MB", 53.760859, -98.813873),
    ("NB", 46.498390, -66.159668),
    ("NL", 53.135509, -57.660435),
    ("NS", 44.682003, -63.744311),
    ("NT", 64.825553, -124.845985),
    ("NU", 70.299760, -83.107628),
    ("ON", 51.253775, -85.323214),
    ("PE", 46.510712, -63.416814),
    ("QC", 52.939916, -73.549118),
    ("SK", 52.939916, -106.450867),
    ("YT", 64.282327, -135.000000),
];

/// Exact centroid for a region code, case-insensitive
pub fn centroid(code: &str) -> Option<Coord> {
    let code = code.trim();
    REGION_CENTROIDS
        .iter()
        .find(|(c, _, _)| c.eq_ignore_ascii_case(code))
        .map(|&(_, lat, lng)| Coord { lat, lng })
}

/// Centroid plus independent uniform jitter on each axis
pub fn approximate<R: Rng>(code: &str, rng: &mut R) -> Option<Coord> {
    centroid(code).map(|c| Coord {
        lat: c.lat + rng.gen_range(-JITTER_DEGREES..JITTER_DEGREES),
        lng: c.lng + rng.gen_range(-JITTER_DEGREES..JITTER_DEGREES),
    })
}

/// A map marker for one attendee
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub coord: Coord,
    pub status: Status,
    pub name: String,
    pub years: String,
    pub place: String,
}

/// Pins for every year-matching, attending attendee with a known region.
/// Attendees whose region is missing or unknown are skipped.
pub fn plot_pins<R: Rng>(attendees: &[Attendee], filter: &YearFilter, rng: &mut R) -> Vec<Pin> {
    map_candidates(attendees, filter)
        .into_iter()
        .filter_map(|attendee| {
            let coord = attendee.region().and_then(|code| approximate(code, rng));
            if coord.is_none() {
                trace!(name = %attendee.name, region = ?attendee.region(), "No coordinate for region, skipping pin");
            }
            coord.map(|coord| Pin {
                coord,
                status: attendee.status,
                name: attendee.name.clone(),
                years: attendee.year.clone(),
                place: attendee.place(),
            })
        })
        .collect()
}
