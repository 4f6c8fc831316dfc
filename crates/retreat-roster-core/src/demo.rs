//! Fixed roster shown when the endpoint cannot be read.

use crate::models::{Attendee, Status};

/// Notice shown alongside the demo roster
pub const FALLBACK_NOTICE: &str = "Error loading attendees. Using demo data.";

fn demo(name: &str, year: &str, city: &str, state: &str, status: Status) -> Attendee {
    Attendee {
        email: None,
        name: name.to_string(),
        year: year.to_string(),
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        location: None,
        status,
        timestamp: None,
    }
}

/// The five demo attendees, always in the same order
pub fn demo_attendees() -> Vec<Attendee> {
    vec![
        demo("John Doe", "2018, 2019", "Denver", "CO", Status::Interested),
        demo("Jane Smith", "2019", "Austin", "TX", Status::Committed),
        demo("Mike Johnson", "2018, 2020", "Seattle", "WA", Status::Committed),
        demo("Sarah Williams", "2020", "Portland", "OR", Status::NotGoing),
        demo("Tom Brown", "2019, 2021", "Boston", "MA", Status::Interested),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::extract_years;

    #[test]
    fn test_demo_is_deterministic() {
        assert_eq!(demo_attendees(), demo_attendees());
        assert_eq!(demo_attendees().len(), 5);
    }

    #[test]
    fn test_demo_years() {
        let years = extract_years(&demo_attendees());
        assert_eq!(years.sorted_desc(), vec!["2021", "2020", "2019", "2018"]);
    }
}
