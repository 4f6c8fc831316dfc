use crate::models::{Attendee, Status};

use super::years::YearSet;

/// Token used by the year selectors for "no year filtering"
pub const ALL_YEARS: &str = "all";

/// Year selection for the roster lists and the map
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum YearFilter {
    #[default]
    All,
    Year(String),
}

impl YearFilter {
    /// Parse a selector token: `"all"` or a specific year tag
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token == ALL_YEARS || token.is_empty() {
            YearFilter::All
        } else {
            YearFilter::Year(token.to_string())
        }
    }

    pub fn token(&self) -> &str {
        match self {
            YearFilter::All => ALL_YEARS,
            YearFilter::Year(tag) => tag,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            YearFilter::All => "All Years",
            YearFilter::Year(tag) => tag,
        }
    }

    /// Keep the selection only if the tag still exists after a reload
    pub fn retain_or_reset(&mut self, years: &YearSet) {
        if let YearFilter::Year(tag) = self {
            if !years.contains(tag) {
                *self = YearFilter::All;
            }
        }
    }

    /// Step through `All` followed by `options`, wrapping around.
    /// `forward == false` steps backwards.
    pub fn cycle(&self, options: &[&str], forward: bool) -> Self {
        let len = options.len() + 1;
        let current = match self {
            YearFilter::All => 0,
            YearFilter::Year(tag) => options
                .iter()
                .position(|o| o == tag)
                .map(|i| i + 1)
                .unwrap_or(0),
        };
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        match next {
            0 => YearFilter::All,
            i => YearFilter::Year(options[i - 1].to_string()),
        }
    }
}

/// Whether an attendee claims the selected year. Matching is exact string
/// equality on trimmed tags; an empty year only matches `All`.
pub fn matches_year(attendee: &Attendee, filter: &YearFilter) -> bool {
    match filter {
        YearFilter::All => true,
        YearFilter::Year(tag) => attendee.year_tags().any(|t| t == tag),
    }
}

pub fn filter_by_year<'a>(attendees: &'a [Attendee], filter: &YearFilter) -> Vec<&'a Attendee> {
    attendees.iter().filter(|a| matches_year(a, filter)).collect()
}

/// Attendees split into disjoint groups by status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusGroups<'a> {
    pub interested: Vec<&'a Attendee>,
    pub committed: Vec<&'a Attendee>,
    pub not_going: Vec<&'a Attendee>,
}

impl<'a> StatusGroups<'a> {
    pub fn for_filter(attendees: &'a [Attendee], filter: &YearFilter) -> Self {
        partition_by_status(attendees.iter().filter(|a| matches_year(a, filter)))
    }

    pub fn group(&self, status: Status) -> &[&'a Attendee] {
        match status {
            Status::Interested => &self.interested,
            Status::Committed => &self.committed,
            Status::NotGoing => &self.not_going,
        }
    }

    pub fn len(&self) -> usize {
        self.interested.len() + self.committed.len() + self.not_going.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn partition_by_status<'a>(attendees: impl IntoIterator<Item = &'a Attendee>) -> StatusGroups<'a> {
    let mut groups = StatusGroups::default();
    for attendee in attendees {
        match attendee.status {
            Status::Interested => groups.interested.push(attendee),
            Status::Committed => groups.committed.push(attendee),
            Status::NotGoing => groups.not_going.push(attendee),
        }
    }
    groups
}

/// Year-filtered attendees eligible for map pins (never `not-going`)
pub fn map_candidates<'a>(attendees: &'a [Attendee], filter: &YearFilter) -> Vec<&'a Attendee> {
    attendees
        .iter()
        .filter(|a| a.status.is_attending() && matches_year(a, filter))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, year: &str, status: Status) -> Attendee {
        Attendee {
            email: None,
            name: name.to_string(),
            year: year.to_string(),
            city: None,
            state: None,
            location: None,
            status,
            timestamp: None,
        }
    }

    fn sample() -> Vec<Attendee> {
        vec![
            person("Bob", "2019", Status::Interested),
            person("Amy", "2019,2020", Status::Interested),
            person("Cy", "", Status::Committed),
            person("Di", "2020", Status::NotGoing),
            person("Ed", "2018, 2020", Status::Committed),
        ]
    }

    #[test]
    fn test_year_filter_tokens() {
        assert_eq!(YearFilter::from_token("all"), YearFilter::All);
        assert_eq!(YearFilter::from_token(""), YearFilter::All);
        assert_eq!(YearFilter::from_token(" 2019 "), YearFilter::Year("2019".to_string()));
        assert_eq!(YearFilter::Year("2019".to_string()).token(), "2019");
        assert_eq!(YearFilter::All.label(), "All Years");
    }

    #[test]
    fn test_specific_year_matches_exact_tag() {
        let roster = sample();
        let names: Vec<&str> = filter_by_year(&roster, &YearFilter::from_token("2020"))
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Amy", "Di", "Ed"]);
    }

    #[test]
    fn test_year_match_is_string_not_numeric() {
        let roster = vec![person("Zed", "2019.0", Status::Interested)];
        assert!(filter_by_year(&roster, &YearFilter::from_token("2019")).is_empty());
    }

    #[test]
    fn test_empty_year_only_matches_all() {
        let roster = sample();
        let cy = &roster[2];
        assert!(matches_year(cy, &YearFilter::All));
        assert!(!matches_year(cy, &YearFilter::from_token("2019")));
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let roster = sample();
        for filter in [YearFilter::All, YearFilter::from_token("2020"), YearFilter::from_token("1999")] {
            let subset = filter_by_year(&roster, &filter);
            let groups = StatusGroups::for_filter(&roster, &filter);
            assert_eq!(groups.len(), subset.len());

            for attendee in &subset {
                let memberships = Status::ALL
                    .iter()
                    .filter(|s| groups.group(**s).iter().any(|g| std::ptr::eq(*g, *attendee)))
                    .count();
                assert_eq!(memberships, 1, "{} should be in exactly one group", attendee.name);
            }
        }
    }

    #[test]
    fn test_groups_follow_status() {
        let roster = sample();
        let groups = StatusGroups::for_filter(&roster, &YearFilter::All);
        assert_eq!(groups.interested.len(), 2);
        assert_eq!(groups.committed.len(), 2);
        assert_eq!(groups.not_going.len(), 1);
        assert!(groups.committed.iter().all(|a| a.status == Status::Committed));
    }

    #[test]
    fn test_map_candidates_exclude_not_going() {
        let roster = sample();
        let names: Vec<&str> = map_candidates(&roster, &YearFilter::from_token("2020"))
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Amy", "Ed"]);
    }

    #[test]
    fn test_retain_or_reset() {
        let years: YearSet = ["2019", "2020"].into_iter().collect();

        let mut kept = YearFilter::from_token("2019");
        kept.retain_or_reset(&years);
        assert_eq!(kept, YearFilter::from_token("2019"));

        let mut gone = YearFilter::from_token("2018");
        gone.retain_or_reset(&years);
        assert_eq!(gone, YearFilter::All);
    }

    #[test]
    fn test_cycle_wraps_both_ways() {
        let options = ["2020", "2019"];
        let all = YearFilter::All;
        assert_eq!(all.cycle(&options, true), YearFilter::from_token("2020"));
        assert_eq!(all.cycle(&options, false), YearFilter::from_token("2019"));
        assert_eq!(YearFilter::from_token("2019").cycle(&options, true), YearFilter::All);
        assert_eq!(YearFilter::from_token("gone").cycle(&options, true), YearFilter::from_token("2020"));
        assert_eq!(all.cycle(&[], true), YearFilter::All);
    }
}
