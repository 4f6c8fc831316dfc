use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::models::Attendee;

/// Distinct year tags mentioned across a roster. Recomputed on every load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearSet {
    tags: BTreeSet<String>,
}

impl YearSet {
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Tags in display order: numeric tags newest first, then the rest
    /// in descending lexicographic order.
    pub fn sorted_desc(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.iter().collect();
        sorted.sort_by(|a, b| cmp_year_desc(a, b));
        sorted
    }
}

impl<S: Into<String>> FromIterator<S> for YearSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Collect the distinct trimmed, non-empty comma-separated year tags.
pub fn extract_years(attendees: &[Attendee]) -> YearSet {
    attendees
        .iter()
        .flat_map(|a| a.year_tags())
        .map(str::to_string)
        .collect()
}

fn numeric(tag: &str) -> Option<f64> {
    tag.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn cmp_year_desc(a: &str, b: &str) -> Ordering {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| b.cmp(a)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    fn with_years(years: &[&str]) -> Vec<Attendee> {
        years
            .iter()
            .enumerate()
            .map(|(i, y)| Attendee {
                email: None,
                name: format!("Person {}", i),
                year: y.to_string(),
                city: None,
                state: None,
                location: None,
                status: Status::Interested,
                timestamp: None,
            })
            .collect()
    }

    #[test]
    fn test_extracts_distinct_trimmed_tags() {
        let attendees = with_years(&["2018, 2019", "2019", " 2020 ,", "", ",,"]);
        let years = extract_years(&attendees);
        assert_eq!(years.len(), 3);
        assert!(years.contains("2018"));
        assert!(years.contains("2019"));
        assert!(years.contains("2020"));
        assert!(!years.contains(""));
    }

    #[test]
    fn test_empty_roster_yields_empty_set() {
        assert!(extract_years(&[]).is_empty());
    }

    #[test]
    fn test_extraction_matches_manual_token_set() {
        let raw = ["2018, 2019", "alumni,2019", " ", "2021 , staff"];
        let attendees = with_years(&raw);
        let expected: BTreeSet<String> = raw
            .iter()
            .flat_map(|y| y.split(','))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let actual: BTreeSet<String> = extract_years(&attendees).iter().map(String::from).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_sorted_desc_numeric_first() {
        let years: YearSet = ["2018", "2021", "staff", "2019", "alumni"].into_iter().collect();
        assert_eq!(years.sorted_desc(), vec!["2021", "2019", "2018", "staff", "alumni"]);
    }

    #[test]
    fn test_sorted_desc_is_numeric_not_lexicographic() {
        let years: YearSet = ["999", "1000"].into_iter().collect();
        assert_eq!(years.sorted_desc(), vec!["1000", "999"]);
    }
}
