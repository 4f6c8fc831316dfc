use crate::models::{Attendee, Status};
use crate::utils::cmp_collated;

/// Placeholder shown instead of an empty group
pub const EMPTY_GROUP_TEXT: &str = "No one yet!";

/// How free text is made safe for its output surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// Entity-escape markup characters for HTML output
    Html,
    /// Strip control characters so stored text cannot drive the terminal
    Terminal,
}

impl Escape {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Escape::Html => escape_html(text),
            Escape::Terminal => sanitize_terminal(text),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn sanitize_terminal(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Sort by name, ascending and stable
pub fn sort_by_name(attendees: &mut [&Attendee]) {
    attendees.sort_by(|a, b| cmp_collated(&a.name, &b.name));
}

/// One formatted roster row, every free-text field already escaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub name: String,
    pub years: String,
    pub place: String,
    pub status: Status,
}

impl DisplayEntry {
    pub fn new(attendee: &Attendee, escape: Escape) -> Self {
        Self {
            name: escape.apply(&attendee.name),
            years: escape.apply(&attendee.year),
            place: escape.apply(&attendee.place()),
            status: attendee.status,
        }
    }
}

/// A formatted status group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupDisplay {
    Empty,
    Entries(Vec<DisplayEntry>),
}

impl GroupDisplay {
    pub fn len(&self) -> usize {
        match self {
            GroupDisplay::Empty => 0,
            GroupDisplay::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GroupDisplay::Empty)
    }

    pub fn entries(&self) -> &[DisplayEntry] {
        match self {
            GroupDisplay::Empty => &[],
            GroupDisplay::Entries(entries) => entries,
        }
    }
}

/// Sort a filtered group by name and format every row.
pub fn display_group(group: &[&Attendee], escape: Escape) -> GroupDisplay {
    if group.is_empty() {
        return GroupDisplay::Empty;
    }
    let mut sorted = group.to_vec();
    sort_by_name(&mut sorted);
    GroupDisplay::Entries(sorted.into_iter().map(|a| DisplayEntry::new(a, escape)).collect())
}

/// Render a group as an HTML fragment of attendee cards
pub fn render_html_group(title: &str, group: &[&Attendee]) -> String {
    let mut html = format!("<section>\n  <h2>{}</h2>\n", escape_html(title));
    match display_group(group, Escape::Html) {
        GroupDisplay::Empty => {
            html.push_str(&format!("  <p class=\"empty\">{}</p>\n", EMPTY_GROUP_TEXT));
        }
        GroupDisplay::Entries(entries) => {
            for entry in entries {
                html.push_str(&format!(
                    "  <div class=\"attendee-card\">\n    <div class=\"name\">{}</div>\n    <div class=\"details\"><span class=\"year\">{}</span> {}</div>\n  </div>\n",
                    entry.name, entry.years, entry.place
                ));
            }
        }
    }
    html.push_str("</section>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::filter::{StatusGroups, YearFilter};

    fn person(name: &str, year: &str) -> Attendee {
        Attendee {
            email: None,
            name: name.to_string(),
            year: year.to_string(),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            location: None,
            status: Status::Interested,
            timestamp: None,
        }
    }

    fn names(display: &GroupDisplay) -> Vec<&str> {
        display.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_amy_and_bob_example() {
        let roster = vec![person("Bob", "2019"), person("Amy", "2019,2020")];

        let groups = StatusGroups::for_filter(&roster, &YearFilter::from_token("2020"));
        assert_eq!(names(&display_group(&groups.interested, Escape::Html)), vec!["Amy"]);

        let groups = StatusGroups::for_filter(&roster, &YearFilter::All);
        assert_eq!(names(&display_group(&groups.interested, Escape::Html)), vec!["Amy", "Bob"]);
    }

    #[test]
    fn test_sort_is_case_insensitive_and_stable() {
        let roster = vec![
            person("bob", "2019"),
            person("Amy", "first"),
            person("amy", "x"),
            person("Amy", "second"),
        ];
        let mut refs: Vec<&Attendee> = roster.iter().collect();
        sort_by_name(&mut refs);
        let order: Vec<(&str, &str)> = refs.iter().map(|a| (a.name.as_str(), a.year.as_str())).collect();
        assert_eq!(
            order,
            vec![("Amy", "first"), ("Amy", "second"), ("amy", "x"), ("bob", "2019")]
        );
    }

    #[test]
    fn test_sort_places_accented_names_with_their_letter() {
        let roster = vec![person("Zoe", ""), person("Émile", ""), person("Ana", ""), person("edgar", "")];
        let mut refs: Vec<&Attendee> = roster.iter().collect();
        sort_by_name(&mut refs);
        let order: Vec<&str> = refs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(order, vec!["Ana", "edgar", "Émile", "Zoe"]);
    }

    #[test]
    fn test_sort_orders_every_distinct_pair() {
        let roster: Vec<Attendee> = ["delta", "Alpha", "charlie", "Bravo", "alpha"]
            .iter()
            .map(|n| person(n, ""))
            .collect();
        let mut refs: Vec<&Attendee> = roster.iter().collect();
        sort_by_name(&mut refs);
        for pair in refs.windows(2) {
            assert_ne!(cmp_collated(&pair[0].name, &pair[1].name), std::cmp::Ordering::Greater);
        }
    }

    #[test]
    fn test_empty_group_renders_placeholder() {
        assert_eq!(display_group(&[], Escape::Terminal), GroupDisplay::Empty);
        let html = render_html_group("Committed", &[]);
        assert!(html.contains(EMPTY_GROUP_TEXT));
        assert!(!html.contains("attendee-card"));
    }

    #[test]
    fn test_script_name_is_escaped() {
        let roster = vec![person("<script>alert('x')</script>", "2019")];
        let refs: Vec<&Attendee> = roster.iter().collect();
        let html = render_html_group("Interested", &refs);
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_every_free_text_field_is_escaped() {
        let mut attendee = person("A & B", "2019 <b>");
        attendee.city = Some("\"Quote\" City".to_string());
        let entry = DisplayEntry::new(&attendee, Escape::Html);
        assert_eq!(entry.name, "A &amp; B");
        assert_eq!(entry.years, "2019 &lt;b&gt;");
        assert_eq!(entry.place, "&quot;Quote&quot; City, TX");
    }

    #[test]
    fn test_terminal_escape_strips_control_sequences() {
        let attendee = person("Eve\u{1b}[2JMallory\n", "2019");
        let entry = DisplayEntry::new(&attendee, Escape::Terminal);
        assert_eq!(entry.name, "Eve[2JMallory");
    }

    #[test]
    fn test_reload_is_idempotent() {
        let roster = vec![person("Bob", "2019"), person("Amy", "2019,2020")];
        let again = roster.clone();
        let first = display_group(&StatusGroups::for_filter(&roster, &YearFilter::All).interested, Escape::Html);
        let second = display_group(&StatusGroups::for_filter(&again, &YearFilter::All).interested, Escape::Html);
        assert_eq!(first, second);
    }
}
