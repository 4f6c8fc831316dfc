use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Participation intent of an attendee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Interested,
    Committed,
    NotGoing,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Interested, Status::Committed, Status::NotGoing];

    /// Parse the wire value (`interested`, `committed`, `not-going`).
    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim() {
            "interested" => Some(Status::Interested),
            "committed" => Some(Status::Committed),
            "not-going" => Some(Status::NotGoing),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Status::Interested => "interested",
            Status::Committed => "committed",
            Status::NotGoing => "not-going",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Interested => "Interested",
            Status::Committed => "Committed",
            Status::NotGoing => "Not Going",
        }
    }

    /// Next status in form order (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Status::Interested => Status::Committed,
            Status::Committed => Status::NotGoing,
            Status::NotGoing => Status::Interested,
        }
    }

    /// Whether the attendee still shows up on the map
    pub fn is_attending(&self) -> bool {
        matches!(self, Status::Interested | Status::Committed)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single registration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    /// Comma-separated year tags, e.g. `"2018, 2019"`
    #[serde(default)]
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Attendee {
    /// Trimmed, non-empty year tags in the order they were entered
    pub fn year_tags(&self) -> impl Iterator<Item = &str> {
        self.year.split(',').map(str::trim).filter(|t| !t.is_empty())
    }

    /// "City, ST" when split fields exist, otherwise the free-text location
    pub fn place(&self) -> String {
        let city = non_empty(self.city.as_deref());
        let state = non_empty(self.state.as_deref());
        match (city, state) {
            (Some(city), Some(state)) => format!("{}, {}", city, state),
            (Some(city), None) => city.to_string(),
            (None, Some(state)) => state.to_string(),
            (None, None) => non_empty(self.location.as_deref())
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Region code used for map lookups
    pub fn region(&self) -> Option<&str> {
        non_empty(self.state.as_deref())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// ============================================================================
// Wire types
// ============================================================================

/// Raw record as the spreadsheet endpoint returns it. Cells may come back as
/// strings, numbers or null depending on how the sheet formatted them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendeeRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub timestamp: Option<String>,
}

impl AttendeeRecord {
    /// Convert to a validated `Attendee`. Records without a recognised status
    /// are rejected so every in-memory attendee carries one of the three values.
    pub fn into_attendee(self) -> Option<Attendee> {
        let status = match self.status.as_deref().and_then(Status::from_wire) {
            Some(status) => status,
            None => {
                warn!(
                    name = ?self.name,
                    status = ?self.status,
                    "Dropping attendee record with unrecognised status"
                );
                return None;
            }
        };

        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc));

        Some(Attendee {
            email: self.email.filter(|e| !e.trim().is_empty()),
            name: self.name.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            city: self.city,
            state: self.state,
            location: self.location,
            status,
            timestamp,
        })
    }
}

/// Response from `?action=read`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendeesResponse {
    #[serde(default)]
    pub attendees: Vec<AttendeeRecord>,
}

impl AttendeesResponse {
    pub fn into_attendees(self) -> Vec<Attendee> {
        self.attendees
            .into_iter()
            .filter_map(AttendeeRecord::into_attendee)
            .collect()
    }
}

/// Response from `?action=lookup`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub attendee: Option<AttendeeRecord>,
}

/// Body of a registration POST
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: Status,
    pub timestamp: DateTime<Utc>,
}

/// Accept a JSON string, number or bool as text; null becomes `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
