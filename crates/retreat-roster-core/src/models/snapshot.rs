use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Attendee;

/// Where a roster snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotSource {
    Remote,
    Demo,
}

/// A loaded roster. Replaced wholesale on every load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub attendees: Vec<Attendee>,
    pub source: SnapshotSource,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(attendees: Vec<Attendee>, source: SnapshotSource) -> Self {
        Self {
            attendees,
            source,
            loaded_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.loaded_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_demo(&self) -> bool {
        self.source == SnapshotSource::Demo
    }
}
