//! Roster session: the view-model behind every front end.
//!
//! `RosterSession` owns the loaded roster, the derived year set, both year
//! selections and the register/update form state. Front ends call its
//! command methods and render from its read accessors; the aggregation
//! itself lives in `crate::roster`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::RosterClient;
use crate::config::Config;
use crate::demo::{demo_attendees, FALLBACK_NOTICE};
use crate::models::{Attendee, Snapshot, SnapshotSource, Status, Submission};
use crate::roster::{extract_years, plot_pins, Pin, StatusGroups, YearFilter, YearSet};

/// Maximum length for any single form field.
pub const MAX_FIELD_LENGTH: usize = 100;

// ============================================================================
// Form
// ============================================================================

/// Whether the next submission registers or updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Register,
    Update,
}

impl FormMode {
    pub fn title(&self) -> &'static str {
        match self {
            FormMode::Register => "Register Your Interest",
            FormMode::Update => "Update Your Information",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            FormMode::Register => "Submit",
            FormMode::Update => "Update Info",
        }
    }

    pub fn progress_message(&self) -> &'static str {
        match self {
            FormMode::Register => "Submitting...",
            FormMode::Update => "Updating...",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            FormMode::Register => "Successfully submitted! Refreshing list...",
            FormMode::Update => "Successfully updated! Refreshing list...",
        }
    }
}

/// Editable form fields, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Email,
    Name,
    Year,
    City,
    State,
    Status,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Email,
        FormField::Name,
        FormField::Year,
        FormField::City,
        FormField::State,
        FormField::Status,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Email => "Email",
            FormField::Name => "Name",
            FormField::Year => "Year(s)",
            FormField::City => "City",
            FormField::State => "State/Prov",
            FormField::Status => "Status",
        }
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Email is required")]
    MissingEmail,

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Name is required")]
    MissingName,

    #[error("Please choose a status")]
    MissingStatus,

    #[error("State/province must be a 2-letter code, got '{0}'")]
    InvalidState(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub email: String,
    pub name: String,
    pub year: String,
    pub city: String,
    pub state: String,
    pub status: Option<Status>,
    /// When the prefilled submission was last saved, if known
    pub submitted_at: Option<DateTime<Utc>>,
}

impl FormFields {
    /// Prefill from an existing submission
    pub fn from_attendee(attendee: &Attendee) -> Self {
        Self {
            email: attendee.email.clone().unwrap_or_default(),
            name: attendee.name.clone(),
            year: attendee.year.clone(),
            city: attendee.city.clone().unwrap_or_default(),
            state: attendee.state.clone().unwrap_or_default(),
            status: Some(attendee.status),
            submitted_at: attendee.timestamp,
        }
    }

    /// Text buffer for a field; `None` for the status selector
    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Email => Some(&mut self.email),
            FormField::Name => Some(&mut self.name),
            FormField::Year => Some(&mut self.year),
            FormField::City => Some(&mut self.city),
            FormField::State => Some(&mut self.state),
            FormField::Status => None,
        }
    }

    pub fn text(&self, field: FormField) -> String {
        match field {
            FormField::Email => self.email.clone(),
            FormField::Name => self.name.clone(),
            FormField::Year => self.year.clone(),
            FormField::City => self.city.clone(),
            FormField::State => self.state.clone(),
            FormField::Status => self.status.map(|s| s.label().to_string()).unwrap_or_default(),
        }
    }

    pub fn cycle_status(&mut self) {
        self.status = Some(match self.status {
            Some(status) => status.next(),
            None => Status::Interested,
        });
    }

    /// Validate and build the POST body, stamped with the current time
    pub fn to_submission(&self) -> Result<Submission, FormError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::MissingEmail);
        }
        if !is_plausible_email(email) {
            return Err(FormError::InvalidEmail(email.to_string()));
        }

        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        let status = self.status.ok_or(FormError::MissingStatus)?;

        let state = self.state.trim();
        let state = if state.is_empty() {
            None
        } else if state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(state.to_ascii_uppercase())
        } else {
            return Err(FormError::InvalidState(state.to_string()));
        };

        let city = Some(self.city.trim().to_string()).filter(|c| !c.is_empty());

        Ok(Submission {
            email: Some(email.to_string()),
            name: name.to_string(),
            year: self.year.trim().to_string(),
            state,
            city,
            location: None,
            status,
            timestamp: Utc::now(),
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Check if a character should be accepted into a form field
pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && !c.is_control()
}

// ============================================================================
// Session
// ============================================================================

/// Result of a roster load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { count: usize },
    Fallback { notice: String },
}

/// Explicit owner of the roster view state
#[derive(Debug, Default)]
pub struct RosterSession {
    snapshot: Option<Snapshot>,
    years: YearSet,
    pub list_filter: YearFilter,
    pub map_filter: YearFilter,
    mode: FormMode,
    pub form: FormFields,
    remembered_email: Option<String>,
}

impl RosterSession {
    /// Start a session, pre-populating the form with a remembered email
    pub fn new(remembered_email: Option<String>) -> Self {
        let form = FormFields {
            email: remembered_email.clone().unwrap_or_default(),
            ..Default::default()
        };
        Self {
            form,
            remembered_email,
            ..Default::default()
        }
    }

    // ===== Read accessors =====

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn attendees(&self) -> &[Attendee] {
        self.snapshot.as_ref().map(|s| s.attendees.as_slice()).unwrap_or(&[])
    }

    pub fn years(&self) -> &YearSet {
        &self.years
    }

    /// Year selector options in display order, excluding "all"
    pub fn year_options(&self) -> Vec<&str> {
        self.years.sorted_desc()
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn remembered_email(&self) -> Option<&str> {
        self.remembered_email.as_deref()
    }

    /// Status groups for the roster lists
    pub fn groups(&self) -> StatusGroups<'_> {
        StatusGroups::for_filter(self.attendees(), &self.list_filter)
    }

    /// Freshly jittered pins for the map
    pub fn pins<R: Rng>(&self, rng: &mut R) -> Vec<Pin> {
        plot_pins(self.attendees(), &self.map_filter, rng)
    }

    // ===== Roster loading =====

    /// Replace the roster and everything derived from it
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.years = extract_years(&snapshot.attendees);
        self.list_filter.retain_or_reset(&self.years);
        self.map_filter.retain_or_reset(&self.years);
        debug!(
            attendees = snapshot.attendees.len(),
            years = self.years.len(),
            source = ?snapshot.source,
            "Roster snapshot applied"
        );
        self.snapshot = Some(snapshot);
    }

    pub fn apply_remote(&mut self, attendees: Vec<Attendee>) {
        self.apply_snapshot(Snapshot::new(attendees, SnapshotSource::Remote));
    }

    pub fn apply_demo(&mut self) {
        self.apply_snapshot(Snapshot::new(demo_attendees(), SnapshotSource::Demo));
    }

    /// Apply the result of a remote read, falling back to the demo roster
    pub fn apply_load_result(&mut self, result: Result<Vec<Attendee>>) -> LoadOutcome {
        match result {
            Ok(attendees) => {
                let count = attendees.len();
                self.apply_remote(attendees);
                LoadOutcome::Loaded { count }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load attendees, using demo data");
                self.apply_demo();
                LoadOutcome::Fallback {
                    notice: FALLBACK_NOTICE.to_string(),
                }
            }
        }
    }

    pub async fn load(&mut self, client: &RosterClient) -> LoadOutcome {
        let result = client.fetch_attendees().await;
        self.apply_load_result(result)
    }

    // ===== Lookup =====

    /// Apply a lookup result. Only a found attendee changes state.
    pub fn apply_lookup_result(&mut self, result: Result<Option<Attendee>>) {
        match result {
            Ok(Some(attendee)) => {
                info!("Existing submission found, entering update mode");
                let email = self.form.email.clone();
                self.form = FormFields::from_attendee(&attendee);
                if self.form.email.is_empty() {
                    self.form.email = email;
                }
                self.mode = FormMode::Update;
            }
            Ok(None) => {
                debug!("No existing submission for email");
            }
            Err(e) => {
                debug!(error = %e, "Lookup failed, staying in registration mode");
            }
        }
    }

    pub async fn lookup(&mut self, client: &RosterClient, email: &str) {
        let result = client.lookup(email).await;
        self.apply_lookup_result(result);
    }

    // ===== Submission =====

    /// Validate the form into a submission
    pub fn prepare_submission(&self) -> Result<Submission, FormError> {
        self.form.to_submission()
    }

    /// Record an acknowledged submission: remember the identity and switch
    /// to update mode. Returns the success notice for the current mode.
    pub fn apply_submit_ack(&mut self, email: &str, config: &mut Config) -> &'static str {
        let message = self.mode.success_message();
        config.remember_email(email);
        self.remembered_email = Some(email.to_string());
        self.mode = FormMode::Update;
        message
    }

    /// Validate, post and record a submission. The caller persists `config`
    /// and reloads the roster afterwards.
    pub async fn submit(&mut self, client: &RosterClient, config: &mut Config) -> Result<&'static str> {
        let submission = self.prepare_submission()?;
        let email = submission.email.clone().unwrap_or_default();
        match client.submit(&submission).await {
            Ok(receipt) => {
                debug!(status = %receipt.status, "Submission accepted");
                Ok(self.apply_submit_ack(&email, config))
            }
            Err(e) => {
                error!(error = %e, "Error submitting form");
                Err(e)
            }
        }
    }

    /// Whether there is an identity to forget: a remembered email, or a
    /// form loaded from an earlier submission
    pub fn can_clear_identity(&self) -> bool {
        self.remembered_email.is_some() || self.mode == FormMode::Update
    }

    /// Forget the remembered identity and return to registration mode
    pub fn clear_identity(&mut self, config: &mut Config) {
        config.forget_email();
        self.remembered_email = None;
        self.mode = FormMode::Register;
        self.form = FormFields::default();
        info!("Remembered identity cleared");
    }

    /// Drop the roster and everything derived from it
    pub fn reset(&mut self) {
        self.snapshot = None;
        self.years = YearSet::default();
        self.list_filter = YearFilter::All;
        self.map_filter = YearFilter::All;
    }
}
