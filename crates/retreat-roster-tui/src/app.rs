//! Application state management for the retreat roster TUI.
//!
//! This module contains the `App` struct that owns the roster session, the
//! UI state, and the channel through which background tasks report back.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use retreat_roster_core::config::Config;
use retreat_roster_core::models::{Attendee, Status};
use retreat_roster_core::roster::Pin;
use retreat_roster_core::session::{FormField, FormMode, LoadOutcome, RosterSession};
use retreat_roster_core::RosterClient;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// How long a status bar notice stays up before the snapshot age returns.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(5);

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Roster,
    Map,
    Form,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Roster => "Roster",
            Tab::Map => "Map",
            Tab::Form => "Register",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Roster => Tab::Map,
            Tab::Map => Tab::Form,
            Tab::Form => Tab::Roster,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Roster => Tab::Form,
            Tab::Map => Tab::Roster,
            Tab::Form => Tab::Map,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Editing,
    ShowingHelp,
    ConfirmingClear,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned network tasks back to the event loop.
#[derive(Debug)]
enum RefreshResult {
    /// Roster read succeeded
    Attendees(Vec<Attendee>),
    /// Roster read failed; the demo roster takes over
    LoadFailed(String),
    /// Lookup-by-email finished (`None` means no prior submission).
    /// `generation` is the identity generation the lookup was sent under.
    Lookup { generation: u64, found: Option<Attendee> },
    /// Lookup failed; ignored apart from logging
    LookupFailed(String),
    /// Submission acknowledged for this email
    Submitted { generation: u64, email: String },
    /// Submission failed; the user resubmits
    SubmitFailed(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    config_path: PathBuf,
    client: Option<RosterClient>,
    pub session: RosterSession,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub focused_group: Status,
    pub group_scroll: usize,
    pub form_focus: FormField,

    /// Map pins, re-jittered whenever the roster or the map filter changes
    pub pins: Vec<Pin>,

    // Background task channel
    refresh_rx: Option<mpsc::Receiver<RefreshResult>>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // In-flight markers for the status bar
    pub loading: bool,
    pub submitting: bool,

    /// Bumped whenever the identity is cleared; older lookups and
    /// submission acks are dropped on arrival
    identity_generation: u64,

    pub status_message: Option<String>,
    status_set_at: Option<Instant>,
}

impl App {
    /// Create the application from the on-disk config.
    ///
    /// `endpoint_override` wins over the environment and config file;
    /// `demo` skips the network entirely.
    pub fn new(endpoint_override: Option<String>, demo: bool) -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        let config_path = Config::config_path()?;
        debug!(?config_path, "Config loaded");

        let client = if demo {
            info!("Demo mode requested, not contacting the endpoint");
            None
        } else {
            let endpoint = match endpoint_override {
                Some(url) => Ok(url),
                None => config.endpoint(),
            };
            match endpoint.and_then(|url| RosterClient::new(&url, config.request_timeout())) {
                Ok(client) => {
                    debug!(endpoint = %client.base_url(), "Roster client ready");
                    Some(client)
                }
                Err(e) => {
                    warn!(error = %e, "No usable endpoint, running on demo data");
                    None
                }
            }
        };

        Ok(Self::with_config(config, config_path, client))
    }

    pub fn with_config(config: Config, config_path: PathBuf, client: Option<RosterClient>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let session = RosterSession::new(config.remembered_email.clone());

        Self {
            config,
            config_path,
            client,
            session,

            state: AppState::Normal,
            current_tab: Tab::Roster,
            focused_group: Status::Interested,
            group_scroll: 0,
            form_focus: FormField::Email,

            pins: Vec::new(),

            refresh_rx: Some(rx),
            refresh_tx: tx,

            loading: false,
            submitting: false,

            identity_generation: 0,

            status_message: None,
            status_set_at: None,
        }
    }

    pub fn is_demo(&self) -> bool {
        self.client.is_none()
    }

    /// Initial load, plus a lookup when an identity is remembered
    pub fn start(&mut self) {
        if self.is_demo() {
            self.session.apply_demo();
            self.reroll_pins();
            self.set_status("Demo mode: showing sample attendees");
            return;
        }

        self.refresh_background();
        if let Some(email) = self.session.remembered_email().map(str::to_string) {
            self.lookup_background(email);
        }
    }

    // =========================================================================
    // Background commands
    // =========================================================================

    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            warn!(error = %e, "Failed to deliver background result");
        }
    }

    /// Spawn a roster read. Overlapping reads are not coalesced; whichever
    /// finishes last is what the screen shows.
    pub fn refresh_background(&mut self) {
        let Some(client) = self.client.clone() else {
            self.set_status("Demo mode: nothing to refresh");
            return;
        };

        info!("Loading attendees");
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            let result = match client.fetch_attendees().await {
                Ok(attendees) => RefreshResult::Attendees(attendees),
                Err(e) => RefreshResult::LoadFailed(format!("{:#}", e)),
            };
            Self::send_result(&tx, result).await;
        });

        self.loading = true;
        self.set_status("Loading attendees...");
    }

    /// Spawn a lookup for a prior submission by email
    pub fn lookup_background(&mut self, email: String) {
        let Some(client) = self.client.clone() else {
            return;
        };

        debug!("Looking up existing submission");
        let generation = self.identity_generation;
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            let result = match client.lookup(&email).await {
                Ok(found) => RefreshResult::Lookup { generation, found },
                Err(e) => RefreshResult::LookupFailed(format!("{:#}", e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Validate the form and spawn the POST
    pub fn submit_background(&mut self) {
        if self.submitting {
            return;
        }

        let submission = match self.session.prepare_submission() {
            Ok(s) => s,
            Err(e) => {
                self.set_status(e.to_string());
                return;
            }
        };

        let Some(client) = self.client.clone() else {
            self.set_status("Demo mode: submissions are disabled");
            return;
        };

        let email = submission.email.clone().unwrap_or_default();
        let generation = self.identity_generation;
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            let result = match client.submit(&submission).await {
                Ok(receipt) => {
                    debug!(status = %receipt.status, "Submission acknowledged");
                    RefreshResult::Submitted { generation, email }
                }
                Err(e) => RefreshResult::SubmitFailed(format!("{:#}", e)),
            };
            Self::send_result(&tx, result).await;
        });

        self.submitting = true;
        let progress = self.session.mode().progress_message();
        self.set_status(progress);
    }

    /// Lookup using whatever is in the email field
    pub fn lookup_current_email(&mut self) {
        let email = self.session.form.email.trim().to_string();
        if email.is_empty() || self.session.mode() == FormMode::Update {
            return;
        }
        self.lookup_background(email);
    }

    // =========================================================================
    // Local commands
    // =========================================================================

    /// "Submit as someone different"
    pub fn clear_identity(&mut self) {
        self.identity_generation += 1;
        self.session.clear_identity(&mut self.config);
        self.persist_config();
        self.form_focus = FormField::Email;
        self.set_status("Cleared. You can register as someone new.");
    }

    pub fn cycle_list_year(&mut self, forward: bool) {
        let next = self.session.list_filter.cycle(&self.session.year_options(), forward);
        self.session.list_filter = next;
        self.group_scroll = 0;
    }

    pub fn cycle_map_year(&mut self, forward: bool) {
        let next = self.session.map_filter.cycle(&self.session.year_options(), forward);
        self.session.map_filter = next;
        self.reroll_pins();
    }

    /// Rebuild the map pins with fresh jitter
    pub fn reroll_pins(&mut self) {
        self.pins = self.session.pins(&mut rand::thread_rng());
    }

    pub fn focused_group_len(&self) -> usize {
        self.session.groups().group(self.focused_group).len()
    }

    /// Show a transient notice in the status bar
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_set_at = Some(Instant::now());
    }

    /// Drop the status notice once it has been up for its full time.
    /// Progress notices stay while their request is in flight.
    fn expire_status(&mut self, now: Instant) {
        if self.loading || self.submitting {
            return;
        }
        if let Some(set_at) = self.status_set_at {
            if now.saturating_duration_since(set_at) >= STATUS_MESSAGE_TTL {
                self.status_message = None;
                self.status_set_at = None;
            }
        }
    }

    fn persist_config(&self) {
        if let Err(e) = self.config.save_to(&self.config_path) {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Drain and apply every result that has arrived since the last tick
    pub fn check_background_tasks(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let results: Vec<RefreshResult> = {
            if let Some(ref mut rx) = self.refresh_rx {
                let mut results = Vec::new();
                while let Ok(result) = rx.try_recv() {
                    results.push(result);
                }
                results
            } else {
                Vec::new()
            }
        };

        for result in results {
            self.process_refresh_result(result);
        }
        self.expire_status(Instant::now());
    }

    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Attendees(attendees) => {
                self.loading = false;
                self.apply_load(Ok(attendees));
            }
            RefreshResult::LoadFailed(msg) => {
                self.loading = false;
                self.apply_load(Err(anyhow::anyhow!(msg)));
            }
            RefreshResult::Lookup { generation, found } => {
                if generation != self.identity_generation {
                    debug!("Dropping lookup for a cleared identity");
                    return;
                }
                let before = self.session.mode();
                self.session.apply_lookup_result(Ok(found));
                if before == FormMode::Register && self.session.mode() == FormMode::Update {
                    self.set_status("Welcome back! Your details are loaded.");
                }
            }
            RefreshResult::LookupFailed(msg) => {
                self.session.apply_lookup_result(Err(anyhow::anyhow!(msg)));
            }
            RefreshResult::Submitted { generation, email } => {
                self.submitting = false;
                if generation != self.identity_generation {
                    debug!("Submission acknowledged after identity was cleared, not remembering it");
                    self.refresh_background();
                    return;
                }
                let message = self.session.apply_submit_ack(&email, &mut self.config);
                self.persist_config();
                self.refresh_background();
                self.set_status(message);
            }
            RefreshResult::SubmitFailed(msg) => {
                self.submitting = false;
                error!(error = %msg, "Error submitting form");
                let user_message = if msg.to_lowercase().contains("connect")
                    || msg.to_lowercase().contains("network")
                {
                    "Network error. Check your connection and submit again.".to_string()
                } else {
                    format!("Error submitting form: {}", msg)
                };
                self.set_status(user_message);
            }
        }
    }

    fn apply_load(&mut self, result: Result<Vec<Attendee>>) {
        let outcome = self.session.apply_load_result(result);
        self.reroll_pins();
        self.group_scroll = self.group_scroll.min(self.focused_group_len().saturating_sub(1));
        self.set_status(match outcome {
            LoadOutcome::Loaded { count } => format!("Loaded {} attendees", count),
            LoadOutcome::Fallback { notice } => notice,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retreat_roster_core::demo::FALLBACK_NOTICE;

    fn test_app(name: &str) -> App {
        let path = std::env::temp_dir()
            .join(format!("retreat-roster-tui-test-{}-{}", std::process::id(), name))
            .join("config.json");
        App::with_config(Config::default(), path, None)
    }

    // -------------------------------------------------------------------------
    // Tab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Roster.next(), Tab::Map);
        assert_eq!(Tab::Map.next(), Tab::Form);
        assert_eq!(Tab::Form.next(), Tab::Roster); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Roster.prev(), Tab::Form); // Wraps around
        assert_eq!(Tab::Form.prev(), Tab::Map);
        assert_eq!(Tab::Map.prev(), Tab::Roster);
    }

    // -------------------------------------------------------------------------
    // Background Result Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_demo_start_loads_sample_roster() {
        let mut app = test_app("demo-start");
        assert!(app.is_demo());
        app.start();
        assert_eq!(app.session.attendees().len(), 5);
        // Sarah Williams is not going and never gets a pin
        assert_eq!(app.pins.len(), 4);
    }

    #[test]
    fn test_load_failure_shows_fallback_notice() {
        let mut app = test_app("load-failed");
        app.process_refresh_result(RefreshResult::LoadFailed("connection refused".to_string()));
        assert_eq!(app.status_message.as_deref(), Some(FALLBACK_NOTICE));
        assert!(app.session.snapshot().unwrap().is_demo());
        assert!(!app.loading);
    }

    fn amy() -> Attendee {
        Attendee {
            email: Some("amy@example.org".to_string()),
            name: "Amy".to_string(),
            year: "2020".to_string(),
            city: None,
            state: Some("CO".to_string()),
            location: None,
            status: Status::Committed,
            timestamp: None,
        }
    }

    #[test]
    fn test_lookup_result_enters_update_mode() {
        let mut app = test_app("lookup");
        app.process_refresh_result(RefreshResult::Lookup {
            generation: 0,
            found: Some(amy()),
        });
        assert_eq!(app.session.mode(), FormMode::Update);
        assert_eq!(app.session.form.name, "Amy");
    }

    #[test]
    fn test_lookup_arriving_after_clear_is_dropped() {
        let mut app = test_app("late-lookup");
        let generation = app.identity_generation;
        app.process_refresh_result(RefreshResult::Lookup {
            generation,
            found: Some(amy()),
        });
        assert_eq!(app.session.mode(), FormMode::Update);

        app.clear_identity();
        app.process_refresh_result(RefreshResult::Lookup {
            generation,
            found: Some(amy()),
        });
        assert_eq!(app.session.mode(), FormMode::Register);
        assert!(app.session.form.name.is_empty());
        assert!(app.session.form.email.is_empty());

        let _ = std::fs::remove_dir_all(app.config_path.parent().unwrap());
    }

    #[test]
    fn test_submit_ack_arriving_after_clear_is_not_remembered() {
        let mut app = test_app("late-submit");
        let generation = app.identity_generation;
        app.submitting = true;
        app.clear_identity();

        app.process_refresh_result(RefreshResult::Submitted {
            generation,
            email: "amy@example.org".to_string(),
        });
        assert!(!app.submitting);
        assert_eq!(app.session.mode(), FormMode::Register);
        assert_eq!(app.session.remembered_email(), None);
        assert_eq!(app.config.remembered_email, None);

        let _ = std::fs::remove_dir_all(app.config_path.parent().unwrap());
    }

    #[test]
    fn test_status_message_expires() {
        let mut app = test_app("status-ttl");
        app.set_status("Loaded 5 attendees");
        let set_at = app.status_set_at.unwrap();

        app.expire_status(set_at + Duration::from_secs(4));
        assert_eq!(app.status_message.as_deref(), Some("Loaded 5 attendees"));

        app.expire_status(set_at + STATUS_MESSAGE_TTL);
        assert_eq!(app.status_message, None);
        assert_eq!(app.status_set_at, None);
    }

    #[test]
    fn test_progress_status_stays_while_in_flight() {
        let mut app = test_app("status-in-flight");
        app.submitting = true;
        app.set_status("Submitting...");
        let set_at = app.status_set_at.unwrap();

        app.expire_status(set_at + Duration::from_secs(60));
        assert_eq!(app.status_message.as_deref(), Some("Submitting..."));

        app.submitting = false;
        app.expire_status(set_at + Duration::from_secs(60));
        assert_eq!(app.status_message, None);
    }

    #[test]
    fn test_submit_failure_keeps_form() {
        let mut app = test_app("submit-failed");
        app.submitting = true;
        app.session.form.name = "Amy".to_string();
        app.process_refresh_result(RefreshResult::SubmitFailed("HTTP 500".to_string()));
        assert!(!app.submitting);
        assert_eq!(app.session.mode(), FormMode::Register);
        assert_eq!(app.session.form.name, "Amy");
        assert!(app.status_message.unwrap().starts_with("Error submitting form"));
    }

    #[test]
    fn test_submitted_remembers_email_and_persists() {
        let mut app = test_app("submitted");
        app.process_refresh_result(RefreshResult::Submitted {
            generation: 0,
            email: "amy@example.org".to_string(),
        });
        assert_eq!(app.session.mode(), FormMode::Update);
        assert_eq!(app.config.remembered_email.as_deref(), Some("amy@example.org"));

        let saved = Config::load_from(&app.config_path).unwrap();
        assert_eq!(saved.remembered_email.as_deref(), Some("amy@example.org"));

        app.clear_identity();
        assert_eq!(app.session.mode(), FormMode::Register);
        assert_eq!(Config::load_from(&app.config_path).unwrap().remembered_email, None);

        let _ = std::fs::remove_dir_all(app.config_path.parent().unwrap());
    }

    #[test]
    fn test_invalid_form_is_not_submitted() {
        let mut app = test_app("invalid-form");
        app.submit_background();
        assert!(!app.submitting);
        assert_eq!(app.status_message.as_deref(), Some("Email is required"));
    }

    #[test]
    fn test_cycle_map_year_filters_pins() {
        let mut app = test_app("map-year");
        app.start();
        // Options are 2021, 2020, 2019, 2018; one step forward from All is 2021
        app.cycle_map_year(true);
        assert_eq!(app.session.map_filter.token(), "2021");
        assert_eq!(app.pins.len(), 1);
        app.cycle_map_year(false);
        assert_eq!(app.pins.len(), 4);
    }
}
