//! Core library for the retreat roster.
//!
//! Loads the attendee roster from a spreadsheet-backed web endpoint, groups
//! it by participation status and year, approximates map positions from
//! region codes and drives the register/update form. Front ends own a
//! [`session::RosterSession`] and render from it.

pub mod api;
pub mod config;
pub mod demo;
pub mod models;
pub mod roster;
pub mod session;
pub mod utils;

pub use api::{ApiError, RosterClient, SubmitReceipt};
pub use config::Config;
pub use models::{Attendee, Snapshot, SnapshotSource, Status, Submission};
pub use session::{FormError, FormField, FormFields, FormMode, LoadOutcome, RosterSession};
