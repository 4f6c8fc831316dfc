//! Data models for retreat roster entities.
//!
//! - `Attendee`, `Status`: a registration record and its participation intent
//! - `AttendeeRecord`, `AttendeesResponse`, `LookupResponse`: lenient wire types
//! - `Submission`: the JSON body posted by the registration form
//! - `Snapshot`: a loaded roster with its source and load time

pub mod attendee;
pub mod snapshot;

pub use attendee::{Attendee, AttendeeRecord, AttendeesResponse, LookupResponse, Status, Submission};
pub use snapshot::{Snapshot, SnapshotSource};
