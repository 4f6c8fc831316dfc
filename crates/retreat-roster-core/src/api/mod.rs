//! Client module for the spreadsheet-backed roster endpoint.
//!
//! This module provides the `RosterClient` for reading the roster,
//! looking up an existing submission by email and posting registrations.
//! The endpoint is an opaque JSON API; no authentication is involved.

pub mod client;
pub mod error;

pub use client::{RosterClient, SubmitReceipt, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
