//! Client for the spreadsheet-backed roster endpoint.
//!
//! The endpoint exposes three operations on a single base URL:
//! `GET ?action=read`, `GET ?action=lookup&email=...` and a JSON `POST`
//! for submissions.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{Attendee, AttendeeRecord, AttendeesResponse, LookupResponse, Submission};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) reads.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Acknowledgment returned by the endpoint for an accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub status: StatusCode,
}

/// Roster endpoint client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RosterClient {
    client: Client,
    base_url: Url,
}

impl RosterClient {
    /// Create a client for the given endpoint URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid endpoint URL: {}", base_url))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn read_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("action", "read");
        url
    }

    fn lookup_url(&self, email: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("action", "lookup")
            .append_pair("email", email);
        url
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: reqwest::Response) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status() == StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url.clone())
                .header(header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response
                        .text()
                        .await
                        .context("Failed to read response body")?;
                    return serde_json::from_str(&text)
                        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    // ===== Endpoint Operations =====

    /// Fetch every attendee in the sheet
    pub async fn fetch_attendees(&self) -> Result<Vec<Attendee>> {
        let response: AttendeesResponse = self.get(self.read_url()).await?;
        let total = response.attendees.len();
        let attendees = response.into_attendees();
        debug!(total, kept = attendees.len(), "Attendees fetched");
        Ok(attendees)
    }

    /// Look up an existing submission by email
    pub async fn lookup(&self, email: &str) -> Result<Option<Attendee>> {
        let response: LookupResponse = self.get(self.lookup_url(email)).await?;
        Ok(response.attendee.and_then(AttendeeRecord::into_attendee))
    }

    /// Post a submission and wait for the endpoint to acknowledge it.
    /// Writes are not retried; the user resubmits on failure.
    pub async fn submit(&self, submission: &Submission) -> Result<SubmitReceipt> {
        let response = self
            .client
            .post(self.base_url.clone())
            .json(submission)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send submission")?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "Submission acknowledged");
            Ok(SubmitReceipt { status })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }
}
