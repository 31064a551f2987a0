//! Probe outcome classification
//!
//! One total function maps every HTTP response to exactly one outcome, so
//! exhaustiveness lives in the type system instead of shell regexes.

use fab_client::ApiResponse;
use fab_foundation::truncate_detail;
use std::fmt;

/// How far the 403 detail is trimmed
const DETAIL_MAX_CHARS: usize = 50;

/// Classified result of one permission probe. A value, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    Forbidden,
    Unauthorized,
    NotFound,
    NoCapacity,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Allowed => "ALLOWED",
            Outcome::Forbidden => "FORBIDDEN",
            Outcome::Unauthorized => "UNAUTHORIZED",
            Outcome::NotFound => "NOT_FOUND",
            Outcome::NoCapacity => "NO_CAPACITY",
            Outcome::Error => "ERROR",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome plus a short human-readable detail
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub outcome: Outcome,
    pub detail: String,
}

impl ProbeResult {
    pub fn new(outcome: Outcome, detail: impl Into<String>) -> Self {
        Self {
            outcome,
            detail: detail.into(),
        }
    }
}

/// Classify an HTTP response. Total: every status maps to exactly one
/// outcome.
pub fn classify(response: &ApiResponse) -> ProbeResult {
    match response.status {
        s if (200..300).contains(&s) => {
            let detail = response
                .value_count()
                .map(|n| format!("{n} items"))
                .unwrap_or_default();
            ProbeResult::new(Outcome::Allowed, detail)
        }
        401 => ProbeResult::new(Outcome::Unauthorized, ""),
        403 => {
            let message = response.error_message().unwrap_or("");
            ProbeResult::new(Outcome::Forbidden, truncate_detail(message, DETAIL_MAX_CHARS))
        }
        404 => ProbeResult::new(Outcome::NotFound, ""),
        400 => {
            let message = response.error_message().unwrap_or(&response.text);
            if message.to_lowercase().contains("capacity") {
                ProbeResult::new(Outcome::NoCapacity, truncate_detail(message, DETAIL_MAX_CHARS))
            } else {
                ProbeResult::new(Outcome::Error, "HTTP 400")
            }
        }
        s => ProbeResult::new(Outcome::Error, format!("HTTP {s}")),
    }
}
