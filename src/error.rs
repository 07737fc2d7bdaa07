// src/error.rs
use thiserror::Error;

use crate::normalize::FieldKind;

/// Run-level failures. Listing-level errors abort a run; detail-level errors
/// are recorded against their game and the run carries on.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("unsupported jurisdiction {code:?} (supported: {supported})")]
    UnsupportedJurisdiction { code: String, supported: String },

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("unrecognized page layout at {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("scrape worker for {0} panicked")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch { url: url.into(), reason: reason.into() }
    }

    pub fn parse(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse { url: url.into(), reason: reason.into() }
    }
}

/// Field-level failure. Never escapes the normalizer's caller: the field is
/// recorded as unknown instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparsable {kind} value: {raw:?}")]
pub struct UnparsableValue {
    pub kind: FieldKind,
    pub raw: String,
}

impl UnparsableValue {
    pub fn new(kind: FieldKind, raw: &str) -> Self {
        Self { kind, raw: raw.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
