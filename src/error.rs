//! Error types for the fetch and publish halves of the pipeline.
//!
//! Configuration errors live in [`crate::config::ConfigError`]; they are the
//! only fatal ones. Everything here is recovered within a single cycle.

use std::time::Duration;

use thiserror::Error;

use crate::news::Provider;

/// Failure while fetching articles from a news provider.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{provider} request failed: {source}")]
    Network {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned {status}: {message}")]
    Provider {
        provider: Provider,
        status: u16,
        message: String,
    },
    #[error("{provider} returned an unparseable response: {message}")]
    InvalidResponse { provider: Provider, message: String },
}

impl SourceError {
    #[must_use]
    pub fn provider(&self) -> Provider {
        match self {
            Self::Network { provider, .. }
            | Self::Provider { provider, .. }
            | Self::InvalidResponse { provider, .. } => *provider,
        }
    }
}

/// Failure of a single post attempt against the platform.
#[derive(Debug, Error)]
pub enum PostError {
    /// HTTP 429. `retry_after` is the wait derived from the response headers, if any.
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },
    #[error("post rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("post request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected post response: {0}")]
    InvalidResponse(String),
}

/// Failure of a whole thread. Segments before `segment` stay live.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("segment {segment} still rate limited after {retries} retries")]
    RateLimitExhausted {
        segment: usize,
        posted: usize,
        retries: u32,
    },
    #[error("segment {segment} rejected with status {status}: {message}")]
    Rejected {
        segment: usize,
        posted: usize,
        status: u16,
        message: String,
    },
    #[error("segment {segment} failed: {source}")]
    Post {
        segment: usize,
        posted: usize,
        #[source]
        source: PostError,
    },
    #[error("cannot publish an empty thread")]
    EmptyThread,
}

impl PublishError {
    /// Number of segments that made it onto the platform before the abort.
    #[must_use]
    pub fn posted(&self) -> usize {
        match self {
            Self::RateLimitExhausted { posted, .. }
            | Self::Rejected { posted, .. }
            | Self::Post { posted, .. } => *posted,
            Self::EmptyThread => 0,
        }
    }
}
