//! Posting composed segments as a linear reply thread.

pub mod oauth;
pub mod x;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{PostError, PublishError};

pub use x::XClient;

/// How a segment ended up on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    Posted,
    /// Logged only; the id is synthetic.
    DryRun,
}

/// One successfully published segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub text: String,
    pub id: String,
    pub status: PublishStatus,
}

/// A social platform that accepts posts and replies.
#[async_trait]
pub trait PostClient: Send + Sync {
    /// Create a post, as a reply to `reply_to` if given. Returns the new post's id.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::RateLimited`] on HTTP 429 and
    /// [`PostError::Rejected`] on any other non-success status.
    async fn post(&self, text: &str, reply_to: Option<&str>) -> Result<String, PostError>;

    fn status(&self) -> PublishStatus {
        PublishStatus::Posted
    }
}

/// Logs segments instead of posting them.
#[derive(Debug, Default)]
pub struct DryRunClient {
    next_id: AtomicU64,
}

impl DryRunClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostClient for DryRunClient {
    async fn post(&self, text: &str, reply_to: Option<&str>) -> Result<String, PostError> {
        let id = format!("dry-run-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        info!(id = %id, reply_to = ?reply_to, chars = text.chars().count(), "Dry run post:\n{text}");
        Ok(id)
    }

    fn status(&self) -> PublishStatus {
        PublishStatus::DryRun
    }
}

/// Pacing and rate-limit policy for [`Publisher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishSettings {
    /// Pause between consecutive segments of a thread.
    pub segment_delay: Duration,
    /// Wait after a 429 that carried no reset hint.
    pub rate_limit_cooldown: Duration,
    /// Floor for any rate-limit wait.
    pub rate_limit_min_wait: Duration,
    pub max_rate_limit_retries: u32,
}

impl PublishSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            segment_delay: config.segment_delay,
            rate_limit_cooldown: config.rate_limit_cooldown,
            rate_limit_min_wait: config.rate_limit_min_wait,
            max_rate_limit_retries: config.max_rate_limit_retries,
        }
    }

    /// How long to sleep after a 429 with the given hint.
    #[must_use]
    pub fn rate_limit_wait(&self, hint: Option<Duration>) -> Duration {
        hint.unwrap_or(self.rate_limit_cooldown)
            .max(self.rate_limit_min_wait)
    }
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            segment_delay: Duration::from_secs(10),
            rate_limit_cooldown: Duration::from_secs(15 * 60),
            rate_limit_min_wait: Duration::from_secs(60),
            max_rate_limit_retries: 3,
        }
    }
}

pub struct Publisher {
    client: Box<dyn PostClient>,
    settings: PublishSettings,
}

impl Publisher {
    #[must_use]
    pub fn new(client: Box<dyn PostClient>, settings: PublishSettings) -> Self {
        Self { client, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// Post `segments` as a thread: the first standalone, each later one as a
    /// reply to the one before it.
    ///
    /// On failure the segments already posted stay up; nothing is deleted.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] naming the failed segment when a post is
    /// rejected, fails in transport, or stays rate limited past the retry limit.
    pub async fn publish_thread(
        &self,
        segments: &[String],
    ) -> Result<Vec<PublishResult>, PublishError> {
        if segments.is_empty() {
            return Err(PublishError::EmptyThread);
        }

        let mut results: Vec<PublishResult> = Vec::with_capacity(segments.len());
        for (index, text) in segments.iter().enumerate() {
            if index > 0 && !self.settings.segment_delay.is_zero() {
                sleep(self.settings.segment_delay).await;
            }

            let reply_to = results.last().map(|r| r.id.as_str());
            let id = self
                .post_segment(index, text, reply_to, results.len())
                .await?;
            info!(segment = index, id = %id, reply_to = ?reply_to, "Published segment");

            results.push(PublishResult {
                text: text.clone(),
                id,
                status: self.client.status(),
            });
        }

        Ok(results)
    }

    /// Post one segment, sleeping and retrying while rate limited.
    async fn post_segment(
        &self,
        index: usize,
        text: &str,
        reply_to: Option<&str>,
        posted: usize,
    ) -> Result<String, PublishError> {
        let mut retries = 0;
        loop {
            match self.client.post(text, reply_to).await {
                Ok(id) => return Ok(id),
                Err(PostError::RateLimited { retry_after }) => {
                    if retries >= self.settings.max_rate_limit_retries {
                        error!(segment = index, retries, "Giving up on rate-limited segment");
                        return Err(PublishError::RateLimitExhausted {
                            segment: index,
                            posted,
                            retries,
                        });
                    }
                    retries += 1;
                    let wait = self.settings.rate_limit_wait(retry_after);
                    warn!(
                        segment = index,
                        retry = retries,
                        hint_secs = retry_after.map(|d| d.as_secs()),
                        wait_secs = wait.as_secs(),
                        "Rate limited, backing off"
                    );
                    sleep(wait).await;
                }
                Err(PostError::Rejected { status, message }) => {
                    error!(segment = index, status, message = %message, "Post rejected");
                    return Err(PublishError::Rejected {
                        segment: index,
                        posted,
                        status,
                        message,
                    });
                }
                Err(source) => {
                    error!(segment = index, "Post failed: {source}");
                    return Err(PublishError::Post {
                        segment: index,
                        posted,
                        source,
                    });
                }
            }
        }
    }
}
