//! One fetch, compose and publish cycle.

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::composer::Composer;
use crate::config::Config;
use crate::dedup::DedupStore;
use crate::news::build_sources;
use crate::publisher::{DryRunClient, PostClient, PublishSettings, Publisher, XClient};
use crate::selector::NewsSelector;

/// Outcome counts of a single cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub selected: usize,
    pub published: usize,
    pub failed: usize,
}

/// Owns the dedup store and the stages that read and update it.
pub struct Pipeline {
    store: DedupStore,
    selector: NewsSelector,
    composer: Composer,
    publisher: Publisher,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        store: DedupStore,
        selector: NewsSelector,
        composer: Composer,
        publisher: Publisher,
    ) -> Self {
        Self {
            store,
            selector,
            composer,
            publisher,
        }
    }

    /// Wire up the real providers and platform client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or X credentials
    /// are missing outside dry-run mode.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let post_client: Box<dyn PostClient> = if config.dry_run {
            Box::new(DryRunClient::new())
        } else {
            let credentials = config
                .x_credentials
                .clone()
                .context("X credentials are required unless DRY_RUN is set")?;
            Box::new(XClient::new(http.clone(), &config.x_api_url, credentials))
        };

        Ok(Self::new(
            DedupStore::from_capacity(config.dedup_capacity),
            NewsSelector::new(build_sources(config, &http), config.batch_size),
            Composer::from_config(config),
            Publisher::new(post_client, PublishSettings::from_config(config)),
        ))
    }

    #[must_use]
    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    /// Run one cycle. Never fails: errors are logged and end the cycle.
    ///
    /// An article's fingerprint is recorded only after its whole thread has
    /// been published. The first failed thread ends the cycle.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        let batch = match self.selector.select_batch(&self.store).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(provider = %e.provider(), "News fetch failed: {e}");
                return report;
            }
        };
        report.selected = batch.len();

        if batch.is_empty() {
            info!("No new articles to post");
            return report;
        }

        let article_delay = self.publisher.settings().segment_delay;
        for (i, article) in batch.iter().enumerate() {
            let fingerprint = article.fingerprint();
            if !self.store.is_new(&fingerprint) {
                debug!(title = %article.title, "Skipping already published article");
                continue;
            }

            if i > 0 && !article_delay.is_zero() {
                tokio::time::sleep(article_delay).await;
            }

            let segments = self.composer.compose(article);
            match self.publisher.publish_thread(&segments).await {
                Ok(results) => {
                    info!(
                        title = %article.title,
                        url = %article.url,
                        segments = results.len(),
                        first_id = %results[0].id,
                        "Published article"
                    );
                    self.store.record(fingerprint);
                    report.published += 1;
                }
                Err(e) => {
                    error!(
                        title = %article.title,
                        url = %article.url,
                        posted = e.posted(),
                        "Publishing failed, ending cycle: {e}"
                    );
                    report.failed += 1;
                    break;
                }
            }
        }

        report
    }
}
