//! Picks a provider and topic at random and returns unseen articles.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::dedup::DedupStore;
use crate::error::SourceError;
use crate::news::{choose_source, Article, NewsSource};

pub struct NewsSelector {
    sources: Vec<Box<dyn NewsSource>>,
    batch_size: usize,
    rng: StdRng,
}

impl NewsSelector {
    #[must_use]
    pub fn new(sources: Vec<Box<dyn NewsSource>>, batch_size: usize) -> Self {
        Self::with_rng(sources, batch_size, StdRng::from_entropy())
    }

    /// Use a caller-supplied RNG, e.g. a seeded one in tests.
    #[must_use]
    pub fn with_rng(sources: Vec<Box<dyn NewsSource>>, batch_size: usize, rng: StdRng) -> Self {
        Self {
            sources,
            batch_size: batch_size.max(1),
            rng,
        }
    }

    /// Fetch from one randomly chosen source and keep the first unseen articles.
    ///
    /// Nothing is recorded in `store`; the caller records an article only once
    /// it has been published. An empty batch is not an error, and there is no
    /// fallback to another source.
    ///
    /// # Errors
    ///
    /// Returns the chosen source's [`SourceError`].
    pub async fn select_batch(&mut self, store: &DedupStore) -> Result<Vec<Article>, SourceError> {
        let Some(source) = choose_source(&self.sources, &mut self.rng) else {
            return Ok(Vec::new());
        };
        let topic = source.random_topic(&mut self.rng);
        let provider = source.provider();

        info!(provider = %provider, topic, "Searching for news");
        let articles = source.fetch(topic).await?;
        let fetched = articles.len();

        let mut in_batch = HashSet::new();
        let batch: Vec<Article> = articles
            .into_iter()
            .filter(|a| {
                let fp = a.fingerprint();
                store.is_new(&fp) && in_batch.insert(fp)
            })
            .take(self.batch_size)
            .collect();

        debug!(
            provider = %provider,
            topic,
            fetched,
            selected = batch.len(),
            "Filtered articles against dedup store"
        );
        Ok(batch)
    }
}
