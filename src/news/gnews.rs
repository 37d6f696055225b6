//! GNews (`gnews.io`) adapter.

use async_trait::async_trait;

use super::{search, Article, NewsSource, Provider};
use crate::error::SourceError;

/// Searches GNews's `/api/v4/search` endpoint.
pub struct GNewsSource {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GNewsSource {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/v4/search", base_url.trim_end_matches('/')),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl NewsSource for GNewsSource {
    fn provider(&self) -> Provider {
        Provider::GNews
    }

    async fn fetch(&self, topic: &str) -> Result<Vec<Article>, SourceError> {
        search(
            &self.client,
            Provider::GNews,
            &self.endpoint,
            &[("q", topic), ("language", "en"), ("token", &self.token)],
        )
        .await
    }
}
