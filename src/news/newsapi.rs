//! NewsAPI (`newsapi.org`) adapter.

use async_trait::async_trait;

use super::{search, Article, NewsSource, Provider};
use crate::error::SourceError;

/// Searches NewsAPI's `/v2/everything` endpoint.
pub struct NewsApiSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl NewsApiSource {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/v2/everything", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn provider(&self) -> Provider {
        Provider::NewsApi
    }

    async fn fetch(&self, topic: &str) -> Result<Vec<Article>, SourceError> {
        search(
            &self.client,
            Provider::NewsApi,
            &self.endpoint,
            &[("q", topic), ("language", "en"), ("apiKey", &self.api_key)],
        )
        .await
    }
}
