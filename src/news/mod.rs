//! News search providers.
//!
//! Each provider is a variant of [`Provider`] with a matching [`NewsSource`]
//! adapter. Adding a provider means adding a variant, its topic list and an
//! adapter module; the selector picks among whatever [`build_sources`] returns.

pub mod gnews;
pub mod newsapi;

use std::fmt;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::dedup::Fingerprint;
use crate::error::SourceError;

pub use gnews::GNewsSource;
pub use newsapi::NewsApiSource;

/// Longest provider error body kept in a [`SourceError::Provider`] message.
const MAX_ERROR_BODY: usize = 300;

/// A normalized news article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub description: String,
    pub content: String,
}

impl Article {
    /// Identity used for dedup.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(&self.title, &self.url)
    }
}

/// The supported news providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    NewsApi,
    GNews,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::NewsApi, Provider::GNews];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::NewsApi => "newsapi",
            Self::GNews => "gnews",
        }
    }

    /// Candidate search topics for this provider.
    #[must_use]
    pub fn topics(self) -> &'static [&'static str] {
        match self {
            Self::NewsApi => &[
                "cybersecurity",
                "data breach",
                "ransomware",
                "zero-day vulnerability",
                "phishing attack",
            ],
            Self::GNews => &[
                "cyber attack",
                "malware",
                "infosec",
                "hacking",
                "security vulnerability",
                "privacy breach",
            ],
        }
    }

    /// Build this provider's adapter from the configuration.
    #[must_use]
    pub fn build_source(self, config: &Config, client: reqwest::Client) -> Box<dyn NewsSource> {
        match self {
            Self::NewsApi => Box::new(NewsApiSource::new(
                client,
                &config.newsapi_url,
                &config.newsapi_key,
            )),
            Self::GNews => Box::new(GNewsSource::new(client, &config.gnews_url, &config.gnews_key)),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A news search API that returns articles for a topic.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn provider(&self) -> Provider;

    /// Pick a topic uniformly from this provider's candidate set.
    fn random_topic(&self, rng: &mut dyn rand::RngCore) -> &'static str {
        // Every provider has a non-empty topic list.
        self.provider().topics().choose(rng).copied().unwrap_or("cybersecurity")
    }

    /// Search for articles about `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Network`] on transport failure and
    /// [`SourceError::Provider`] on a non-success status. An empty result is
    /// `Ok(vec![])`.
    async fn fetch(&self, topic: &str) -> Result<Vec<Article>, SourceError>;
}

/// Build one adapter per known provider.
#[must_use]
pub fn build_sources(config: &Config, client: &reqwest::Client) -> Vec<Box<dyn NewsSource>> {
    Provider::ALL
        .iter()
        .map(|p| p.build_source(config, client.clone()))
        .collect()
}

/// Pick one source uniformly at random.
pub fn choose_source<'a, R: Rng + ?Sized>(
    sources: &'a [Box<dyn NewsSource>],
    rng: &mut R,
) -> Option<&'a dyn NewsSource> {
    sources.choose(rng).map(AsRef::as_ref)
}

/// Search envelope shared by both providers.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    content: Option<String>,
}

impl RawArticle {
    fn into_article(self) -> Option<Article> {
        let title = self.title.unwrap_or_default().trim().to_string();
        let url = self.url.unwrap_or_default().trim().to_string();
        // NewsAPI replaces taken-down articles with "[Removed]" placeholders.
        if title.is_empty() || url.is_empty() || title == "[Removed]" {
            return None;
        }
        Some(Article {
            title,
            url,
            description: self.description.unwrap_or_default().trim().to_string(),
            content: clean_content(&self.content.unwrap_or_default()),
        })
    }
}

static TRUNCATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:…|\.\.\.)?\s*\[\+\d+ chars\]\s*$").expect("valid regex"));

/// Strip the `[+1234 chars]` truncation marker providers append to `content`.
fn clean_content(content: &str) -> String {
    TRUNCATION_MARKER.replace(content.trim(), "").trim().to_string()
}

/// GET a provider search endpoint and normalize the response.
async fn search(
    client: &reqwest::Client,
    provider: Provider,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Vec<Article>, SourceError> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| SourceError::Network { provider, source })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| SourceError::Network { provider, source })?;

    if !status.is_success() {
        return Err(SourceError::Provider {
            provider,
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let parsed: SearchResponse =
        serde_json::from_str(&body).map_err(|e| SourceError::InvalidResponse {
            provider,
            message: e.to_string(),
        })?;

    let total = parsed.articles.len();
    let articles: Vec<Article> = parsed
        .articles
        .into_iter()
        .filter_map(RawArticle::into_article)
        .collect();
    debug!(
        provider = %provider,
        total,
        usable = articles.len(),
        "Fetched articles"
    );
    Ok(articles)
}

/// Pull a human-readable message out of a provider error body.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
        // GNews reports `{"errors": ["..."]}`
        if let Some(errors) = json.get("errors").and_then(|e| e.as_array()) {
            let joined: Vec<&str> = errors.iter().filter_map(|e| e.as_str()).collect();
            if !joined.is_empty() {
                return joined.join("; ");
            }
        }
    }
    body.chars().take(MAX_ERROR_BODY).collect()
}
