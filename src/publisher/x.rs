//! X API v2 client for creating posts.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::oauth::authorization_header;
use super::PostClient;
use crate::config::XCredentials;
use crate::error::PostError;

/// Longest error body kept in a [`PostError::Rejected`] message.
const MAX_ERROR_BODY: usize = 300;

/// Posts tweets through `POST /2/tweets` with OAuth 1.0a user context.
pub struct XClient {
    client: reqwest::Client,
    endpoint: String,
    credentials: XCredentials,
}

/// Request body for `POST /2/tweets`.
///
/// Replies use X API v2's `reply.in_reply_to_tweet_id` field.
#[derive(Debug, Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplyTo<'a>>,
}

#[derive(Debug, Serialize)]
struct ReplyTo<'a> {
    in_reply_to_tweet_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

impl XClient {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, credentials: XCredentials) -> Self {
        Self {
            client,
            endpoint: format!("{}/2/tweets", base_url.trim_end_matches('/')),
            credentials,
        }
    }
}

#[async_trait]
impl PostClient for XClient {
    async fn post(&self, text: &str, reply_to: Option<&str>) -> Result<String, PostError> {
        let body = CreateTweet {
            text,
            reply: reply_to.map(|id| ReplyTo {
                in_reply_to_tweet_id: id,
            }),
        };
        let auth = authorization_header(&self.credentials, "POST", &self.endpoint, &[]);

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, auth)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after_from_headers(
                response.headers(),
                chrono::Utc::now().timestamp(),
            );
            return Err(PostError::RateLimited { retry_after });
        }

        let raw = response.text().await?;
        if !status.is_success() {
            return Err(PostError::Rejected {
                status: status.as_u16(),
                message: error_message(&raw),
            });
        }

        let created: CreateTweetResponse = serde_json::from_str(&raw)
            .map_err(|e| PostError::InvalidResponse(format!("{e}: {raw}")))?;
        debug!(id = %created.data.id, "Post created");
        Ok(created.data.id)
    }
}

/// Wait suggested by a 429 response, relative to `now` (unix seconds).
///
/// Prefers `x-rate-limit-reset` (unix seconds), then `retry-after` (seconds).
fn retry_after_from_headers(headers: &HeaderMap, now: i64) -> Option<Duration> {
    let header_i64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    if let Some(reset) = header_i64("x-rate-limit-reset") {
        let secs = u64::try_from(reset.saturating_sub(now)).unwrap_or(0);
        return Some(Duration::from_secs(secs));
    }
    header_i64("retry-after").map(|secs| Duration::from_secs(u64::try_from(secs).unwrap_or(0)))
}

/// Pull a human-readable message out of an X error body.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "detail", "title"] {
            if let Some(message) = json.get(key).and_then(|m| m.as_str()) {
                return message.to_string();
            }
        }
    }
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn test_retry_after_prefers_reset_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-rate-limit-reset", HeaderValue::from_static("1700000300"));
        headers.insert("retry-after", HeaderValue::from_static("5"));
        assert_eq!(
            retry_after_from_headers(&headers, 1_700_000_000),
            Some(Duration::from_secs(300))
        );
    }

    #[test]
    fn test_retry_after_past_reset_is_zero() {
        let mut headers = HeaderMap::new();
        headers.insert("x-rate-limit-reset", HeaderValue::from_static("1699999000"));
        assert_eq!(
            retry_after_from_headers(&headers, 1_700_000_000),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_retry_after_header_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("42"));
        assert_eq!(
            retry_after_from_headers(&headers, 0),
            Some(Duration::from_secs(42))
        );
        assert_eq!(retry_after_from_headers(&HeaderMap::new(), 0), None);
    }

    #[test]
    fn test_request_body_shape() {
        let standalone = CreateTweet {
            text: "hello",
            reply: None,
        };
        assert_eq!(
            serde_json::to_value(&standalone).unwrap(),
            serde_json::json!({"text": "hello"})
        );

        let reply = CreateTweet {
            text: "world",
            reply: Some(ReplyTo {
                in_reply_to_tweet_id: "123",
            }),
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({"text": "world", "reply": {"in_reply_to_tweet_id": "123"}})
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"Nope"}"#), "Nope");
        assert_eq!(
            error_message(
                r#"{"title":"Forbidden","detail":"You are not allowed to create a Tweet with duplicate content.","status":403}"#
            ),
            "You are not allowed to create a Tweet with duplicate content."
        );
        assert_eq!(error_message("oops"), "oops");
    }
}
