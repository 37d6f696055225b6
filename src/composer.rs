//! Turns articles into tweet-sized text segments.
//!
//! Lengths are counted in Unicode scalar values (`char`s).

use crate::config::Config;
use crate::news::Article;

/// Hard limit for one segment.
pub const MAX_SEGMENT_CHARS: usize = 280;

/// Limit for the description blurb in summary mode.
pub const MAX_SUMMARY_DESCRIPTION_CHARS: usize = 200;

const ELLIPSIS: &str = "...";

/// Last position a wrapped segment may break at, leaving room for an ellipsis.
const WRAP_AT: usize = MAX_SEGMENT_CHARS - ELLIPSIS.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeMode {
    /// One tweet: title, short description, link.
    #[default]
    Summary,
    /// Title and link, followed by the body as a reply thread.
    Thread,
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    mode: ComposeMode,
    discussion_prompt: Option<String>,
}

impl Composer {
    #[must_use]
    pub fn new(mode: ComposeMode) -> Self {
        Self {
            mode,
            discussion_prompt: None,
        }
    }

    /// Close every thread that has a body with this segment.
    #[must_use]
    pub fn with_discussion_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.discussion_prompt = (!prompt.trim().is_empty()).then_some(prompt);
        self
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let composer = Self::new(config.compose_mode);
        match &config.discussion_prompt {
            Some(prompt) => composer.with_discussion_prompt(prompt.clone()),
            None => composer,
        }
    }

    /// Compose the segments for one article, in posting order.
    ///
    /// An article without description or content becomes a single segment
    /// holding just its title.
    #[must_use]
    pub fn compose(&self, article: &Article) -> Vec<String> {
        let title = normalize_whitespace(&article.title);
        let description = normalize_whitespace(&article.description);
        let content = normalize_whitespace(&article.content);

        if description.is_empty() && content.is_empty() {
            return vec![truncate_with_ellipsis(&title, MAX_SEGMENT_CHARS)];
        }

        match self.mode {
            ComposeMode::Summary => {
                let blurb = if description.is_empty() {
                    &content
                } else {
                    &description
                };
                vec![compose_summary(&title, blurb, article.url.trim())]
            }
            ComposeMode::Thread => {
                let mut segments = vec![compose_heading(&title, article.url.trim())];
                segments.extend(wrap_body(&merge_body(&description, &content)));
                if let Some(prompt) = &self.discussion_prompt {
                    segments.push(truncate_with_ellipsis(prompt.trim(), MAX_SEGMENT_CHARS));
                }
                segments
            }
        }
    }
}

fn compose_summary(title: &str, blurb: &str, url: &str) -> String {
    let blurb = truncate_with_ellipsis(blurb, MAX_SUMMARY_DESCRIPTION_CHARS);
    let text = [title, blurb.as_str(), url]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_with_ellipsis(&text, MAX_SEGMENT_CHARS)
}

/// First thread segment. The title gives way before the link does.
fn compose_heading(title: &str, url: &str) -> String {
    if url.is_empty() {
        return truncate_with_ellipsis(title, MAX_SEGMENT_CHARS);
    }
    let heading = format!("{title}\n\n{url}");
    if char_len(&heading) <= MAX_SEGMENT_CHARS {
        return heading;
    }
    let title_budget = MAX_SEGMENT_CHARS.saturating_sub(char_len(url) + 2);
    if title_budget > ELLIPSIS.len() {
        format!("{}\n\n{url}", truncate_with_ellipsis(title, title_budget))
    } else {
        truncate_with_ellipsis(&heading, MAX_SEGMENT_CHARS)
    }
}

/// Description followed by whatever the content adds to it.
fn merge_body(description: &str, content: &str) -> String {
    if content.is_empty() || description.contains(content) {
        description.to_string()
    } else if description.is_empty() || content.starts_with(description) {
        content.to_string()
    } else {
        format!("{description} {content}")
    }
}

/// Split whitespace-normalized text into segments of at most
/// [`MAX_SEGMENT_CHARS`], breaking at the last space at or before [`WRAP_AT`].
fn wrap_body(body: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut rest = body.trim();

    while !rest.is_empty() {
        if char_len(rest) <= MAX_SEGMENT_CHARS {
            segments.push(rest.to_string());
            break;
        }

        let window = &rest[..byte_offset(rest, WRAP_AT + 1)];
        if let Some(space) = window.rfind(' ').filter(|&i| i > 0) {
            segments.push(rest[..space].to_string());
            rest = rest[space + 1..].trim_start();
            continue;
        }

        // The first word runs past the wrap point.
        let word_end = rest.find(' ').unwrap_or(rest.len());
        if char_len(&rest[..word_end]) <= MAX_SEGMENT_CHARS {
            segments.push(rest[..word_end].to_string());
            rest = rest[word_end..].trim_start();
        } else {
            let cut = byte_offset(rest, WRAP_AT);
            segments.push(format!("{}{ELLIPSIS}", &rest[..cut]));
            rest = &rest[cut..];
        }
    }

    segments
}

/// Truncate to at most `max` chars, ending in `...` when anything was cut.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if char_len(text) <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    format!("{}{ELLIPSIS}", &text[..byte_offset(text, keep)])
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the `n`th char, or the end of the string.
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}
