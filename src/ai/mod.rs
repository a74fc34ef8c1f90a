// AI enrichment - synopsis/tagline suggestions and curator opinions
mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Opinion shown when the text-generation service gives nothing usable
pub const OPINION_FALLBACK: &str = "This film is a visual masterpiece you can't miss.";

/// Opinion text shown while a request is outstanding
pub const OPINION_PLACEHOLDER: &str = "Loading AI insight...";

/// Suggested copy for an upload. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Enhancement {
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
}

impl Enhancement {
    fn synopsis(&self) -> Option<&str> {
        self.synopsis.as_deref().filter(|s| !s.trim().is_empty())
    }

    fn tagline(&self) -> Option<&str> {
        self.tagline.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Failures inside a client. They never leave [`Enricher`] methods.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unparseable response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Text-generation features used by the upload form and the detail view.
///
/// Neither method fails: problems resolve to `None` or to
/// [`OPINION_FALLBACK`].
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enhance(&self, title: &str, description: &str) -> Option<Enhancement>;

    async fn opinion(&self, title: &str) -> String;
}

/// New description after an enhancement request completes.
///
/// The synopsis replaces the description when present, and a tagline is
/// appended under a `Tagline:` label. With no result, or a result holding
/// neither field, the description is returned unchanged.
pub fn apply_enhancement(description: &str, result: Option<&Enhancement>) -> String {
    let Some(result) = result else {
        return description.to_string();
    };

    match (result.synopsis(), result.tagline()) {
        (None, None) => description.to_string(),
        (synopsis, None) => synopsis.unwrap_or(description).to_string(),
        (synopsis, Some(tagline)) => {
            format!("{}\n\nTagline: {}", synopsis.unwrap_or(description), tagline)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enhancement(synopsis: Option<&str>, tagline: Option<&str>) -> Enhancement {
        Enhancement {
            synopsis: synopsis.map(str::to_string),
            tagline: tagline.map(str::to_string),
        }
    }

    #[test]
    fn failed_request_keeps_description() {
        assert_eq!(apply_enhancement("my words", None), "my words");
    }

    #[test]
    fn empty_result_keeps_description() {
        let empty = Enhancement::default();
        assert_eq!(apply_enhancement("my words", Some(&empty)), "my words");

        let blank = enhancement(Some(""), Some("  "));
        assert_eq!(apply_enhancement("my words", Some(&blank)), "my words");
    }

    #[test]
    fn synopsis_and_tagline() {
        let result = enhancement(Some("A gripping tale."), Some("Dive in."));
        assert_eq!(
            apply_enhancement("my words", Some(&result)),
            "A gripping tale.\n\nTagline: Dive in."
        );
    }

    #[test]
    fn tagline_only_is_appended_to_description() {
        let result = enhancement(None, Some("Dive in."));
        assert_eq!(
            apply_enhancement("my words", Some(&result)),
            "my words\n\nTagline: Dive in."
        );
    }

    #[test]
    fn synopsis_only_replaces_description() {
        let result = enhancement(Some("A gripping tale."), None);
        assert_eq!(apply_enhancement("my words", Some(&result)), "A gripping tale.");
    }

    #[test]
    fn parses_partial_json() {
        let parsed: Enhancement = serde_json::from_str(r#"{"tagline":"Go."}"#).unwrap();
        assert_eq!(parsed, enhancement(None, Some("Go.")));

        let parsed: Enhancement = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Enhancement::default());
    }
}
