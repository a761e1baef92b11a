use serde::{Deserialize, Serialize};

use crate::search::{SearchHit, SearchImage};

/// How wide the answer should range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpMode {
    #[default]
    Expansive,
    Focused,
}

impl FollowUpMode {
    /// Phrase spliced into the user prompt.
    pub fn describe(self) -> &'static str {
        match self {
            FollowUpMode::Expansive => "broad and exploratory",
            FollowUpMode::Focused => "focused and specific",
        }
    }
}

/// One past question/answer pair, replayed into later prompts as context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant: Option<String>,
}

impl ConversationTurn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            assistant: Some(assistant.into()),
        }
    }
}

/// Body of `POST /api/rabbitholes/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_conversation: Vec<ConversationTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
    #[serde(default)]
    pub follow_up_mode: FollowUpMode,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.previous_conversation = history;
        self
    }

    pub fn with_concept(mut self, concept: impl Into<String>) -> Self {
        self.concept = Some(concept.into());
        self
    }

    pub fn with_mode(mut self, mode: FollowUpMode) -> Self {
        self.follow_up_mode = mode;
        self
    }

    /// What the answer should be about: the concept when one is given,
    /// the raw query otherwise. An empty concept counts as absent.
    pub fn subject(&self) -> &str {
        self.concept
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.query.as_str())
    }
}

/// Response of `POST /api/rabbitholes/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Markdown answer body, without the follow-up section.
    pub response: String,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
    #[serde(default)]
    pub contextual_query: String,
    #[serde(default)]
    pub sources: Vec<SourceCitation>,
    #[serde(default)]
    pub images: Vec<ImageReference>,
}

/// A web source the answer was grounded on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub author: String,
    /// Thumbnail image url.
    #[serde(default)]
    pub image: String,
}

impl From<&SearchHit> for SourceCitation {
    fn from(hit: &SearchHit) -> Self {
        let url = hit.url.clone().unwrap_or_default();
        Self {
            title: hit.title.clone().unwrap_or_default(),
            uri: url.clone(),
            url,
            author: hit.author.clone().unwrap_or_default(),
            image: hit.image.clone().unwrap_or_default(),
        }
    }
}

/// An image related to the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub description: String,
}

impl From<&SearchImage> for ImageReference {
    fn from(image: &SearchImage) -> Self {
        Self {
            url: image.url().to_string(),
            thumbnail: image.url().to_string(),
            description: image.description().unwrap_or_default().to_string(),
        }
    }
}

/// Error body returned by the HTTP server for 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let raw = r#"{
            "query": "tides",
            "previousConversation": [{"user": "moon?"}, {"assistant": "gravity"}],
            "followUpMode": "focused"
        }"#;
        let request: SearchRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.previous_conversation.len(), 2);
        assert_eq!(request.previous_conversation[0].assistant, None);
        assert_eq!(request.follow_up_mode, FollowUpMode::Focused);
        assert_eq!(request.concept, None);
    }

    #[test]
    fn test_minimal_request_defaults() {
        let request: SearchRequest = serde_json::from_str(r#"{"query":"tides"}"#).unwrap();
        assert!(request.previous_conversation.is_empty());
        assert_eq!(request.follow_up_mode, FollowUpMode::Expansive);
    }

    #[test]
    fn test_subject_prefers_non_empty_concept() {
        let request = SearchRequest::new("tides");
        assert_eq!(request.subject(), "tides");
        assert_eq!(request.clone().with_concept("  ").subject(), "tides");
        assert_eq!(request.with_concept("lunar gravity").subject(), "lunar gravity");
    }

    #[test]
    fn test_response_uses_camel_case() {
        let response = QueryResponse {
            response: "body".to_string(),
            follow_up_questions: vec!["Why?".to_string()],
            contextual_query: "q".to_string(),
            ..QueryResponse::default()
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["followUpQuestions"][0], "Why?");
        assert_eq!(json["contextualQuery"], "q");
        assert!(json["sources"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_citation_defaults_missing_fields() {
        let hit = SearchHit {
            url: Some("https://example.org".to_string()),
            ..SearchHit::default()
        };
        let citation = SourceCitation::from(&hit);
        assert_eq!(citation.uri, "https://example.org");
        assert_eq!(citation.title, "");
        assert_eq!(citation.author, "");
        assert_eq!(citation.image, "");
    }
}
