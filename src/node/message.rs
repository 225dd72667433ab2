//! Chat request/response model.

use serde::{Deserialize, Serialize};

/// Arguments for a chat-completion call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    /// The user prompt.
    pub prompt: Option<String>,

    /// System prompt prepended to the conversation.
    pub system_prompt: Option<String>,

    /// Prior conversation turns, in the host's message encoding.
    pub contexts: Vec<serde_json::Value>,

    /// Image attachments by URL.
    pub image_urls: Vec<String>,

    /// Host session the request belongs to.
    pub session_id: Option<String>,

    /// Explicit model override. The router clears this before
    /// dispatching so every backend uses its own configured default.
    pub model: Option<String>,
}

/// One chat completion, or one chunk of a streaming completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatResponse {
    /// Completion text.
    pub text: Option<String>,

    /// Reasoning/thinking text, if the backend separates it.
    pub reasoning: Option<String>,

    /// Structured content chain, if the backend produces one.
    pub chain: Vec<ContentPart>,

    /// Token usage reported by the backend.
    pub usage: Option<Usage>,
}

/// One element of a structured content chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPart {
    pub text: Option<String>,
}

/// Backend-reported token usage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub completion_tokens: u64,
}

impl ChatResponse {
    /// Convenience constructor for a plain-text response.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Token and byte-size estimate for throughput accounting.
    ///
    /// Tokens come from the structured usage block when present. Size
    /// prefers the content chain's summed text lengths, falling back to
    /// the raw completion (or reasoning) text length.
    pub fn measure(&self) -> (u64, u64) {
        let tokens = self
            .usage
            .as_ref()
            .map(|u| u.completion_tokens)
            .unwrap_or(0);

        let size = if !self.chain.is_empty() {
            self.chain
                .iter()
                .filter_map(|part| part.text.as_ref())
                .map(|text| text.len() as u64)
                .sum()
        } else {
            self.text
                .as_deref()
                .or(self.reasoning.as_deref())
                .map(|text| text.len() as u64)
                .unwrap_or(0)
        };

        (tokens, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_prefers_usage_tokens() {
        let resp = ChatResponse {
            text: Some("hello".into()),
            usage: Some(Usage {
                completion_tokens: 42,
            }),
            ..ChatResponse::default()
        };
        assert_eq!(resp.measure(), (42, 5));
    }

    #[test]
    fn test_measure_sums_chain_text() {
        let resp = ChatResponse {
            text: Some("ignored when a chain exists".into()),
            chain: vec![
                ContentPart {
                    text: Some("abc".into()),
                },
                ContentPart { text: None },
                ContentPart {
                    text: Some("de".into()),
                },
            ],
            ..ChatResponse::default()
        };
        assert_eq!(resp.measure(), (0, 5));
    }

    #[test]
    fn test_measure_falls_back_to_reasoning() {
        let resp = ChatResponse {
            reasoning: Some("why".into()),
            ..ChatResponse::default()
        };
        assert_eq!(resp.measure(), (0, 3));
    }
}
