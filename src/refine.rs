//! Abstractive refinement of the extractive draft.
//!
//! Sends the draft to an external chat-completion service with a fixed
//! instruction template and extracts a `{title, summary}` JSON object from
//! the reply, tolerating explanatory prose wrapped around the payload.
//! One request per summarization; retry policy belongs to the caller.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RefineError;

/// The terminal artifact of a summarization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinedSummary {
    /// Brief descriptive heading for the main theme.
    pub title: String,
    /// The refined 4–5 sentence summary text.
    pub summary: String,
}

/// A blocking text-completion capability: prompt in, untrusted free text out.
pub trait Completion: Send + Sync {
    /// Request a single completion for the given prompt.
    fn complete(&self, prompt: &str) -> Result<String, RefineError>;
}

// ---------------------------------------------------------------------------
// OpenAI-compatible chat client
// ---------------------------------------------------------------------------

/// Configuration for the chat-completion client.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Base URL of an OpenAI-compatible API (e.g. an Ollama or vLLM server).
    pub base_url: String,
    /// Model name to use.
    pub model: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature.
    pub temperature: f64,
    /// Completion token cap.
    pub max_tokens: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".into(),
            model: "llama3.2".into(),
            api_key: None,
            timeout_secs: 120,
            temperature: 0.3,
            max_tokens: 1024,
        }
    }
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiCompatClient {
    config: CompletionConfig,
}

impl OpenAiCompatClient {
    /// Create a new completion client with the given configuration.
    pub fn new(config: CompletionConfig) -> Self {
        Self { config }
    }
}

impl Completion for OpenAiCompatClient {
    fn complete(&self, prompt: &str) -> Result<String, RefineError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build();

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.config.temperature,
            "top_p": 1.0,
            "max_tokens": self.config.max_tokens,
            "stream": false,
        });
        let body_str = serde_json::to_string(&body).map_err(|e| RefineError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        let mut request = agent.post(&url).set("Content-Type", "application/json");
        if let Some(key) = &self.config.api_key {
            request = request.set("Authorization", &format!("Bearer {key}"));
        }

        let resp = request
            .send_string(&body_str)
            .map_err(|e: ureq::Error| RefineError::RequestFailed {
                message: e.to_string(),
            })?;

        let resp_str = resp.into_string().map_err(|e| RefineError::RequestFailed {
            message: format!("read body: {e}"),
        })?;
        let json: serde_json::Value =
            serde_json::from_str(&resp_str).map_err(|e| RefineError::RequestFailed {
                message: format!("malformed response envelope: {e}"),
            })?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or(RefineError::EmptyReply)
    }
}

// ---------------------------------------------------------------------------
// Refinement
// ---------------------------------------------------------------------------

/// Instruction template for the rewrite. Demands point expansion, context,
/// accessible language, a 4–5 sentence final length, and a strict JSON-only
/// reply with `title` and `summary` keys.
fn refinement_prompt(draft: &str) -> String {
    format!(
        "Please refine the following summary by performing the following steps:\n\
         1. Expand on the key points with more detailed explanations and relevant \
         examples, ensuring a deeper understanding of the topic.\n\
         2. Provide clear context where needed, explaining the significance of the \
         points to improve clarity for a broad audience.\n\
         3. Use engaging and accessible language, avoiding jargon or overly complex \
         terms, so the content is easy to read and understand.\n\
         4. Ensure the final version is concise, ideally within 4 to 5 sentences, \
         while still covering all major points.\n\
         5. Return a JSON object containing the following fields:\n\
         \x20  - \"title\": A brief, descriptive title or heading summarizing the main theme.\n\
         \x20  - \"summary\": The refined and improved text of the summary.\n\n\
         Original summary:\n{draft}\n\n\
         Please only return the JSON object, without any additional commentary or explanation."
    )
}

/// Refine an extractive draft into a `{title, summary}` pair.
///
/// Issues exactly one completion request over the complete draft and parses
/// the JSON object out of the reply. Any network failure, missing object,
/// or missing key surfaces as a typed [`RefineError`].
pub fn refine(client: &dyn Completion, draft: &str) -> Result<RefinedSummary, RefineError> {
    let reply = client.complete(&refinement_prompt(draft))?;
    debug!(reply_len = reply.len(), "received completion reply");
    extract_json(&reply)
}

/// Extract the first JSON object embedded in untrusted free text.
///
/// Scans from the first `{` tracking brace depth, skipping braces inside
/// string literals (escape-aware), and stops where the object closes. This
/// survives commentary both before AND after the payload, including trailing
/// prose that itself contains `}` characters.
pub fn extract_json(reply: &str) -> Result<RefinedSummary, RefineError> {
    let start = reply.find('{').ok_or(RefineError::NoJsonObject)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut end = None;

    for (offset, ch) in reply[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + offset + ch.len_utf8());
                    break;
                }
            }
            _ => {}
        }
    }

    let end = end.ok_or(RefineError::NoJsonObject)?;
    serde_json::from_str(&reply[start..end]).map_err(|e| RefineError::BadJson {
        message: e.to_string(),
    })
}
