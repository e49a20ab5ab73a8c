use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default hosted assistant endpoint (Anthropic Messages API).
pub const DEFAULT_ASSISTANT_URL: &str = "https://api.anthropic.com/v1/messages";

pub const DEFAULT_ASSISTANT_MODEL: &str = "claude-sonnet-4-5";

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Reply budget. Large orders produce long JSON arrays.
const MAX_REPLY_TOKENS: u32 = 8192;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Assistant is not reachable at {0}")]
    Connection(String),

    #[error("Assistant returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Assistant reply contained no text")]
    EmptyReply,
}

/// Raw order content handed to the assistant.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantContent {
    Text(String),
    /// Base64-encoded image bytes with their media type (e.g. `image/jpeg`).
    Image { media_type: String, data: String },
}

/// Seam to the external extraction assistant.
///
/// Implementations send the system context, the raw content and the task
/// instruction, and return the reply text untouched.
pub trait AssistantClient {
    fn complete(
        &self,
        system: &str,
        content: &AssistantContent,
        instruction: &str,
    ) -> Result<String, AssistantError>;
}

/// Blocking client for the Anthropic Messages API.
pub struct AnthropicClient {
    url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl AnthropicClient {
    pub fn new(url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, AssistantError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AssistantError::HttpClient(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Text { text: &'a str },
    Image { source: ImageSource<'a> },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

fn content_blocks<'a>(content: &'a AssistantContent, instruction: &'a str) -> Vec<ContentBlock<'a>> {
    match content {
        AssistantContent::Text(text) => vec![
            ContentBlock::Text { text: instruction },
            ContentBlock::Text { text },
        ],
        AssistantContent::Image { media_type, data } => vec![
            ContentBlock::Image {
                source: ImageSource {
                    kind: "base64",
                    media_type,
                    data,
                },
            },
            ContentBlock::Text { text: instruction },
        ],
    }
}

impl AssistantClient for AnthropicClient {
    fn complete(
        &self,
        system: &str,
        content: &AssistantContent,
        instruction: &str,
    ) -> Result<String, AssistantError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_REPLY_TOKENS,
            system,
            messages: vec![Message {
                role: "user",
                content: content_blocks(content, instruction),
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AssistantError::Connection(self.url.clone())
                } else if e.is_timeout() {
                    AssistantError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    AssistantError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .map_err(|e| AssistantError::HttpClient(format!("Invalid response body: {e}")))?;

        let reply = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if reply.trim().is_empty() {
            return Err(AssistantError::EmptyReply);
        }
        Ok(reply)
    }
}
