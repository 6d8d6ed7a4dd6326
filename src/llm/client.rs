//! Client for the external generative model.
//!
//! Speaks an Ollama-style generate API. The model is the system's only
//! source of semantic understanding; this module holds the two
//! example-anchored prompt templates that constrain its output shape and
//! nothing else — no retries, no response repair beyond trimming.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Few-shot template for describing extracted document content.
pub const DESCRIPTION_PROMPT: &str = r#"You are a descriptive analyst. Produce a brief, factual description of the item below.

The description must follow this format exactly:
1. A one-to-three-word title on its own line.
2. A body of 2-4 short lines covering only verifiable details. Do not interpret or analyze function.
Do not emit headings such as 'Title' or 'Body'.
---
Examples to follow:

Access Card Reader

A person is holding an access card against a
card reader mounted near a door labeled "211
IDF/Electrical." The card reader has a light
indicator.

Biometric Attendance System

A wall-mounted electronic biometric device
with fingerprint scanning, keypad, and display
screen showing time.

Visitors Logbook

A paper-based visitor logbook where
individuals manually write their name, reason
for visit, time in/out, and provide a signature.
Two entries are already filled in.

---
New item to describe:
{content}"#;

/// Few-shot template for describing an image directly.
pub const IMAGE_DESCRIPTION_PROMPT: &str = r#"You are a visual summarizer. Look at the image and write a short, factual description in exactly two parts:

1. A title of 2-4 words naming the main object or system.
2. A body of 1-2 lines stating what is shown. Avoid interpretive words such as 'appears', 'seems', or 'likely', and do not describe colors, lighting, or materials.

---
Examples to follow:

Access Card Reader

A person is holding an access card against a
card reader mounted near a door labeled "211
IDF/Electrical."

Biometric Attendance System

A wall-mounted electronic biometric device
with fingerprint scanning, keypad, and display
screen showing time.

---
New image to describe:
"#;

/// Few-shot template for extracting key findings from a description.
pub const FINDINGS_PROMPT: &str = r#"Analyze the file description below and extract the key findings. The findings should summarize the system's purpose, functionality, advantages, and potential vulnerabilities, following the format of the examples. Do not include a 'Key Findings' heading.
---
Example 1:

File description:
Access Card Reader

A person is holding an access card against a card reader mounted near a door labeled "211 IDF/Electrical." The card reader has a light indicator.

Key findings:
- Digital access control system using ID/employee cards.
- Automates entry tracking by time-stamping when the card is swiped.
- Dependent on card validity and system integrity (cards can be lost or borrowed).

---
Example 2:

File description:
Biometric Attendance System

A wall-mounted electronic biometric device with fingerprint scanning, keypad, and display screen showing time.

Key findings:
- Uses biometric authentication (fingerprint) for high security.
- Eliminates risks of proxy entry or shared access.
- Provides accurate, automated attendance and access logs.

---
Example 3:

File description:
Visitors Logbook

A paper-based visitor logbook where individuals manually write their name, reason for visit, time in/out, and provide a signature.

Key findings:
- Manual entry system, dependent on handwriting.
- Prone to errors, illegible writing, and falsification.
- No automatic time tracking; relies on the honesty of the visitor.

---
New request:

File description:
{content}

Key findings:
"#;

/// Configuration for the model client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Generate API endpoint (default: http://localhost:11434).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model to use. Must accept image inputs for the image path.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in a response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum characters of document content to send.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "llama3.2-vision".to_string()
}
fn default_max_tokens() -> u32 {
    512
}
fn default_temperature() -> f32 {
    0.2
}
fn default_timeout_secs() -> u64 {
    300
}
fn default_max_content_chars() -> usize {
    12000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl LlmConfig {
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

/// Errors from model calls.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("model API error: {0}")]
    Api(String),

    #[error("failed to parse model response: {0}")]
    Parse(String),
}

/// The two-operation contract with the external generative model.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a title-plus-body description from document content.
    async fn describe(&self, content: &str) -> Result<String, LlmError>;

    /// Produce a description directly from an image.
    async fn describe_image(&self, image: &[u8]) -> Result<String, LlmError>;

    /// Produce a raw key-findings block from a description.
    async fn summarize_findings(&self, description: &str) -> Result<String, LlmError>;
}

/// Production client over the generate API.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Generate API request format.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

/// Generate API response format.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl LlmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Check if the model service is reachable.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.config.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Truncate content to the configured maximum (UTF-8 safe).
    fn truncate_content<'a>(&self, text: &'a str) -> &'a str {
        if text.len() <= self.config.max_content_chars {
            return text;
        }
        let mut end = self.config.max_content_chars;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }

    /// Call the generate API with a prompt and optional image payload.
    async fn call_generate(
        &self,
        prompt: String,
        images: Option<Vec<String>>,
    ) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            stream: false,
            images,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(parsed.response)
    }
}

#[async_trait]
impl Summarizer for LlmClient {
    async fn describe(&self, content: &str) -> Result<String, LlmError> {
        let prompt = DESCRIPTION_PROMPT.replace("{content}", self.truncate_content(content));
        debug!("requesting description ({} chars of content)", content.len());
        self.call_generate(prompt, None).await
    }

    async fn describe_image(&self, image: &[u8]) -> Result<String, LlmError> {
        debug!("requesting image description ({} bytes)", image.len());
        let encoded = BASE64.encode(image);
        self.call_generate(IMAGE_DESCRIPTION_PROMPT.to_string(), Some(vec![encoded]))
            .await
    }

    async fn summarize_findings(&self, description: &str) -> Result<String, LlmError> {
        let prompt = FINDINGS_PROMPT.replace("{content}", self.truncate_content(description));
        debug!("requesting key findings");
        self.call_generate(prompt, None).await
    }
}

/// Canned summarizer for tests: returns fixed text, no network.
#[cfg(test)]
pub struct CannedSummarizer {
    pub description: String,
    pub findings: String,
}

#[cfg(test)]
#[async_trait]
impl Summarizer for CannedSummarizer {
    async fn describe(&self, _content: &str) -> Result<String, LlmError> {
        Ok(self.description.clone())
    }

    async fn describe_image(&self, _image: &[u8]) -> Result<String, LlmError> {
        Ok(self.description.clone())
    }

    async fn summarize_findings(&self, _description: &str) -> Result<String, LlmError> {
        Ok(self.findings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_templates_carry_content_placeholder() {
        assert!(DESCRIPTION_PROMPT.contains("{content}"));
        assert!(FINDINGS_PROMPT.contains("{content}"));
        // The image prompt sends the image out of band instead.
        assert!(!IMAGE_DESCRIPTION_PROMPT.contains("{content}"));
    }

    #[test]
    fn default_config_is_sane() {
        let config = LlmConfig::default();
        assert!(config.endpoint.starts_with("http"));
        assert!(config.max_content_chars > 0);
        assert!(config.temperature <= 1.0);
    }

    #[test]
    fn builders_override_fields() {
        let config = LlmConfig::default()
            .with_endpoint("http://model.internal:11434")
            .with_model("llava");
        assert_eq!(config.endpoint, "http://model.internal:11434");
        assert_eq!(config.model, "llava");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut config = LlmConfig::default();
        config.max_content_chars = 5;
        let client = LlmClient::new(config);

        // "héllo world" - the accented char spans two bytes.
        let truncated = client.truncate_content("héllo world");
        assert!(truncated.len() <= 5);
        assert!("héllo world".starts_with(truncated));
    }
}
