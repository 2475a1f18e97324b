use serde::{Deserialize, Serialize};

use super::ModelError;
use crate::config::ModelSettings;

/// Transport seam for the generative model. Implemented over HTTP in
/// production and by a scripted mock in tests.
pub trait GenerativeClient: Send + Sync {
    /// Text-only generation.
    fn generate(&self, prompt: &str) -> Result<String, ModelError>;

    /// Vision generation over a retrievable image URL.
    fn generate_vision(&self, prompt: &str, image_url: &str) -> Result<String, ModelError>;
}

/// HTTP client for a Gemini-style `generateContent` API.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn from_settings(settings: &ModelSettings) -> Self {
        Self::new(
            &settings.base_url,
            &settings.api_key,
            &settings.model,
            settings.timeout_secs,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, parts: Vec<Part>) -> Result<String, ModelError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                ModelError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ModelError::Timeout(self.timeout_secs)
            } else {
                ModelError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| ModelError::ResponseParsing(e.to_string()))?;

        let text: String = parsed
            .candidates
            .first()
            .ok_or(ModelError::EmptyResponse)?
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();

        Ok(text)
    }
}

impl GenerativeClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.request(vec![Part::text(prompt)])
    }

    fn generate_vision(&self, prompt: &str, image_url: &str) -> Result<String, ModelError> {
        self.request(vec![Part::text(prompt), Part::image(image_url)])
    }
}

/// Request body for `models/{model}:generateContent`
#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            file_data: None,
        }
    }

    fn image(url: &str) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                file_uri: url.to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    file_uri: String,
}

/// Response body from `generateContent`
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

/// Mock model client for testing — scripted per-call outcomes with
/// configurable defaults, separately for text and vision calls.
pub struct MockGenerativeClient {
    vision_queue: std::sync::Mutex<std::collections::VecDeque<MockOutcome>>,
    text_queue: std::sync::Mutex<std::collections::VecDeque<MockOutcome>>,
    vision_default: MockOutcome,
    text_default: MockOutcome,
}

#[derive(Clone)]
enum MockOutcome {
    Reply(String),
    Fail,
}

impl MockOutcome {
    fn resolve(&self) -> Result<String, ModelError> {
        match self {
            Self::Reply(text) => Ok(text.clone()),
            Self::Fail => Err(ModelError::Http("mock transport failure".into())),
        }
    }
}

impl MockGenerativeClient {
    /// All calls fail until responses are configured.
    pub fn new() -> Self {
        Self {
            vision_queue: std::sync::Mutex::new(std::collections::VecDeque::new()),
            text_queue: std::sync::Mutex::new(std::collections::VecDeque::new()),
            vision_default: MockOutcome::Fail,
            text_default: MockOutcome::Fail,
        }
    }

    /// Default response for every vision call.
    pub fn with_vision(mut self, response: &str) -> Self {
        self.vision_default = MockOutcome::Reply(response.to_string());
        self
    }

    /// Default response for every text call.
    pub fn with_text(mut self, response: &str) -> Self {
        self.text_default = MockOutcome::Reply(response.to_string());
        self
    }

    /// Queue a one-shot vision response, consumed before the default.
    pub fn queue_vision(self, response: &str) -> Self {
        self.vision_queue
            .lock()
            .unwrap()
            .push_back(MockOutcome::Reply(response.to_string()));
        self
    }

    /// Queue a one-shot vision transport failure.
    pub fn queue_vision_failure(self) -> Self {
        self.vision_queue.lock().unwrap().push_back(MockOutcome::Fail);
        self
    }

    /// Queue a one-shot text response, consumed before the default.
    pub fn queue_text(self, response: &str) -> Self {
        self.text_queue
            .lock()
            .unwrap()
            .push_back(MockOutcome::Reply(response.to_string()));
        self
    }
}

impl Default for MockGenerativeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerativeClient for MockGenerativeClient {
    fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        let queued = self.text_queue.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.text_default.clone()).resolve()
    }

    fn generate_vision(&self, _prompt: &str, _image_url: &str) -> Result<String, ModelError> {
        let queued = self.vision_queue.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.vision_default.clone()).resolve()
    }
}
