use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codegen::error::CodegenError;
use crate::codegen::prompt::ChatPrompt;

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:1.5b";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// A language model that turns a chat prompt into text.
pub trait TextInference {
    fn complete(&self, prompt: &ChatPrompt) -> Result<String, CodegenError>;
}

// ============================================================================
// OpenAI-compatible chat completions
// ============================================================================

pub struct OpenAiBackend {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    api_key: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiBackend {
    pub fn new(endpoint: &str, model: &str, temperature: f32, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            temperature,
            api_key: api_key.to_string(),
        }
    }

    /// Read the API key from `env_var`.
    pub fn from_env(
        endpoint: &str,
        model: &str,
        temperature: f32,
        env_var: &str,
    ) -> Result<Self, CodegenError> {
        let api_key = std::env::var(env_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CodegenError::MissingApiKey(env_var.to_string()))?;
        Ok(Self::new(endpoint, model, temperature, &api_key))
    }
}

impl TextInference for OpenAiBackend {
    fn complete(&self, prompt: &ChatPrompt) -> Result<String, CodegenError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "requesting chat completion");
        let response = reqwest::blocking::Client::new()
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| CodegenError::Http {
                endpoint: self.endpoint.clone(),
                source: e,
            })?;

        let response = check_status(&self.endpoint, response)?;
        let parsed: ChatResponse = response.json().map_err(|e| CodegenError::Http {
            endpoint: self.endpoint.clone(),
            source: e,
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CodegenError::EmptyResponse)
    }
}

// ============================================================================
// Ollama generate API
// ============================================================================

pub struct OllamaBackend {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(endpoint: &str, model: &str, temperature: f32) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            temperature,
        }
    }
}

impl TextInference for OllamaBackend {
    fn complete(&self, prompt: &ChatPrompt) -> Result<String, CodegenError> {
        let request = OllamaRequest {
            model: &self.model,
            system: &prompt.system,
            prompt: &prompt.user,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "requesting ollama generation");
        let response = reqwest::blocking::Client::new()
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| CodegenError::Http {
                endpoint: self.endpoint.clone(),
                source: e,
            })?;

        let response = check_status(&self.endpoint, response)?;
        let parsed: OllamaResponse = response.json().map_err(|e| CodegenError::Http {
            endpoint: self.endpoint.clone(),
            source: e,
        })?;
        Ok(parsed.response)
    }
}

fn check_status(
    endpoint: &str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, CodegenError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(CodegenError::BadStatus {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

// ============================================================================
// Mock backend (for testing without a model)
// ============================================================================

/// Returns a canned response and remembers the last prompt it saw.
pub struct MockInference {
    pub response: String,
    last_prompt: std::sync::Mutex<Option<ChatPrompt>>,
}

impl MockInference {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            last_prompt: std::sync::Mutex::new(None),
        }
    }

    pub fn last_prompt(&self) -> Option<ChatPrompt> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

impl TextInference for MockInference {
    fn complete(&self, prompt: &ChatPrompt) -> Result<String, CodegenError> {
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.clone());
        }
        Ok(self.response.clone())
    }
}
