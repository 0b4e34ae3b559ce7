use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codegen::error::CodegenError;
use crate::codegen::inference::{
    DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL,
    MockInference, OllamaBackend, OpenAiBackend, TextInference,
};
use crate::codegen::prompt::{CodegenRequest, build_prompt};
use crate::locator::locator_model::LocatorCollection;

/// Returned by the mock backend so offline runs still produce output.
pub const MOCK_CODE: &str = "// TODO: code generation backend is 'mock'; no model was called";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    #[value(name = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
    Mock,
}

/// Connection settings for a model backend; `None` means the backend default.
#[derive(Debug, Clone, Default)]
pub struct BackendSettings {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub temperature: f32,
    pub api_key_env: String,
}

pub fn build_backend(
    kind: BackendKind,
    settings: &BackendSettings,
) -> Result<Box<dyn TextInference>, CodegenError> {
    match kind {
        BackendKind::OpenAi => {
            let endpoint = settings.endpoint.as_deref().unwrap_or(DEFAULT_OPENAI_ENDPOINT);
            let model = settings.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
            Ok(Box::new(OpenAiBackend::from_env(
                endpoint,
                model,
                settings.temperature,
                &settings.api_key_env,
            )?))
        }
        BackendKind::Ollama => {
            let endpoint = settings.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
            let model = settings.model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL);
            Ok(Box::new(OllamaBackend::new(endpoint, model, settings.temperature)))
        }
        BackendKind::Mock => Ok(Box::new(MockInference::new(MOCK_CODE))),
    }
}

/// Maps test steps onto extracted locators by prompting a language model.
pub struct CodeGenerator {
    backend: Box<dyn TextInference>,
}

impl CodeGenerator {
    pub fn new(backend: Box<dyn TextInference>) -> Self {
        Self { backend }
    }

    /// Generate code for `request` using only the given locators.
    pub fn generate(
        &self,
        request: &CodegenRequest,
        locators: &LocatorCollection,
    ) -> Result<String, CodegenError> {
        let prompt = build_prompt(request, locators);
        info!(
            language = %request.language,
            tool = %request.tool,
            elements = locators.len(),
            "generating code"
        );

        let raw = self.backend.complete(&prompt)?;
        let code = strip_code_fence(&raw);
        if code.is_empty() {
            return Err(CodegenError::EmptyResponse);
        }
        Ok(code.to_string())
    }
}

/// Trim, and drop one enclosing ``` fence if the model added it anyway.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Skip the info string (```java) up to the first newline
    match body.find('\n') {
        Some(pos) => body[pos + 1..].trim(),
        None => body.trim(),
    }
}
