use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::browser::session::{DEFAULT_LOAD_TIMEOUT_MS, DEFAULT_SERVER_SCRIPT};
use crate::codegen::generator::BackendKind;
use crate::codegen::inference::DEFAULT_TEMPERATURE;
use crate::codegen::prompt::{Language, Tool};
use crate::locator::extractor::DEFAULT_UNIQUE_WAIT_MS;

pub const DEFAULT_CONFIG_PATH: &str = "locator-codegen.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "locator-codegen",
    version,
    about = "Generate UI automation code from a test case and a live page's locators"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Model API endpoint (overrides config)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Model name (overrides config)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Path to config file (default: locator-codegen.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

/// Where to load the page from. Exactly one is required.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// URL of the page under test
    #[arg(long)]
    pub url: Option<String>,

    /// Local HTML file to use instead of a URL
    #[arg(long)]
    pub html_file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract locators and generate automation code for a test case
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Target language
        #[arg(long, value_enum)]
        language: Option<Language>,

        /// Automation framework
        #[arg(long, value_enum)]
        tool: Option<Tool>,

        /// Test case name
        #[arg(long, default_value = "")]
        test_case: String,

        /// Test data, e.g. "username=admin, password=admin123"
        #[arg(long, default_value = "")]
        test_data: String,

        /// Test steps, e.g. "Enter username, Enter password, Click login"
        #[arg(long)]
        test_steps: String,

        /// Page engine: browser (headless Chromium) or static (no JS)
        #[arg(long, value_enum)]
        engine: Option<Engine>,

        /// Code generation backend
        #[arg(long, value_enum)]
        backend: Option<BackendKind>,

        /// Write generated code here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Only extract locators from a page and print them
    Locators {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = LocatorFormat::Text)]
        format: LocatorFormat,

        /// Page engine: browser (headless Chromium) or static (no JS)
        #[arg(long, value_enum)]
        engine: Option<Engine>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Browser,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LocatorFormat {
    Text,
    Json,
    Yaml,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `locator-codegen.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub trace: TraceConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub backend: BackendKind,

    pub endpoint: Option<String>,

    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            endpoint: None,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            api_key_env: default_api_key_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub engine: Engine,

    #[serde(default = "default_script")]
    pub script: String,

    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,

    #[serde(default = "default_unique_wait_ms")]
    pub unique_wait_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            script: default_script(),
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            unique_wait_ms: default_unique_wait_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// JSONL trace file; null disables tracing
    #[serde(default = "default_trace_path")]
    pub path: Option<String>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            path: default_trace_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub tool: Tool,
}

// Serde default helpers
fn default_temperature() -> f32 { DEFAULT_TEMPERATURE }
fn default_api_key_env() -> String { "OPENAI_API_KEY".to_string() }
fn default_script() -> String { DEFAULT_SERVER_SCRIPT.to_string() }
fn default_load_timeout_ms() -> u64 { DEFAULT_LOAD_TIMEOUT_MS }
fn default_unique_wait_ms() -> u64 { DEFAULT_UNIQUE_WAIT_MS }
fn default_trace_path() -> Option<String> { Some("codegen_trace.jsonl".to_string()) }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}
