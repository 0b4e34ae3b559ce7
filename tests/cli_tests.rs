use clap::Parser;
use locator_codegen::{
    cli::{
        commands::{GlobalOverrides, backend_settings, format_locators, resolve_source},
        config::{AppConfig, Cli, Commands, Engine, LocatorFormat, SourceArgs, load_config},
        logging::level_for_verbosity,
    },
    codegen::{
        generator::BackendKind,
        prompt::{Language, Tool},
    },
    browser::snapshot::PageSource,
    extract_from_html,
    locator::extractor::DEFAULT_UNIQUE_WAIT,
};

mod common;
use crate::common::utils::LOGIN_PAGE;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_generate_minimal() {
    let cli = Cli::parse_from([
        "locator-codegen",
        "generate",
        "--url",
        "https://example.com",
        "--test-steps",
        "Click login",
    ]);
    match cli.command {
        Commands::Generate {
            source,
            language,
            tool,
            test_case,
            test_steps,
            engine,
            backend,
            output,
            ..
        } => {
            assert_eq!(source.url.as_deref(), Some("https://example.com"));
            assert!(source.html_file.is_none());
            assert_eq!(language, None);
            assert_eq!(tool, None);
            assert_eq!(test_case, "");
            assert_eq!(test_steps, "Click login");
            assert_eq!(engine, None);
            assert_eq!(backend, None);
            assert!(output.is_none());
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn cli_parse_generate_all_args() {
    let cli = Cli::parse_from([
        "locator-codegen",
        "-vv",
        "generate",
        "--html-file",
        "page.html",
        "--language",
        "csharp",
        "--tool",
        "robot-framework",
        "--test-case",
        "Login with valid credentials",
        "--test-data",
        "username=admin",
        "--test-steps",
        "Enter username",
        "--engine",
        "static",
        "--backend",
        "ollama",
        "--output",
        "LoginTest.cs",
        "--model",
        "llama3",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.model.as_deref(), Some("llama3"));
    match cli.command {
        Commands::Generate {
            source,
            language,
            tool,
            test_case,
            test_data,
            engine,
            backend,
            output,
            ..
        } => {
            assert_eq!(source.html_file.as_deref(), Some("page.html"));
            assert_eq!(language, Some(Language::CSharp));
            assert_eq!(tool, Some(Tool::RobotFramework));
            assert_eq!(test_case, "Login with valid credentials");
            assert_eq!(test_data, "username=admin");
            assert_eq!(engine, Some(Engine::Static));
            assert_eq!(backend, Some(BackendKind::Ollama));
            assert_eq!(output.as_deref(), Some("LoginTest.cs"));
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn cli_rejects_both_url_and_html_file() {
    let result = Cli::try_parse_from([
        "locator-codegen",
        "locators",
        "--url",
        "https://example.com",
        "--html-file",
        "page.html",
    ]);
    assert!(result.is_err());
}

#[test]
fn cli_requires_a_page_source() {
    let result = Cli::try_parse_from(["locator-codegen", "locators"]);
    assert!(result.is_err());
}

#[test]
fn cli_parse_locators_format() {
    let cli = Cli::parse_from([
        "locator-codegen",
        "locators",
        "--url",
        "https://example.com",
        "--format",
        "json",
    ]);
    match cli.command {
        Commands::Locators { format, engine, .. } => {
            assert_eq!(format, LocatorFormat::Json);
            assert_eq!(engine, None);
        }
        _ => panic!("Expected Locators command"),
    }
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn load_config_missing_file_returns_defaults() {
    let config = load_config(Some("/nonexistent/path/locator-codegen.yaml"));
    assert_eq!(config.llm.backend, BackendKind::OpenAi);
    assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    assert!((config.llm.temperature - 0.1).abs() < f32::EPSILON);
    assert_eq!(config.browser.engine, Engine::Browser);
    assert_eq!(config.browser.unique_wait_ms, 1000);
    assert_eq!(config.browser.load_timeout_ms, 10_000);
    assert_eq!(config.defaults.language, Language::Java);
    assert_eq!(config.defaults.tool, Tool::Selenium);
}

#[test]
fn default_unique_wait_matches_extractor_default() {
    let config = AppConfig::default();
    assert_eq!(
        config.browser.unique_wait_ms,
        DEFAULT_UNIQUE_WAIT.as_millis() as u64
    );
}

#[test]
fn load_config_partial_yaml_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locator-codegen.yaml");
    std::fs::write(
        &path,
        "llm:\n  backend: ollama\n  model: llama3\nbrowser:\n  engine: static\ndefaults:\n  language: python\n  tool: playwright\ntrace:\n  path: null\n",
    )
    .unwrap();

    let config = load_config(path.to_str());

    assert_eq!(config.llm.backend, BackendKind::Ollama);
    assert_eq!(config.llm.model.as_deref(), Some("llama3"));
    assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.browser.engine, Engine::Static);
    assert_eq!(config.browser.unique_wait_ms, 1000);
    assert_eq!(config.defaults.language, Language::Python);
    assert_eq!(config.defaults.tool, Tool::Playwright);
    assert!(config.trace.path.is_none());
}

#[test]
fn load_config_malformed_yaml_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "llm: [unclosed").unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.llm.backend, BackendKind::OpenAi);
}

#[test]
fn cli_overrides_beat_config() {
    let mut config = AppConfig::default();
    config.llm.endpoint = Some("http://config-endpoint".into());
    config.llm.model = Some("config-model".into());

    let overrides = GlobalOverrides {
        endpoint: None,
        model: Some("cli-model".into()),
    };
    let settings = backend_settings(&config, &overrides);

    assert_eq!(settings.endpoint.as_deref(), Some("http://config-endpoint"));
    assert_eq!(settings.model.as_deref(), Some("cli-model"));
}

// ============================================================================
// Helpers
// ============================================================================

#[test]
fn resolve_source_reads_html_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html");
    std::fs::write(&path, LOGIN_PAGE).unwrap();

    let source = resolve_source(&SourceArgs {
        url: None,
        html_file: Some(path.to_string_lossy().into_owned()),
    })
    .unwrap();

    assert_eq!(source, PageSource::Html(LOGIN_PAGE.to_string()));
}

#[test]
fn resolve_source_missing_file_is_an_error() {
    let result = resolve_source(&SourceArgs {
        url: None,
        html_file: Some("/nonexistent/page.html".into()),
    });
    assert!(result.is_err());
}

#[test]
fn format_locators_text_and_json() {
    let locators = extract_from_html(LOGIN_PAGE).unwrap();

    let text = format_locators(&locators, LocatorFormat::Text).unwrap();
    assert!(text.starts_with("username: //input[@id='username']\n"));
    assert!(text.ends_with("Log_In: //button[text()='Log In']\n"));

    let json = format_locators(&locators, LocatorFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["tag"], "input");
    assert_eq!(value[0]["attribute"], "id");
    assert_eq!(value[3]["attribute"], "text");
    assert_eq!(value[3]["locator_expression"], "//button[text()='Log In']");

    let yaml = format_locators(&locators, LocatorFormat::Yaml).unwrap();
    assert!(yaml.contains("variable_name: Log_In"));
}

#[test]
fn verbosity_maps_to_levels() {
    assert_eq!(level_for_verbosity(0), "warn");
    assert_eq!(level_for_verbosity(1), "info");
    assert_eq!(level_for_verbosity(2), "debug");
    assert_eq!(level_for_verbosity(7), "trace");
}
