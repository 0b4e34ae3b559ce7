use std::time::Duration;

use tracing::info;

use crate::browser::error::BrowserError;
use crate::browser::html_snapshot::StaticPageProvider;
use crate::browser::session::BrowserPageProvider;
use crate::browser::snapshot::PageSource;
use crate::cli::config::{AppConfig, Engine, LocatorFormat, SourceArgs};
use crate::codegen::generator::{BackendKind, BackendSettings, CodeGenerator, build_backend};
use crate::codegen::prompt::{Language, Tool};
use crate::locator::extractor::LocatorExtractor;
use crate::locator::locator_model::LocatorCollection;
use crate::pipeline::runner::{GenerationRequest, collect_locators, run_pipeline};
use crate::trace::logger::TraceLogger;

/// Overrides shared by every subcommand: CLI > config file > defaults.
#[derive(Debug, Clone, Default)]
pub struct GlobalOverrides {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

// ============================================================================
// generate subcommand
// ============================================================================

pub struct GenerateArgs {
    pub source: SourceArgs,
    pub language: Option<Language>,
    pub tool: Option<Tool>,
    pub test_case: String,
    pub test_data: String,
    pub test_steps: String,
    pub engine: Option<Engine>,
    pub backend: Option<BackendKind>,
    pub output: Option<String>,
}

pub fn cmd_generate(
    args: GenerateArgs,
    config: &AppConfig,
    overrides: &GlobalOverrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = GenerationRequest {
        source: resolve_source(&args.source)?,
        language: args.language.unwrap_or(config.defaults.language),
        tool: args.tool.unwrap_or(config.defaults.tool),
        test_case: args.test_case,
        test_data: args.test_data,
        test_steps: args.test_steps,
    };

    let backend_kind = args.backend.unwrap_or(config.llm.backend);
    let generator = CodeGenerator::new(build_backend(
        backend_kind,
        &backend_settings(config, overrides),
    )?);
    let extractor = build_extractor(config);
    let tracer = build_tracer(config);

    let outcome = match args.engine.unwrap_or(config.browser.engine) {
        Engine::Browser => run_pipeline(
            &request,
            &mut browser_provider(config),
            &extractor,
            &generator,
            &tracer,
        )?,
        Engine::Static => run_pipeline(
            &request,
            &mut StaticPageProvider::new(),
            &extractor,
            &generator,
            &tracer,
        )?,
    };

    if outcome.locators.is_empty() {
        info!("no locators found; generated code will rely on placeholders");
    }

    match args.output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", outcome.code))?;
            println!(
                "Code generated successfully ({} locators) -> {}",
                outcome.locators.len(),
                path
            );
        }
        None => println!("{}", outcome.code),
    }

    Ok(())
}

// ============================================================================
// locators subcommand
// ============================================================================

pub fn cmd_locators(
    source: &SourceArgs,
    format: LocatorFormat,
    engine: Option<Engine>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = resolve_source(source)?;
    let extractor = build_extractor(config);
    let tracer = build_tracer(config);

    let locators = match engine.unwrap_or(config.browser.engine) {
        Engine::Browser => {
            collect_locators(&source, &mut browser_provider(config), &extractor, &tracer)?
        }
        Engine::Static => {
            collect_locators(&source, &mut StaticPageProvider::new(), &extractor, &tracer)?
        }
    };

    print!("{}", format_locators(&locators, format)?);
    Ok(())
}

/// Render a collection for display.
pub fn format_locators(
    locators: &LocatorCollection,
    format: LocatorFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        LocatorFormat::Text => {
            let mut out = locators.available_elements();
            if !out.is_empty() {
                out.push('\n');
            }
            out
        }
        LocatorFormat::Json => format!("{}\n", serde_json::to_string_pretty(locators)?),
        LocatorFormat::Yaml => serde_yaml::to_string(locators)?,
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Turn `--url` / `--html-file` into a `PageSource`.
pub fn resolve_source(args: &SourceArgs) -> Result<PageSource, BrowserError> {
    let html = match &args.html_file {
        Some(path) => Some(std::fs::read_to_string(path).map_err(|e| BrowserError::ReadHtml {
            path: path.clone(),
            source: e,
        })?),
        None => None,
    };
    PageSource::from_parts(args.url.as_deref(), html.as_deref())
}

pub fn backend_settings(config: &AppConfig, overrides: &GlobalOverrides) -> BackendSettings {
    BackendSettings {
        endpoint: overrides.endpoint.clone().or_else(|| config.llm.endpoint.clone()),
        model: overrides.model.clone().or_else(|| config.llm.model.clone()),
        temperature: config.llm.temperature,
        api_key_env: config.llm.api_key_env.clone(),
    }
}

fn build_extractor(config: &AppConfig) -> LocatorExtractor {
    LocatorExtractor::new(Duration::from_millis(config.browser.unique_wait_ms))
}

fn browser_provider(config: &AppConfig) -> BrowserPageProvider {
    BrowserPageProvider::new(&config.browser.script, config.browser.load_timeout_ms)
}

fn build_tracer(config: &AppConfig) -> TraceLogger {
    match &config.trace.path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    }
}
