use std::io::BufRead;

use locator_codegen::{
    browser::{
        error::BrowserError,
        html_snapshot::{HtmlSnapshot, StaticPageProvider},
        snapshot::{PageProvider, PageSource},
    },
    codegen::{
        generator::CodeGenerator,
        inference::MockInference,
        prompt::{Language, Tool},
    },
    locator::extractor::LocatorExtractor,
    pipeline::{
        error::PipelineError,
        runner::{GenerationRequest, collect_locators, run_pipeline},
    },
    trace::{
        logger::TraceLogger,
        trace::{PipelineStage, StageStatus, TraceEvent},
    },
};

mod common;
use crate::common::utils::LOGIN_PAGE;

fn html_request(html: &str) -> GenerationRequest {
    GenerationRequest {
        source: PageSource::Html(html.to_string()),
        language: Language::Java,
        tool: Tool::Selenium,
        test_case: "Login".into(),
        test_data: "username=admin".into(),
        test_steps: "Enter username, Click login".into(),
    }
}

fn read_trace(path: &std::path::Path) -> Vec<TraceEvent> {
    let file = std::fs::File::open(path).unwrap();
    std::io::BufReader::new(file)
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
        .collect()
}

/// Provider that counts fetches and can be told to fail.
struct RecordingProvider {
    fetches: usize,
    fail: bool,
}

impl PageProvider for RecordingProvider {
    type Snapshot = HtmlSnapshot;

    fn fetch(&mut self, source: &PageSource) -> Result<HtmlSnapshot, BrowserError> {
        self.fetches += 1;
        if self.fail {
            return Err(BrowserError::SessionProtocol {
                command: "navigate".into(),
                error: "net::ERR_NAME_NOT_RESOLVED".into(),
            });
        }
        match source {
            PageSource::Html(html) => Ok(HtmlSnapshot::parse(html)),
            PageSource::Url(_) => Ok(HtmlSnapshot::parse(LOGIN_PAGE)),
        }
    }
}

#[test]
fn pipeline_runs_all_three_stages_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let trace_path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(trace_path.to_str().unwrap());
    let generator = CodeGenerator::new(Box::new(MockInference::new("driver.get(url);")));

    let outcome = run_pipeline(
        &html_request(LOGIN_PAGE),
        &mut StaticPageProvider::new(),
        &LocatorExtractor::default(),
        &generator,
        &tracer,
    )
    .unwrap();

    assert_eq!(outcome.code, "driver.get(url);");
    assert_eq!(outcome.locators.len(), 4);

    let events = read_trace(&trace_path);
    let stages: Vec<_> = events.iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            PipelineStage::FetchPage,
            PipelineStage::ExtractLocators,
            PipelineStage::GenerateCode,
        ]
    );
    assert!(events.iter().all(|e| e.status == StageStatus::Ok));
    assert_eq!(events[1].locator_count, Some(4));
}

#[test]
fn fetch_failure_stops_before_generation() {
    let dir = tempfile::tempdir().unwrap();
    let trace_path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(trace_path.to_str().unwrap());
    let mut provider = RecordingProvider {
        fetches: 0,
        fail: true,
    };

    let result = run_pipeline(
        &html_request("<p></p>"),
        &mut provider,
        &LocatorExtractor::default(),
        &CodeGenerator::new(Box::new(MockInference::new("unused"))),
        &tracer,
    );

    assert!(matches!(result, Err(PipelineError::Fetch(_))));
    assert_eq!(provider.fetches, 1, "no retry");

    let events = read_trace(&trace_path);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].stage, PipelineStage::FetchPage);
    assert_eq!(events[0].status, StageStatus::Failed);
    assert!(events[0].detail.as_deref().unwrap().contains("ERR_NAME_NOT_RESOLVED"));
}

#[test]
fn empty_page_still_reaches_code_generation() {
    let generator = CodeGenerator::new(Box::new(MockInference::new("// TODO: element not found")));

    let outcome = run_pipeline(
        &html_request("<html><body><p>nothing here</p></body></html>"),
        &mut StaticPageProvider::new(),
        &LocatorExtractor::default(),
        &generator,
        &TraceLogger::disabled(),
    )
    .unwrap();

    assert!(outcome.locators.is_empty());
    assert_eq!(outcome.code, "// TODO: element not found");
}

#[test]
fn start_url_only_set_for_url_sources() {
    let from_html = html_request("<p></p>").codegen_request();
    assert_eq!(from_html.start_url, "");

    let mut from_url = html_request("");
    from_url.source = PageSource::Url("https://example.com".into());
    assert_eq!(from_url.codegen_request().start_url, "https://example.com");
}

#[test]
fn collect_locators_uses_provider_snapshot() {
    let mut provider = RecordingProvider {
        fetches: 0,
        fail: false,
    };

    let locators = collect_locators(
        &PageSource::Url("https://example.com/login".into()),
        &mut provider,
        &LocatorExtractor::default(),
        &TraceLogger::disabled(),
    )
    .unwrap();

    assert_eq!(provider.fetches, 1);
    assert!(locators.find_by_variable("Log_In").is_some());
}

#[test]
fn unopenable_trace_path_disables_tracing() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("missing").join("trace.jsonl");

    let tracer = TraceLogger::new(bad.to_str().unwrap());

    assert!(!tracer.is_enabled());
    tracer.log(&TraceEvent::now(PipelineStage::FetchPage, StageStatus::Ok));
}
