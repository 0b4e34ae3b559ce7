use std::time::Instant;

use tracing::info;

use crate::browser::snapshot::{PageProvider, PageSource};
use crate::codegen::generator::CodeGenerator;
use crate::codegen::prompt::{CodegenRequest, Language, Tool};
use crate::locator::extractor::LocatorExtractor;
use crate::locator::locator_model::LocatorCollection;
use crate::pipeline::error::PipelineError;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{PipelineStage, StageStatus, TraceEvent};

/// Everything the user supplies for one generation run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub source: PageSource,
    pub language: Language,
    pub tool: Tool,
    pub test_case: String,
    pub test_data: String,
    pub test_steps: String,
}

impl GenerationRequest {
    pub fn codegen_request(&self) -> CodegenRequest {
        CodegenRequest {
            language: self.language,
            tool: self.tool,
            test_case: self.test_case.clone(),
            test_data: self.test_data.clone(),
            start_url: self.source.url().unwrap_or_default().to_string(),
            test_steps: self.test_steps.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub locators: LocatorCollection,
    pub code: String,
}

/// fetch_page -> extract_locators. The page snapshot is released as soon
/// as extraction finishes.
pub fn collect_locators<P: PageProvider>(
    source: &PageSource,
    provider: &mut P,
    extractor: &LocatorExtractor,
    tracer: &TraceLogger,
) -> Result<LocatorCollection, PipelineError> {
    let start = Instant::now();
    let snapshot = match provider.fetch(source) {
        Ok(s) => s,
        Err(e) => {
            trace_failure(tracer, PipelineStage::FetchPage, &e, start);
            return Err(e.into());
        }
    };
    tracer.log(
        &TraceEvent::now(PipelineStage::FetchPage, StageStatus::Ok)
            .with_detail(source.url().unwrap_or("<inline html>"))
            .with_duration(start.elapsed().as_millis()),
    );
    info!("Page fetched successfully");

    let start = Instant::now();
    info!("Extracting locators...");
    let result = extractor.extract(&snapshot);
    drop(snapshot);

    let locators = match result {
        Ok(l) => l,
        Err(e) => {
            trace_failure(tracer, PipelineStage::ExtractLocators, &e, start);
            return Err(e.into());
        }
    };
    tracer.log(
        &TraceEvent::now(PipelineStage::ExtractLocators, StageStatus::Ok)
            .with_locator_count(locators.len())
            .with_duration(start.elapsed().as_millis()),
    );
    info!("Extracted {} locators successfully", locators.len());

    Ok(locators)
}

/// Run the three stages in order. The first failure aborts the run.
pub fn run_pipeline<P: PageProvider>(
    request: &GenerationRequest,
    provider: &mut P,
    extractor: &LocatorExtractor,
    generator: &CodeGenerator,
    tracer: &TraceLogger,
) -> Result<GenerationOutcome, PipelineError> {
    let locators = collect_locators(&request.source, provider, extractor, tracer)?;

    let start = Instant::now();
    let code = match generator.generate(&request.codegen_request(), &locators) {
        Ok(c) => c,
        Err(e) => {
            trace_failure(tracer, PipelineStage::GenerateCode, &e, start);
            return Err(e.into());
        }
    };
    tracer.log(
        &TraceEvent::now(PipelineStage::GenerateCode, StageStatus::Ok)
            .with_locator_count(locators.len())
            .with_duration(start.elapsed().as_millis()),
    );

    Ok(GenerationOutcome { locators, code })
}

fn trace_failure(
    tracer: &TraceLogger,
    stage: PipelineStage,
    err: &dyn std::error::Error,
    start: Instant,
) {
    tracer.log(
        &TraceEvent::now(stage, StageStatus::Failed)
            .with_detail(err)
            .with_duration(start.elapsed().as_millis()),
    );
}
