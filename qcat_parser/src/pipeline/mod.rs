//! File (or inline query) to program: read, tokenize, parse
//!
//! Syntax errors do not fail the pipeline: they come back as diagnostics on
//! the result. Only file, configuration and fatal tokenizer failures are
//! returned as `PipelineError`.

mod error;
pub mod output;
mod result;
mod validation;

pub use error::PipelineError;
pub use output::{token_listing, PipelineOutput, TokenOutput};
pub use result::PipelineResult;
pub use validation::validate_pipeline;

use crate::config::RuntimeConfig;
use crate::file_processor::{FileMetadata, FileProcessor};
use crate::lexical::{LexOutput, LexicalAnalyzer};
use crate::logging;
use crate::syntax::QueryParser;
use std::path::PathBuf;
use std::time::Instant;

/// Run a script file through the pipeline
pub fn process_file(file_path: &str, config: &RuntimeConfig) -> Result<PipelineResult, PipelineError> {
    logging::with_file_context(PathBuf::from(file_path), 0, || {
        crate::log_info!("Starting pipeline", "file" => file_path);
        let start_time = Instant::now();

        let file_result =
            FileProcessor::from_preferences(&config.file_processor).process_file(file_path)?;

        let mut analyzer = LexicalAnalyzer::with_preferences(config.lexical.clone());
        let lexed = analyzer.tokenize_file_result(&file_result)?;
        let result = parse_stage(
            file_result.source,
            Some(file_result.metadata),
            &analyzer,
            lexed,
            config,
            start_time,
        );

        result.log_success(file_path);
        Ok(result)
    })
}

/// Run an in-memory query through the pipeline
pub fn process_source(source: &str, config: &RuntimeConfig) -> Result<PipelineResult, PipelineError> {
    crate::log_info!("Starting pipeline", "chars" => source.chars().count());
    let start_time = Instant::now();

    let mut analyzer = LexicalAnalyzer::with_preferences(config.lexical.clone());
    let lexed = analyzer.tokenize(source)?;
    let result = parse_stage(source.to_string(), None, &analyzer, lexed, config, start_time);

    result.log_success("<query>");
    Ok(result)
}

fn parse_stage(
    source: String,
    file_metadata: Option<FileMetadata>,
    analyzer: &LexicalAnalyzer,
    lexed: LexOutput,
    config: &RuntimeConfig,
    start_time: Instant,
) -> PipelineResult {
    let tokens = lexed.tokens.clone();
    let (stream, lexical_diagnostics) = lexed.into_stream(&source);
    let output = QueryParser::with_preferences(stream, config.parser.clone())
        .parse_program()
        .with_lexical_diagnostics(lexical_diagnostics);

    PipelineResult {
        source,
        file_metadata,
        tokens,
        lexical_metrics: analyzer.metrics().clone(),
        output,
        processing_duration: start_time.elapsed(),
    }
}
