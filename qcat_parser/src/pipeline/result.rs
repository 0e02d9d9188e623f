use crate::diagnostics::{self, Diagnostic};
use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::syntax::ParseOutput;
use crate::tokens::Token;
use crate::utils::SourceMap;
use std::time::Duration;

/// Everything one run of the pipeline produced
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub source: String,
    /// Present when the source came from a file
    pub file_metadata: Option<FileMetadata>,
    /// Every token, hidden channel included, ending in EOF
    pub tokens: Vec<Token>,
    pub lexical_metrics: LexicalMetrics,
    pub output: ParseOutput,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        self.output.is_success()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.output.diagnostics
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Diagnostics rendered against the source, compiler style
    pub fn render_diagnostics(&self) -> String {
        diagnostics::render_all(&self.output.diagnostics, &SourceMap::new(self.source.clone()))
    }

    pub fn log_success(&self, origin: &str) {
        let seconds = self.processing_duration.as_secs_f64();
        crate::log_success!(
            crate::logging::codes::success::PIPELINE_COMPLETE,
            "Pipeline completed",
            "origin" => origin,
            "statements" => self.output.program.len(),
            "diagnostics" => self.output.diagnostics.len(),
            "duration_ms" => format!("{:.2}", seconds * 1000.0),
            "tokens_per_sec" => format!("{:.0}", if seconds > 0.0 { self.token_count() as f64 / seconds } else { 0.0 })
        );
    }
}
