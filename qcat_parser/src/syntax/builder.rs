//! All-or-nothing parsing with an optional shared cache

use super::cache::{AstCache, ParseLimits};
use super::error::{SyntaxError, SyntaxResult};
use crate::config::runtime::{LexicalPreferences, ParserPreferences};
use crate::grammar::ast::Program;
use crate::logging::codes;
use crate::{log_debug, log_success};
use std::sync::Arc;

/// Turns text into a `Program` or the first error found in it
#[derive(Debug, Clone, Default)]
pub struct AstBuilder {
    cache: Option<Arc<AstCache>>,
    lexical: LexicalPreferences,
    parser: ParserPreferences,
}

impl AstBuilder {
    pub fn new(cache: Option<Arc<AstCache>>) -> Self {
        Self {
            cache,
            ..Default::default()
        }
    }

    pub fn with_preferences(
        cache: Option<Arc<AstCache>>,
        lexical: LexicalPreferences,
        parser: ParserPreferences,
    ) -> Self {
        Self {
            cache,
            lexical,
            parser,
        }
    }

    pub fn cache(&self) -> Option<&Arc<AstCache>> {
        self.cache.as_ref()
    }

    /// Limits this builder's parses are checked against; cache entries are
    /// only shared between builders whose limits match
    pub fn limits(&self) -> ParseLimits {
        ParseLimits::new(&self.lexical, &self.parser)
    }

    pub fn build_program(&self, text: &str) -> SyntaxResult<Program> {
        let limits = self.limits();
        if let Some(program) = self.cache.as_ref().and_then(|cache| cache.get(limits, text)) {
            log_success!(codes::success::CACHE_HIT, "Program served from cache",
                "chars" => text.chars().count()
            );
            return Ok(program);
        }

        let output = super::parse_with_preferences(text, self.lexical.clone(), self.parser.clone())?;

        if let Some(diagnostic) = output.first_error() {
            log_debug!("Program rejected", "diagnostics" => output.diagnostics.len());
            return Err(SyntaxError::from_diagnostic(diagnostic));
        }
        if !output.complete {
            return Err(SyntaxError::internal_parser_error(
                "parse stopped without reporting a diagnostic",
            ));
        }

        if let Some(cache) = &self.cache {
            cache.insert(limits, text, &output.program);
        }
        Ok(output.program)
    }
}
