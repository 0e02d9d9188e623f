//! Syntax analysis: token stream to `Program`
//!
//! [`parse`] is the main entry point. It tokenizes, parses with recovery and
//! returns the (possibly partial) program with every lexical and syntax
//! diagnostic in offset order. [`AstBuilder`] wraps it for callers that want
//! a program or an error, optionally backed by an [`AstCache`].

mod builder;
mod cache;
mod error;
mod parser;
pub mod recovery;

pub use crate::grammar::ast::Program;
pub use builder::AstBuilder;
pub use cache::{AstCache, CacheStats, ParseLimits};
pub use error::{SyntaxError, SyntaxResult};
pub use parser::{ParseOutput, QueryParser};
pub use recovery::{decide, RecoveryAction, RecoveryContext};

use crate::config::runtime::{LexicalPreferences, ParserPreferences};
use crate::lexical::{LexerError, LexicalAnalyzer};
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_debug, log_info};

/// Tokenize and parse `text` with default preferences
pub fn parse(text: &str) -> Result<ParseOutput, LexerError> {
    parse_with_preferences(text, LexicalPreferences::default(), ParserPreferences::default())
}

pub fn parse_with_preferences(
    text: &str,
    lexical: LexicalPreferences,
    parser: ParserPreferences,
) -> Result<ParseOutput, LexerError> {
    log_debug!("Starting syntax analysis", "chars" => text.chars().count());

    let lexed = LexicalAnalyzer::with_preferences(lexical).tokenize(text)?;
    let (stream, lexical_diagnostics) = lexed.into_stream(text);

    Ok(QueryParser::with_preferences(stream, parser)
        .parse_program()
        .with_lexical_diagnostics(lexical_diagnostics))
}

/// Parse an already tokenized stream; only syntax diagnostics are reported
pub fn parse_token_stream(stream: TokenStream) -> ParseOutput {
    QueryParser::new(stream).parse_program()
}

/// Startup check that every syntax and cache code is registered
pub fn init_syntax_logging() -> Result<(), String> {
    codes::validate_registered(&[
        codes::syntax::UNEXPECTED_TOKEN,
        codes::syntax::NO_VIABLE_ALTERNATIVE,
        codes::syntax::EXTRANEOUS_INPUT,
        codes::syntax::MISSING_TOKEN,
        codes::syntax::PREMATURE_END_OF_INPUT,
        codes::syntax::MAX_EXPRESSION_DEPTH,
        codes::syntax::TOO_MANY_DIAGNOSTICS,
        codes::syntax::INTERNAL_PARSER_ERROR,
        codes::cache::CACHE_LOCK_POISONED,
        codes::cache::CACHE_FULL,
        codes::success::AST_CONSTRUCTION_COMPLETE,
        codes::success::CACHE_HIT,
    ])?;

    log_info!("Syntax module logging validation completed");
    Ok(())
}
