//! Lexical analysis for QueryCat scripts
//!
//! Module-level entry points build a fresh [`LexicalAnalyzer`] per call, so
//! independent inputs can be tokenized concurrently.

pub mod analyzer;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{Token, TokenList};

pub use analyzer::{
    decode_string_literal, scan, LexOutput, LexProblem, LexerError, LexicalAnalyzer,
    LexicalMetrics, Scanned,
};

/// Tokenize with default preferences
pub fn tokenize(source: &str) -> Result<LexOutput, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}

pub fn tokenize_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> Result<LexOutput, LexerError> {
    LexicalAnalyzer::with_preferences(preferences).tokenize(source)
}

/// Tokens for highlighting, EOF excluded; hidden tokens only on request
pub fn tokenize_for_display(source: &str, include_hidden: bool) -> Result<Vec<Token>, LexerError> {
    let output = tokenize(source)?;
    Ok(output
        .tokens
        .into_iter()
        .filter(|t| !t.is_eof() && (include_hidden || !t.is_hidden()))
        .collect())
}

/// Every token of `text` except EOF, with character positions
pub fn get_tokens(text: &str) -> Result<TokenList, LexerError> {
    let output = tokenize(text)?;
    Ok(TokenList::from_tokens(&output.tokens))
}

pub fn create_analyzer() -> LexicalAnalyzer {
    LexicalAnalyzer::new()
}

pub fn create_analyzer_with_preferences(preferences: LexicalPreferences) -> LexicalAnalyzer {
    LexicalAnalyzer::with_preferences(preferences)
}

/// Startup check that every lexical code is registered
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    codes::validate_registered(&[
        codes::lexical::UNRECOGNIZED_CHARACTER,
        codes::lexical::UNTERMINATED_STRING,
        codes::lexical::UNTERMINATED_COMMENT,
        codes::lexical::IDENTIFIER_TOO_LONG,
        codes::lexical::STRING_TOO_LARGE,
        codes::lexical::COMMENT_TOO_LONG,
        codes::lexical::TOO_MANY_TOKENS,
    ])?;

    crate::log_debug!("Lexical limits initialized",
        "max_string_size" => MAX_STRING_SIZE,
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH,
        "max_comment_length" => MAX_COMMENT_LENGTH,
        "max_token_count" => MAX_TOKEN_COUNT
    );

    Ok(())
}
