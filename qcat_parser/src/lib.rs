//! Front end for QueryCat scripts: tokenizer, token stream, recursive-descent
//! parser with error recovery, and compiler-style diagnostics.

pub mod config;
pub mod diagnostics;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use grammar::ast::{BinaryOperator, Expression, LiteralValue, Program, Statement, Visitor};
pub use lexical::{get_tokens, tokenize, LexerError};
pub use pipeline::{PipelineError, PipelineResult};
pub use syntax::{parse, AstBuilder, AstCache, ParseOutput, SyntaxError};
