//! Token model for QueryCat scripts
//!
//! - [`Token`] / [`TokenKind`]: a positioned lexeme and its closed set of kinds.
//!   Whitespace and comments travel on the hidden [`Channel`].
//! - [`TokenStream`]: buffered view used by the parser. It exposes only
//!   significant tokens but keeps every token for text reconstruction.
//! - [`TokenList`]: flat listing with character positions for tooling.
//!
//! Concatenating the lexemes of all tokens a lexer produced reproduces the
//! input exactly; the terminal EOF token has an empty lexeme.

pub mod token;
pub mod token_list;
pub mod token_stream;

pub use token::{classify_symbol, classify_word, Channel, Token, TokenKind};
pub use token_list::{ParserToken, TokenList};
pub use token_stream::{validation, TokenStream};

pub use crate::utils::{Position, SourceMap, Span};
