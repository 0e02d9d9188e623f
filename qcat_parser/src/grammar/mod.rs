//! Grammar definitions for QueryCat scripts

pub mod ast;
pub mod keywords;

// Re-export AST types
pub use ast::{nodes::*, Visitor};

// Re-export keywords
pub use keywords::{is_reserved_keyword, Keyword};
