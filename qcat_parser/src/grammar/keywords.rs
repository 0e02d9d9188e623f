//! Reserved words of the QueryCat language
//!
//! Keywords are matched case-sensitively in uppercase only: `ECHO` is a
//! keyword, `echo` and `Echo` are identifiers. `TRUE` and `FALSE` are not
//! keywords; the lexer classifies them as boolean literals.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    // === TYPE NAMES ===
    Integer,
    String,
    Float,
    Timestamp,
    Boolean,
    Numeric,
    Object,
    Any,

    // === VALUES AND OPERATORS ===
    Null,
    And,
    Or,
    In,
    Is,
    Not,
    Like,
    Void,
    Between,
    Cast,

    // === STATEMENTS AND CLAUSES ===
    Echo,
    As,
    To,
    By,
    Only,
    Default,
    Offset,
    Row,
    Rows,
    Fetch,
    First,
    Next,
    Order,
    Asc,
    Desc,
    Having,
    Where,
    Union,
    Group,
    Into,
    Select,
    From,
    Distinct,
    All,
    Format,
}

impl Keyword {
    /// Every keyword, in declaration order
    pub const ALL: &'static [Keyword] = &[
        Self::Integer,
        Self::String,
        Self::Float,
        Self::Timestamp,
        Self::Boolean,
        Self::Numeric,
        Self::Object,
        Self::Any,
        Self::Null,
        Self::And,
        Self::Or,
        Self::In,
        Self::Is,
        Self::Not,
        Self::Like,
        Self::Void,
        Self::Between,
        Self::Cast,
        Self::Echo,
        Self::As,
        Self::To,
        Self::By,
        Self::Only,
        Self::Default,
        Self::Offset,
        Self::Row,
        Self::Rows,
        Self::Fetch,
        Self::First,
        Self::Next,
        Self::Order,
        Self::Asc,
        Self::Desc,
        Self::Having,
        Self::Where,
        Self::Union,
        Self::Group,
        Self::Into,
        Self::Select,
        Self::From,
        Self::Distinct,
        Self::All,
        Self::Format,
    ];

    /// Source spelling, which is also the token's symbolic name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::String => "STRING",
            Self::Float => "FLOAT",
            Self::Timestamp => "TIMESTAMP",
            Self::Boolean => "BOOLEAN",
            Self::Numeric => "NUMERIC",
            Self::Object => "OBJECT",
            Self::Any => "ANY",
            Self::Null => "NULL",
            Self::And => "AND",
            Self::Or => "OR",
            Self::In => "IN",
            Self::Is => "IS",
            Self::Not => "NOT",
            Self::Like => "LIKE",
            Self::Void => "VOID",
            Self::Between => "BETWEEN",
            Self::Cast => "CAST",
            Self::Echo => "ECHO",
            Self::As => "AS",
            Self::To => "TO",
            Self::By => "BY",
            Self::Only => "ONLY",
            Self::Default => "DEFAULT",
            Self::Offset => "OFFSET",
            Self::Row => "ROW",
            Self::Rows => "ROWS",
            Self::Fetch => "FETCH",
            Self::First => "FIRST",
            Self::Next => "NEXT",
            Self::Order => "ORDER",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Having => "HAVING",
            Self::Where => "WHERE",
            Self::Union => "UNION",
            Self::Group => "GROUP",
            Self::Into => "INTO",
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Distinct => "DISTINCT",
            Self::All => "ALL",
            Self::Format => "FORMAT",
        }
    }

    /// Exact-case lookup in the keyword table
    pub fn from_str(s: &str) -> Option<Self> {
        keyword_table().get(s).copied()
    }

    pub const fn is_type_name(self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::String
                | Self::Float
                | Self::Timestamp
                | Self::Boolean
                | Self::Numeric
                | Self::Object
                | Self::Any
        )
    }

    /// Keywords that act as operators inside expressions
    pub const fn is_operator_word(self) -> bool {
        matches!(
            self,
            Self::And | Self::Or | Self::In | Self::Is | Self::Not | Self::Like | Self::Between
        )
    }

    /// Keywords that open a query clause
    pub const fn is_clause_keyword(self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::From
                | Self::Where
                | Self::Group
                | Self::Having
                | Self::Order
                | Self::Union
                | Self::Into
                | Self::Offset
                | Self::Fetch
                | Self::Format
        )
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static KEYWORD_TABLE: OnceLock<HashMap<&'static str, Keyword>> = OnceLock::new();

fn keyword_table() -> &'static HashMap<&'static str, Keyword> {
    KEYWORD_TABLE.get_or_init(|| Keyword::ALL.iter().map(|&k| (k.as_str(), k)).collect())
}

/// Whether `word` is reserved, including the boolean literal words
pub fn is_reserved_keyword(word: &str) -> bool {
    Keyword::from_str(word).is_some() || matches!(word, "TRUE" | "FALSE")
}
