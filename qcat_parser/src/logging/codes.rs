//! Error codes and their classification metadata
//!
//! Every diagnostic, error enum variant and success event in the crate maps to
//! one of the codes below; the registry attaches severity and handling hints.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

pub mod lexical {
    use super::Code;

    pub const UNRECOGNIZED_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const COMMENT_TOO_LONG: Code = Code::new("E025");
    pub const TOO_MANY_TOKENS: Code = Code::new("E026");
}

pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const NO_VIABLE_ALTERNATIVE: Code = Code::new("E041");
    pub const EXTRANEOUS_INPUT: Code = Code::new("E042");
    pub const MISSING_TOKEN: Code = Code::new("E043");
    pub const PREMATURE_END_OF_INPUT: Code = Code::new("E044");
    pub const MAX_EXPRESSION_DEPTH: Code = Code::new("E045");
    pub const TOO_MANY_DIAGNOSTICS: Code = Code::new("E046");
    pub const INTERNAL_PARSER_ERROR: Code = Code::new("E047");
}

pub mod cache {
    use super::Code;

    pub const CACHE_LOCK_POISONED: Code = Code::new("E060");
    pub const CACHE_FULL: Code = Code::new("E061");
}

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const AST_CONSTRUCTION_COMPLETE: Code = Code::new("I040");
    pub const SYNTAX_VALIDATION_PASSED: Code = Code::new("I041");
    pub const CACHE_HIT: Code = Code::new("I060");
    pub const PIPELINE_COMPLETE: Code = Code::new("I090");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

type Entry = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

// (code, category, severity, recoverable, requires_halt, description, action)
#[rustfmt::skip]
const REGISTRY_ENTRIES: &[Entry] = &[
    // System
    ("ERR001", "System", Severity::Critical, false, true,
        "Critical internal system error",
        "File a bug report with the input that triggered it"),
    ("ERR002", "System", Severity::Critical, false, true,
        "System initialization failure",
        "Check configuration and logging setup"),
    ("ERR003", "System", Severity::High, false, true,
        "Invalid runtime configuration",
        "Fix the preferences file or QCAT_* environment variables"),
    // File processing
    ("E005", "FileProcessing", Severity::Medium, false, true,
        "File not found at specified path",
        "Check file path and ensure file exists"),
    ("E006", "FileProcessing", Severity::Low, true, false,
        "File does not have a script extension",
        "Use a .qcat or .sql extension or disable the extension check"),
    ("E007", "FileProcessing", Severity::Medium, false, true,
        "File exceeds maximum size limit",
        "Split the script or raise the configured limit"),
    ("E008", "FileProcessing", Severity::Medium, false, true,
        "File is empty when content expected",
        "Provide a script with at least one statement"),
    ("E009", "FileProcessing", Severity::Medium, false, true,
        "Permission denied reading file",
        "Check file permissions"),
    ("E010", "FileProcessing", Severity::Medium, false, true,
        "File is not valid UTF-8",
        "Re-encode the script as UTF-8"),
    ("E011", "FileProcessing", Severity::High, false, true,
        "I/O error while reading file",
        "Check the file system and retry"),
    ("E012", "FileProcessing", Severity::Medium, false, true,
        "Path is not a regular file",
        "Pass a path to a script file"),
    ("E013", "FileProcessing", Severity::Medium, false, true,
        "File has too many lines for analysis",
        "Split the script or raise the configured limit"),
    // Lexical
    ("E020", "Lexical", Severity::Medium, true, false,
        "Character does not start any token",
        "Remove the character or quote it inside a string literal"),
    ("E021", "Lexical", Severity::Medium, true, false,
        "String literal is missing its closing quote",
        "Add the closing ' or double embedded quotes as ''"),
    ("E022", "Lexical", Severity::Low, true, false,
        "Multiline comment is missing its closing */",
        "Close the comment with */"),
    ("E023", "Lexical", Severity::Low, true, false,
        "Identifier exceeds maximum length",
        "Shorten the identifier"),
    ("E024", "Lexical", Severity::Low, true, false,
        "String literal exceeds maximum size",
        "Shorten the string literal"),
    ("E025", "Lexical", Severity::Low, true, false,
        "Comment exceeds maximum length",
        "Shorten the comment"),
    ("E026", "Lexical", Severity::High, false, true,
        "Input produces too many tokens",
        "Split the script into smaller inputs"),
    // Syntax
    ("E040", "Syntax", Severity::Medium, true, false,
        "Token does not match the expected grammar",
        "Check the expected tokens listed with the error"),
    ("E041", "Syntax", Severity::Medium, true, false,
        "No statement alternative starts with this token",
        "Start statements with a literal or ECHO"),
    ("E042", "Syntax", Severity::Low, true, false,
        "Extraneous token was skipped",
        "Remove the extra token"),
    ("E043", "Syntax", Severity::Low, true, false,
        "Required token is missing",
        "Insert the missing token"),
    ("E044", "Syntax", Severity::High, false, false,
        "Input ended before a required token",
        "Complete the last statement or remove the trailing separator"),
    ("E045", "Syntax", Severity::High, false, false,
        "Expression nesting exceeds the configured depth",
        "Simplify the expression"),
    ("E046", "Syntax", Severity::Medium, false, false,
        "Too many syntax errors; parsing stopped",
        "Fix the reported errors and parse again"),
    ("E047", "Syntax", Severity::Critical, false, true,
        "Internal parser error",
        "File a bug report with the input that triggered it"),
    // Cache
    ("E060", "Cache", Severity::Low, true, false,
        "AST cache lock was poisoned; parse performed without cache",
        "No action needed; the cache is bypassed"),
    ("E061", "Cache", Severity::Low, true, false,
        "AST cache is full; entry not stored",
        "Raise max_cached_entries if hit rates matter"),
    // Success
    ("I004", "Success", Severity::Low, true, false,
        "System initialization completed", "None"),
    ("I006", "Success", Severity::Low, true, false,
        "File read and validated", "None"),
    ("I020", "Success", Severity::Low, true, false,
        "Tokenization completed", "None"),
    ("I040", "Success", Severity::Low, true, false,
        "AST construction completed", "None"),
    ("I041", "Success", Severity::Low, true, false,
        "Syntax validation passed", "None"),
    ("I060", "Success", Severity::Low, true, false,
        "AST served from cache", "None"),
    ("I090", "Success", Severity::Low, true, false,
        "Pipeline completed", "None"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

/// Check that every code in `codes` has registry metadata
pub fn validate_registered(codes: &[Code]) -> Result<(), String> {
    match codes.iter().find(|c| get_error_metadata(c.as_str()).is_none()) {
        Some(missing) => Err(format!("Code {} has no registry metadata", missing)),
        None => Ok(()),
    }
}
