// RUNTIME PREFERENCES (User Experience)
//
// Numeric limits here may only tighten the compile-time limits, never relax them.

use super::compile_time;
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Invalid configuration: {message}")]
    Parse { message: String },
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Reject files whose extension is not a known script extension
    pub require_script_extension: bool,

    /// Whether to log read durations and throughput
    pub enable_performance_logging: bool,

    pub max_file_size: u64,
    pub max_line_count: usize,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_script_extension: env_or(env_vars::REQUIRE_SCRIPT_EXTENSION, false),
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
            max_file_size: compile_time::file_processing::MAX_FILE_SIZE,
            max_line_count: compile_time::file_processing::MAX_LINE_COUNT_FOR_ANALYSIS,
        }
    }
}

impl FileProcessorPreferences {
    fn clamped(mut self) -> Self {
        self.max_file_size = self
            .max_file_size
            .min(compile_time::file_processing::MAX_FILE_SIZE);
        self.max_line_count = self
            .max_line_count
            .min(compile_time::file_processing::MAX_LINE_COUNT_FOR_ANALYSIS);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to collect per-kind token metrics
    pub collect_detailed_metrics: bool,

    pub max_identifier_length: usize,
    pub max_string_size: usize,
    pub max_comment_length: usize,
    pub max_token_count: usize,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_or(env_vars::LEXICAL_DETAILED_METRICS, true),
            max_identifier_length: compile_time::lexical::MAX_IDENTIFIER_LENGTH,
            max_string_size: compile_time::lexical::MAX_STRING_SIZE,
            max_comment_length: compile_time::lexical::MAX_COMMENT_LENGTH,
            max_token_count: compile_time::lexical::MAX_TOKEN_COUNT,
        }
    }
}

impl LexicalPreferences {
    fn clamped(mut self) -> Self {
        use compile_time::lexical::*;
        self.max_identifier_length = self.max_identifier_length.min(MAX_IDENTIFIER_LENGTH);
        self.max_string_size = self.max_string_size.min(MAX_STRING_SIZE);
        self.max_comment_length = self.max_comment_length.min(MAX_COMMENT_LENGTH);
        self.max_token_count = self.max_token_count.min(MAX_TOKEN_COUNT);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPreferences {
    /// Bound on nested operand parsing; chain length does not count
    pub max_expression_depth: usize,

    /// Syntax diagnostics collected before the parse gives up
    pub max_diagnostics: usize,

    /// Whether recovery decisions are logged at debug level
    pub log_recovery_actions: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            max_expression_depth: compile_time::syntax::MAX_EXPRESSION_DEPTH,
            max_diagnostics: compile_time::syntax::MAX_DIAGNOSTICS,
            log_recovery_actions: env_or(env_vars::PARSER_LOG_RECOVERY, true),
        }
    }
}

impl ParserPreferences {
    fn clamped(mut self) -> Self {
        self.max_expression_depth = self
            .max_expression_depth
            .clamp(1, compile_time::syntax::MAX_EXPRESSION_DEPTH);
        self.max_diagnostics = self
            .max_diagnostics
            .clamp(1, compile_time::syntax::MAX_DIAGNOSTICS);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePreferences {
    pub enabled: bool,

    /// Inputs longer than this (in chars) bypass the cache
    pub max_query_length: usize,

    pub max_entries: usize,
}

impl Default for CachePreferences {
    fn default() -> Self {
        Self {
            enabled: env_or(env_vars::CACHE_ENABLED, true),
            max_query_length: compile_time::cache::MAX_QUERY_LENGTH_FOR_CACHE,
            max_entries: compile_time::cache::MAX_CACHED_ENTRIES,
        }
    }
}

impl CachePreferences {
    fn clamped(mut self) -> Self {
        self.max_entries = self.max_entries.min(compile_time::cache::MAX_CACHED_ENTRIES);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of human-readable output
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    pub min_log_level: LogLevel,

    /// Whether to enable compiler-style error summaries
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            enable_cargo_style_output: env_or(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_or(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub parser: ParserPreferences,
    pub cache: CachePreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from TOML; absent sections and fields keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        Ok(config.clamped())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    fn clamped(self) -> Self {
        Self {
            file_processor: self.file_processor.clamped(),
            lexical: self.lexical.clamped(),
            parser: self.parser.clamped(),
            cache: self.cache.clamped(),
            logging: self.logging,
        }
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File processing
    pub const REQUIRE_SCRIPT_EXTENSION: &str = "QCAT_REQUIRE_SCRIPT_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "QCAT_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "QCAT_LEXICAL_DETAILED_METRICS";

    // Parser
    pub const PARSER_LOG_RECOVERY: &str = "QCAT_PARSER_LOG_RECOVERY";

    // Cache
    pub const CACHE_ENABLED: &str = "QCAT_CACHE_ENABLED";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "QCAT_STRUCTURED_LOGGING";
    pub const LOGGING_ENABLE_CONSOLE: &str = "QCAT_CONSOLE_LOGGING";
    pub const LOGGING_MIN_LEVEL: &str = "QCAT_MIN_LOG_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "QCAT_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "QCAT_INCLUDE_FILE_CONTEXT";
}
