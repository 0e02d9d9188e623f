//! Configuration module for the QueryCat parser
//! Compile-time limits are generated from TOML by build.rs; runtime
//! preferences layer environment and file overrides on top of them.

// Generated from config/<profile>.toml at build time
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{ConfigError, RuntimeConfig};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("QCAT_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("QCAT_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(compile_time::syntax::MAX_EXPRESSION_DEPTH >= 3);
        assert!(compile_time::syntax::MAX_DIAGNOSTICS > 0);
        assert!(compile_time::lexical::MAX_TOKEN_COUNT > 0);
        assert!(compile_time::cache::MAX_QUERY_LENGTH_FOR_CACHE > 0);
    }

    #[test]
    fn test_source_info_names_profile() {
        let info = build_info::source_info();
        assert!(info.contains(build_info::profile()));
        assert!(info.ends_with(".toml"));
    }
}
