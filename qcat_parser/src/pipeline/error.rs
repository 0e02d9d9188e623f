use crate::config::ConfigError;
use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::syntax::SyntaxError;

/// Failures that stop the pipeline before a parse result exists.
/// Syntax problems are normally reported as diagnostics, not through here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),

    #[error("Configuration failed: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(error) => error.error_code(),
            Self::LexicalAnalysis(error) => error.error_code(),
            Self::SyntaxAnalysis(error) => error.error_code(),
            Self::Configuration(_) => codes::system::CONFIGURATION_ERROR,
            Self::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        assert_matches!(&error, PipelineError::Pipeline { message } if message == "Test error");
        assert_eq!(error.error_code(), codes::system::INTERNAL_ERROR);
    }

    #[test]
    fn test_wrapped_errors_keep_their_codes() {
        let error: PipelineError = FileProcessorError::EmptyFile.into();
        assert_eq!(error.error_code(), codes::file_processing::EMPTY_FILE);
        assert!(error.to_string().starts_with("File processing failed"));

        let error: PipelineError = ConfigError::Parse {
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(error.error_code(), codes::system::CONFIGURATION_ERROR);
    }
}
