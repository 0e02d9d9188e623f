//! Reading QueryCat scripts from disk

mod processor;

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT_FOR_ANALYSIS,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::log_debug;

pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, SCRIPT_EXTENSIONS,
};

/// Process a file with default preferences
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

pub fn create_processor_from_preferences(preferences: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(preferences)
}

/// Hard upper bound on file size; runtime preferences may only lower it
pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

/// Startup check that every file processing code is registered
pub fn init_file_processor_logging() -> Result<(), String> {
    codes::validate_registered(&[
        codes::file_processing::FILE_NOT_FOUND,
        codes::file_processing::INVALID_EXTENSION,
        codes::file_processing::FILE_TOO_LARGE,
        codes::file_processing::EMPTY_FILE,
        codes::file_processing::PERMISSION_DENIED,
        codes::file_processing::INVALID_ENCODING,
        codes::file_processing::IO_ERROR,
        codes::file_processing::INVALID_PATH,
        codes::file_processing::TOO_MANY_LINES,
        codes::success::FILE_PROCESSING_SUCCESS,
    ])?;

    log_debug!("File processor limits loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD,
        "max_line_count" => MAX_LINE_COUNT_FOR_ANALYSIS
    );

    Ok(())
}
