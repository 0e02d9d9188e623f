//! Script file reading with size, encoding and line-count checks

use crate::config::compile_time::file_processing::LARGE_FILE_THRESHOLD;
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_performance, log_success};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Extensions recognized as QueryCat scripts (lowercase, no dot)
pub const SCRIPT_EXTENSIONS: &[&str] = &["qcat", "sql"];

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .qcat or .sql, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => codes::file_processing::INVALID_EXTENSION,
            Self::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::EmptyFile => codes::file_processing::EMPTY_FILE,
            Self::PermissionDenied { .. } => codes::file_processing::PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            Self::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    fn from_io(error: &std::io::Error, path: &Path, action: &str) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.display().to_string(),
            },
            std::io::ErrorKind::InvalidData => Self::InvalidEncoding {
                path: path.display().to_string(),
            },
            _ => Self::IoError {
                message: format!("Failed to {} '{}': {}", action, path.display(), error),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    pub size: u64,
    /// Lowercased extension, if any
    pub extension: Option<String>,
    /// Filled in once the content has been read
    pub line_count: usize,
    pub is_script_file: bool,
    pub modified: Option<SystemTime>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        human_readable_bytes(self.size)
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

fn human_readable_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    /// Only whitespace; such a script still parses (to a premature-end error)
    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Characters read per millisecond
    pub fn processing_rate(&self) -> f64 {
        let duration_ms = self.processing_duration.as_secs_f64() * 1000.0;
        if duration_ms > 0.0 {
            self.char_count() as f64 / duration_ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_script_extension: bool,
    pub enable_performance_logging: bool,
    pub max_file_size: u64,
    pub max_line_count: usize,
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FileProcessor {
    pub fn new() -> Self {
        Self::from_preferences(&FileProcessorPreferences::default())
    }

    pub fn from_preferences(preferences: &FileProcessorPreferences) -> Self {
        Self {
            require_script_extension: preferences.require_script_extension,
            enable_performance_logging: preferences.enable_performance_logging,
            max_file_size: preferences.max_file_size,
            max_line_count: preferences.max_line_count,
        }
    }

    pub fn with_script_extension_required(mut self, required: bool) -> Self {
        self.require_script_extension = required;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    /// Read a script and return its contents with metadata
    pub fn process_file(&self, file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = Instant::now();

        log_debug!("Starting file processing", "file" => file_path);

        let path = self.validate_path(file_path)?;
        let mut metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata, file_path)?;
        let source = self.read_file(&path, file_path)?;

        let line_count = source.lines().count();
        if line_count > self.max_line_count {
            let error = FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: self.max_line_count,
            };
            log_error!(error.error_code(), "File exceeds maximum line count",
                "file" => file_path,
                "lines" => line_count,
                "max_lines" => self.max_line_count
            );
            return Err(error);
        }
        metadata.line_count = line_count;

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start_time.elapsed(),
        };
        self.log_processing_success(&result, file_path);

        Ok(result)
    }

    fn log_processing_success(&self, result: &FileProcessingResult, file_path: &str) {
        if self.enable_performance_logging {
            log_performance!(codes::success::FILE_PROCESSING_SUCCESS, "File processed",
                duration = result.processing_duration,
                "file" => file_path,
                "size" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "chars_per_ms" => format!("{:.2}", result.processing_rate()),
                "is_large_file" => result.metadata.is_large_file()
            );
        } else {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File processed",
                "file" => file_path,
                "lines" => result.metadata.line_count
            );
        }
    }

    fn validate_path(&self, file_path: &str) -> Result<PathBuf, FileProcessorError> {
        if file_path.is_empty() {
            let error = FileProcessorError::InvalidPath {
                path: String::new(),
            };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        let path = Path::new(file_path);

        if !path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File not found", "path" => file_path);
            return Err(error);
        }

        if !path.is_file() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Path is not a regular file", "path" => file_path);
            return Err(error);
        }

        path.canonicalize().map_err(|e| {
            let error = FileProcessorError::from_io(&e, path, "resolve path");
            log_error!(error.error_code(), "Failed to canonicalize path",
                "path" => file_path,
                "io_error" => e
            );
            error
        })
    }

    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| {
            let error = FileProcessorError::from_io(&e, path, "read metadata for");
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path.display(),
                "io_error" => e
            );
            error
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        let is_script_file = extension
            .as_deref()
            .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext));

        let file_metadata = FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            extension,
            line_count: 0,
            is_script_file,
            modified: metadata.modified().ok(),
        };

        log_debug!("File metadata collected",
            "size" => file_metadata.human_readable_size(),
            "extension" => file_metadata.extension.as_deref().unwrap_or("none"),
            "is_script" => is_script_file
        );

        Ok(file_metadata)
    }

    fn validate_file(&self, metadata: &FileMetadata, file_path: &str) -> Result<(), FileProcessorError> {
        if metadata.size > self.max_file_size {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: self.max_file_size,
            };
            log_error!(error.error_code(), "File exceeds maximum size",
                "file" => file_path,
                "size" => metadata.human_readable_size(),
                "limit" => human_readable_bytes(self.max_file_size)
            );
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile;
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }

        if self.require_script_extension && !metadata.is_script_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have a script extension",
                "file" => file_path,
                "extension" => metadata.extension.as_deref().unwrap_or("none")
            );
            return Err(error);
        }

        Ok(())
    }

    fn read_file(&self, path: &Path, file_path: &str) -> Result<String, FileProcessorError> {
        fs::read_to_string(path).map_err(|e| {
            let error = FileProcessorError::from_io(&e, path, "read file");
            log_error!(error.error_code(), "Failed to read file",
                "file" => file_path,
                "io_error" => e
            );
            error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    fn small_limits() -> FileProcessor {
        FileProcessor::from_preferences(&FileProcessorPreferences {
            require_script_extension: false,
            enable_performance_logging: true,
            max_file_size: 64,
            max_line_count: 3,
        })
    }

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("report.qcat");
        let content = "ECHO 'naïve';\n1 + 2\n";
        fs::write(&file_path, content).unwrap();

        let result = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap();

        assert_eq!(result.source, content);
        assert_eq!(result.metadata.line_count, 2);
        assert!(result.metadata.is_script_file);
        assert_eq!(result.metadata.extension.as_deref(), Some("qcat"));
        assert_eq!(result.char_count(), content.chars().count());
        assert!(!result.is_effectively_empty());
    }

    #[test]
    fn test_sql_extension_is_a_script() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("QUERY.SQL");
        fs::write(&file_path, "1").unwrap();

        let processor = FileProcessor::new().with_script_extension_required(true);
        let result = processor.process_file(file_path.to_str().unwrap()).unwrap();
        assert!(result.metadata.is_script_file);
    }

    #[test]
    fn test_file_not_found() {
        let error = FileProcessor::new()
            .process_file("missing.qcat")
            .unwrap_err();
        assert_matches!(error, FileProcessorError::FileNotFound { .. });
        assert_eq!(error.error_code().as_str(), "E005");
        assert!(error.requires_halt());
    }

    #[test]
    fn test_directory_is_invalid_path() {
        let dir = tempdir().unwrap();
        let error = FileProcessor::new()
            .process_file(dir.path().to_str().unwrap())
            .unwrap_err();
        assert_matches!(error, FileProcessorError::InvalidPath { .. });

        let error = FileProcessor::new().process_file("").unwrap_err();
        assert_matches!(error, FileProcessorError::InvalidPath { .. });
    }

    #[test]
    fn test_file_size_limit() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.qcat");
        fs::write(&file_path, "1".repeat(65)).unwrap();

        let error = small_limits()
            .process_file(file_path.to_str().unwrap())
            .unwrap_err();
        assert_matches!(error, FileProcessorError::FileTooLarge { size: 65, max_size: 64 });
    }

    #[test]
    fn test_line_count_limit() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("lines.qcat");
        fs::write(&file_path, "1;\n2;\n3;\n4\n").unwrap();

        let error = small_limits()
            .process_file(file_path.to_str().unwrap())
            .unwrap_err();
        assert_matches!(error, FileProcessorError::TooManyLines { lines: 4, max_lines: 3 });
        assert_eq!(error.error_code(), codes::file_processing::TOO_MANY_LINES);
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("notes.txt");
        fs::write(&file_path, "1").unwrap();

        let path = file_path.to_str().unwrap();
        assert!(FileProcessor::new().process_file(path).is_ok());

        let error = FileProcessor::new()
            .with_script_extension_required(true)
            .process_file(path)
            .unwrap_err();
        assert_matches!(
            error,
            FileProcessorError::InvalidExtension { extension: Some(ref ext) } if ext == "txt"
        );
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.qcat");
        fs::write(&file_path, "").unwrap();

        let error = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap_err();
        assert_matches!(error, FileProcessorError::EmptyFile);
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("binary.qcat");
        fs::write(&file_path, [0x31, 0xff, 0xfe]).unwrap();

        let error = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap_err();
        assert_matches!(error, FileProcessorError::InvalidEncoding { .. });
        assert_eq!(error.category(), "FileProcessing");
    }

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_readable_bytes(512), "512 B");
        assert_eq!(human_readable_bytes(2048), "2.00 KB");
        assert_eq!(human_readable_bytes(3 * 1024 * 1024), "3.00 MB");
    }
}
