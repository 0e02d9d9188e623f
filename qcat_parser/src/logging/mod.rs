//! Global logging for the QueryCat front end
//!
//! A process-wide `LoggingService` plus an `ErrorCollector` that groups error
//! events by the file being processed on the current thread. Every entry
//! point degrades to a no-op when logging was never initialized, so the
//! library can be used without calling `init_global_logging`.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

/// Codes the crate emits; each must have registry metadata at startup
const EMITTED_CODES: &[Code] = &[
    codes::system::INTERNAL_ERROR,
    codes::system::CONFIGURATION_ERROR,
    codes::file_processing::FILE_NOT_FOUND,
    codes::file_processing::FILE_TOO_LARGE,
    codes::lexical::UNRECOGNIZED_CHARACTER,
    codes::lexical::UNTERMINATED_STRING,
    codes::lexical::TOO_MANY_TOKENS,
    codes::syntax::EXTRANEOUS_INPUT,
    codes::syntax::MISSING_TOKEN,
    codes::syntax::PREMATURE_END_OF_INPUT,
    codes::syntax::MAX_EXPRESSION_DEPTH,
    codes::cache::CACHE_LOCK_POISONED,
    codes::success::SYSTEM_INITIALIZATION_COMPLETED,
    codes::success::AST_CONSTRUCTION_COMPLETE,
    codes::success::PIPELINE_COMPLETE,
];

/// Initialize global logging from the installed runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;
    codes::validate_registered(EMITTED_CODES)?;

    let logging_service = Arc::new(service::create_configured_service());
    init_global_logging_with_service(logging_service.clone())?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with a caller-supplied service
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized")?;

    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized")?;

    Ok(())
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

/// Set the file context for the current thread
pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    let context = FileProcessingContext::new(file_path, file_id);

    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the file context set, clearing it afterwards
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path, file_id);
    let result = f();
    clear_file_context();
    result
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

fn attach_file_context(event: LogEvent, with_id: bool) -> LogEvent {
    if !config::include_file_context() {
        return event;
    }
    match get_current_file_context() {
        Some(file_ctx) => {
            let event = event.with_file_path(&file_ctx.file_path.display().to_string());
            if with_id {
                event.with_context("file_id", &file_ctx.file_id.to_string())
            } else {
                event
            }
        }
        None => event,
    }
}

/// Send an event to the global logger with the thread's file context attached
pub fn emit_with_file_context(event: LogEvent) {
    let event = attach_file_context(event, false);
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Backs `log_error!`: logs the event and records it against the current file
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);

    if let Some(s) = span {
        event = event.with_span(s);
    }

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    let event = attach_file_context(event, true);

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event.clone());
    }

    if let Some(file_ctx) = get_current_file_context() {
        if let Some(collector) = try_get_global_error_collector() {
            collector.record_event(&file_ctx.file_path, event);
        }
    }
}

/// Backs `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::success(code, message);

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    let event = attach_file_context(event, true);

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Backs `log_info!`
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::info(message);

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    emit_with_file_context(event);
}

/// Compiler-style summary of everything collected so far, if anything was
pub fn cargo_style_summary() -> Option<String> {
    try_get_global_error_collector().map(collector::format_cargo_style_errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitted_codes_are_registered() {
        assert!(codes::validate_registered(EMITTED_CODES).is_ok());
    }

    #[test]
    fn test_file_context_management() {
        let file_path = PathBuf::from("report.qcat");

        assert!(get_current_file_context().is_none());

        set_file_context(file_path.clone(), 1);
        assert_eq!(get_current_file_context().unwrap().file_path, file_path);

        clear_file_context();
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_with_file_context() {
        let file_path = PathBuf::from("report.qcat");

        let result = with_file_context(file_path.clone(), 2, || {
            assert_eq!(get_current_file_context().unwrap().file_id, 2);
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_logging_without_initialization_does_not_panic() {
        log_info_with_context("info", vec![("k", "v")]);
        log_error_with_context(codes::syntax::MISSING_TOKEN, "missing", None, vec![]);
        with_file_context(PathBuf::from("report.qcat"), 3, || {
            crate::log_error!(codes::syntax::EXTRANEOUS_INPUT, "extraneous input");
        });
    }
}
