//! Per-file error collection with compiler-style summaries

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// The file the current thread is logging under
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self { file_path, file_id }
    }
}

/// Thread-safe store of events keyed by the file they were logged under
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record an event. Past the per-file limit a single overflow warning is
    /// kept; past the overall collection limit events are dropped.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = lock(&self.file_events);
        let collected: usize = events.values().map(Vec::len).sum();
        if collected >= MAX_ERROR_COLLECTION {
            return;
        }

        let file_events = events.entry(file_path.to_path_buf()).or_default();
        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        lock(&self.file_events).clone()
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn location(file_path: &Path, event: &LogEvent) -> String {
    event
        .span
        .as_ref()
        .map(|s| {
            format!(
                " --> {}:{}:{}",
                file_path.display(),
                s.start().line,
                s.start().column
            )
        })
        .unwrap_or_default()
}

fn push_context(output: &mut String, event: &LogEvent) {
    for (key, value) in &event.context {
        if key != "file" && key != "file_id" {
            output.push_str(&format!("  = {}: {}\n", key, value));
        }
    }
}

/// Render every collected error and warning grouped by file
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for (file_path, events) in &collector.get_all_file_events() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();
        total_errors += errors.len();
        total_warnings += warnings.len();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));

        for event in errors {
            output.push_str(&format!(
                "error[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                location(file_path, event)
            ));
            output.push_str(&format!(
                "  = severity: {}, category: {}\n",
                event.severity(),
                event.category()
            ));
            push_context(&mut output, event);

            let action = event.recommended_action();
            if action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
        }

        for event in warnings {
            output.push_str(&format!(
                "warning[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                location(file_path, event)
            ));
            push_context(&mut output, event);
        }

        output.push('\n');
    }

    if total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", total_errors));
    }
    if total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_events_grouped_by_file() {
        let collector = ErrorCollector::new();
        let first = PathBuf::from("a.qcat");
        let second = PathBuf::from("b.qcat");

        collector.record_event(
            &first,
            LogEvent::error(codes::lexical::UNTERMINATED_STRING, "Unterminated string"),
        );
        collector.record_event(&second, LogEvent::warning("Warning"));

        let all = collector.get_all_file_events();
        assert_eq!(all.len(), 2);
        assert!(all[&first][0].is_error());
        assert!(all[&second][0].is_warning());
    }

    #[test]
    fn test_per_file_limit_adds_one_overflow_warning() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("noisy.qcat");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 10 {
            collector.record_event(
                &file_path,
                LogEvent::error(codes::syntax::EXTRANEOUS_INPUT, "Extraneous"),
            );
        }

        let events = collector.get_all_file_events().remove(&file_path).unwrap();
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_FILE + 1);
        assert!(events.last().unwrap().is_warning());
    }

    #[test]
    fn test_collection_limit_across_files() {
        let collector = ErrorCollector::new();

        for i in 0..MAX_ERROR_COLLECTION + 5 {
            collector.record_event(
                &PathBuf::from(format!("q{}.qcat", i)),
                LogEvent::error(codes::syntax::MISSING_TOKEN, "Missing ';'"),
            );
        }

        let collected: usize = collector.get_all_file_events().values().map(Vec::len).sum();
        assert_eq!(collected, MAX_ERROR_COLLECTION);
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("q.qcat");
        let span = Span::new(Position::new(3, 1, 4), Position::new(4, 1, 5));

        collector.record_event(
            &file_path,
            LogEvent::error(codes::syntax::EXTRANEOUS_INPUT, "extraneous input ')'")
                .with_span(span)
                .with_context("expected", "';'"),
        );
        collector.record_event(&file_path, LogEvent::warning("AST cache is full"));

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking q.qcat..."));
        assert!(output.contains("error[E042]: extraneous input ')' --> q.qcat:1:4"));
        assert!(output.contains("= expected: ';'"));
        assert!(output.contains("Total errors: 1"));
        assert!(output.contains("Total warnings: 1"));
    }

    #[test]
    fn test_empty_collector_renders_nothing() {
        assert_eq!(format_cargo_style_errors(&ErrorCollector::default()), "");
    }
}
