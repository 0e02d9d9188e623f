//! Cache of parsed programs keyed by their source text
//!
//! Short queries tend to be re-parsed verbatim (autocomplete, highlighting
//! on each keystroke), so `AstCache` keeps clean parses of inputs up to
//! `max_query_length` characters. One cache may be shared between threads
//! behind an `Arc`, and between builders with different preferences: each
//! entry also records the [`ParseLimits`] it was accepted under.

use crate::config::runtime::{CachePreferences, LexicalPreferences, ParserPreferences};
use crate::grammar::ast::Program;
use crate::logging::{codes, LogEvent};
use crate::log_error;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: usize,
    pub misses: usize,
}

/// The preferences that can turn a clean parse into a failing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseLimits {
    pub max_identifier_length: usize,
    pub max_string_size: usize,
    pub max_comment_length: usize,
    pub max_token_count: usize,
    pub max_expression_depth: usize,
}

impl ParseLimits {
    pub fn new(lexical: &LexicalPreferences, parser: &ParserPreferences) -> Self {
        Self {
            max_identifier_length: lexical.max_identifier_length,
            max_string_size: lexical.max_string_size,
            max_comment_length: lexical.max_comment_length,
            max_token_count: lexical.max_token_count,
            max_expression_depth: parser.max_expression_depth,
        }
    }
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self::new(&LexicalPreferences::default(), &ParserPreferences::default())
    }
}

type CacheKey = (ParseLimits, String);

#[derive(Debug)]
pub struct AstCache {
    entries: Mutex<HashMap<CacheKey, Program>>,
    preferences: CachePreferences,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Default for AstCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AstCache {
    pub fn new() -> Self {
        Self::with_preferences(CachePreferences::default())
    }

    pub fn with_preferences(preferences: CachePreferences) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            preferences,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn preferences(&self) -> &CachePreferences {
        &self.preferences
    }

    /// Whether `text` is eligible for caching at all
    pub fn is_cacheable(&self, text: &str) -> bool {
        self.preferences.enabled && text.chars().count() <= self.preferences.max_query_length
    }

    /// Cached program for `text` parsed under `limits`, cloned
    pub fn get(&self, limits: ParseLimits, text: &str) -> Option<Program> {
        if !self.is_cacheable(text) {
            return None;
        }

        let found = self.lock()?.get(&(limits, text.to_string())).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Store a program; false when the text is not cacheable or the cache is full
    pub fn insert(&self, limits: ParseLimits, text: &str, program: &Program) -> bool {
        if !self.is_cacheable(text) {
            return false;
        }

        let Some(mut entries) = self.lock() else {
            return false;
        };

        let key = (limits, text.to_string());
        if !entries.contains_key(&key) && entries.len() >= self.preferences.max_entries {
            crate::logging::emit_with_file_context(
                LogEvent::warning_with_code(codes::cache::CACHE_FULL, "AST cache is full")
                    .with_context("max_entries", &self.preferences.max_entries.to_string()),
            );
            return false;
        }

        entries.insert(key, program.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Some(mut entries) = self.lock() {
            entries.clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.preferences.max_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    // A poisoned lock disables the cache rather than failing the parse
    fn lock(&self) -> Option<MutexGuard<'_, HashMap<CacheKey, Program>>> {
        match self.entries.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                log_error!(codes::cache::CACHE_LOCK_POISONED, "AST cache lock poisoned; bypassing cache");
                None
            }
        }
    }
}
