//! Path pattern engine: symbolic encoding of dependency paths and
//! compilation of caller-authored patterns into reusable matchers.
//!
//! A concrete path is encoded into a compact string: a `_` separator,
//! then per edge one `+x`/`-x` token per hyphen sub-label (`+` when the
//! hop runs with the edge, `-` against it) followed by `_`. Symbols come
//! from a dynamic alphabet that assigns `a`, `b`, … to lower-cased labels
//! in first-use order.
//!
//! A pattern rewrites each of its label tokens into a fragment matching
//! "some hop of this edge carries the signed symbol"; everything else in
//! the pattern text is passed through as regex control syntax, so callers
//! can sequence, alternate, and repeat label tokens freely. Compiled
//! matchers are cached by raw pattern text.
//!
//! The alphabet and the cache are the only process-wide mutable state in
//! the crate. Both are append-only and mutex-protected; an engine can be
//! shared across threads behind an `Arc`, or the process-wide
//! [`PatternEngine::global`] instance can be used directly.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PatternError, PatternResult};
use crate::store::AnnotationStore;
use crate::term::{DepId, TermId};

static GLOBAL: Lazy<PatternEngine> = Lazy::new(PatternEngine::new);

/// Shared service holding the label alphabet and the compiled-pattern
/// cache. Both grow monotonically for the lifetime of the engine.
#[derive(Debug, Default)]
pub struct PatternEngine {
    alphabet: Mutex<HashMap<String, char>>,
    cache: Mutex<HashMap<String, Regex>>,
}

impl PatternEngine {
    /// Create an engine with an empty alphabet and cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide engine.
    ///
    /// Callers that never tear down their alphabet (the common case) can
    /// use this instead of threading an engine through their code.
    pub fn global() -> &'static PatternEngine {
        &GLOBAL
    }

    /// The symbol for a relation label, assigning one on first use.
    ///
    /// Labels are compared case-insensitively. Symbols are handed out in
    /// first-use order, `a` through `z`; a 27th distinct label is an
    /// [`PatternError::AlphabetOverflow`], never a silent collision.
    pub fn label_symbol(&self, label: &str) -> PatternResult<char> {
        let key = label.to_lowercase();
        let mut alphabet = lock(&self.alphabet);
        if let Some(&symbol) = alphabet.get(&key) {
            return Ok(symbol);
        }
        let next = alphabet.len() as u32;
        if next >= 26 {
            return Err(PatternError::AlphabetOverflow {
                label: label.to_string(),
            });
        }
        let symbol = (b'a' + next as u8) as char;
        alphabet.insert(key, symbol);
        Ok(symbol)
    }

    /// Encode a concrete path into its symbolic string.
    ///
    /// `from` is the term the walk starts at; `edges` is the path in
    /// traversal order, as produced by [`DepGraph::path`]. Each hop
    /// flips the walking position to the far end of its edge, which
    /// determines the `+`/`-` direction sign.
    ///
    /// [`DepGraph::path`]: crate::DepGraph::path
    pub fn encode_path(
        &self,
        store: &AnnotationStore,
        from: TermId,
        edges: &[DepId],
    ) -> PatternResult<String> {
        let mut encoded = String::from("_");
        let mut position = from;
        for &id in edges {
            let dep = store.dep(id).ok_or(PatternError::StaleEdge)?;
            let sign = if dep.from == position {
                position = dep.to;
                '+'
            } else {
                position = dep.from;
                '-'
            };
            for label in dep.rfunc.split('-') {
                encoded.push(sign);
                encoded.push(self.label_symbol(label)?);
            }
            encoded.push('_');
        }
        Ok(encoded)
    }

    /// Fetch or compile the matcher for a pattern.
    ///
    /// Every maximal run of letters and hyphens in the pattern is a label
    /// token; a leading `-` marks the reverse direction. Each token
    /// becomes a fragment matching one encoded hop that carries the
    /// signed symbol. Whitespace is dropped; any other character is
    /// passed through as matcher control syntax. The compiled matcher
    /// requires a full match of the encoded string.
    ///
    /// Failed compilations are not cached, so retrying the same invalid
    /// pattern fails identically.
    pub fn compile(&self, pattern: &str) -> PatternResult<Regex> {
        if let Some(regex) = lock(&self.cache).get(pattern) {
            return Ok(regex.clone());
        }

        let mut built = String::from("_");
        let mut token = String::new();
        // Trailing space flushes a token ending at the pattern's end.
        for ch in pattern.chars().chain(Some(' ')) {
            if ch.is_alphabetic() || ch == '-' {
                token.push(ch);
                continue;
            }
            if !token.is_empty() {
                let inverse = token.starts_with('-');
                let label = if inverse { &token[1..] } else { &token[..] };
                let symbol = self.label_symbol(label)?;
                let sign = if inverse { '-' } else { '+' };
                built.push_str("([^_]*");
                built.push_str(&regex::escape(&format!("{}{}", sign, symbol)));
                built.push_str("[^_]*_)");
                token.clear();
            }
            if !ch.is_whitespace() {
                built.push(ch);
            }
        }

        let anchored = format!("^(?:{})$", built);
        let regex = Regex::new(&anchored).map_err(|source| PatternError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        lock(&self.cache)
            .entry(pattern.to_string())
            .or_insert_with(|| regex.clone());
        Ok(regex)
    }

    /// Whether the path from `from` along `edges` matches `pattern`.
    pub fn matches(
        &self,
        store: &AnnotationStore,
        from: TermId,
        edges: &[DepId],
        pattern: &str,
    ) -> PatternResult<bool> {
        let encoded = self.encode_path(store, from, edges)?;
        let regex = self.compile(pattern)?;
        Ok(regex.is_match(&encoded))
    }
}

// The alphabet and cache are append-only, so a panicked writer cannot
// leave them half-updated; recover the guard instead of propagating the
// poison.
fn lock<'a, T>(mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
