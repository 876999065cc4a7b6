//! Annotation store and dependency-path query engine for layered NLP
//! pipelines.
//!
//! This crate is the index layer of a linguistic-annotation document
//! model: it owns every annotation layer (word forms, terms, dependency
//! edges, entities) in insertion order, keeps the by-sentence,
//! by-paragraph, and by-term indices consistent through mutation, and
//! answers graph-shaped questions about the dependency layer.
//!
//! The three moving parts:
//!
//! - [`AnnotationStore`] — single owner of all layers and derived
//!   indices. Callers insert and remove annotations here; everything
//!   else only reads.
//! - [`DepGraph`] — stateless navigator over the store's by-term
//!   dependency index: incoming/outgoing edges, ancestor and descendant
//!   closures, common roots, and paths between two terms.
//! - [`PatternEngine`] — encodes a concrete path into a symbolic string
//!   and compiles caller-authored patterns (label tokens plus regex
//!   control syntax) into cached matchers over that encoding.
//!
//! ```
//! use layered_annotations::{AnnotationStore, DepGraph, PatternEngine, WordForm};
//!
//! let mut store = AnnotationStore::new();
//! let wfs: Vec<_> = ["the", "cat", "sleeps"]
//!     .iter()
//!     .map(|w| store.add_word_form(WordForm::new(*w, 1)))
//!     .collect();
//! let det = store.add_term(vec![wfs[0]]).unwrap();
//! let cat = store.add_term(vec![wfs[1]]).unwrap();
//! let sleeps = store.add_term(vec![wfs[2]]).unwrap();
//! store.add_dep(sleeps, cat, "nsubj").unwrap();
//! store.add_dep(cat, det, "det").unwrap();
//!
//! let graph = DepGraph::new(&store);
//! let path = graph.path(sleeps, det).unwrap();
//! let engine = PatternEngine::new();
//! assert!(engine.matches(&store, sleeps, &path, "nsubj det").unwrap());
//! ```

mod error;
mod graph;
mod pattern;
mod store;
mod term;

pub use error::{PatternError, PatternResult, StoreError, StoreResult};
pub use graph::DepGraph;
pub use pattern::PatternEngine;
pub use store::AnnotationStore;
pub use term::{DepEdge, DepId, Entity, EntityId, Term, TermId, WfId, WordForm};
