//! Annotation data model: arena handles plus the word-form, term,
//! dependency-edge, and entity records stored by [`AnnotationStore`].
//!
//! Handles are plain `u32` indices into arenas owned by the store. Two
//! handles of the same type compare equal exactly when they name the same
//! annotation, so "is this the same term" is index equality everywhere.
//!
//! [`AnnotationStore`]: crate::AnnotationStore

use serde::{Deserialize, Serialize};

/// Handle to a word form in an [`AnnotationStore`].
///
/// [`AnnotationStore`]: crate::AnnotationStore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WfId(pub(crate) u32);

/// Handle to a term. The node type of the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermId(pub(crate) u32);

/// Handle to a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepId(pub(crate) u32);

/// Handle to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub(crate) u32);

impl WfId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl TermId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl DepId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl EntityId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single token of the source text.
///
/// Sentence numbers are caller-assigned (1-based by convention) and drive
/// the store's by-sentence indices. The paragraph number, when present,
/// registers the sentence under that paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordForm {
    /// Surface form of the token.
    pub form: String,
    /// Sentence number this token belongs to.
    pub sent: u32,
    /// Paragraph number, if the source tracks paragraphs.
    pub para: Option<u32>,
    /// Character offset into the source text.
    pub offset: Option<u32>,
    /// Character length in the source text.
    pub length: Option<u32>,
}

impl WordForm {
    /// Create a word form with just a surface form and sentence number.
    pub fn new(form: impl Into<String>, sent: u32) -> Self {
        Self {
            form: form.into(),
            sent,
            para: None,
            offset: None,
            length: None,
        }
    }

    /// Set the paragraph number.
    pub fn with_paragraph(mut self, para: u32) -> Self {
        self.para = Some(para);
        self
    }

    /// Set the character offset and length.
    pub fn with_offset(mut self, offset: u32, length: u32) -> Self {
        self.offset = Some(offset);
        self.length = Some(length);
        self
    }
}

/// A morphosyntactic unit spanning one or more word forms.
///
/// The sentence number is inherited from the first word form of the span
/// when the term is inserted into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Word forms covered by this term, in order. Never empty.
    pub span: Vec<WfId>,
    /// Lemma, if a morphological analyzer supplied one.
    pub lemma: Option<String>,
    /// Part-of-speech tag, if a tagger supplied one.
    pub pos: Option<String>,
    pub(crate) sent: u32,
}

impl Term {
    /// Sentence number inherited from the term's first word form.
    pub fn sent(&self) -> u32 {
        self.sent
    }
}

/// A directed, labeled arc between two terms.
///
/// The relation label may be a hyphen-joined composite (e.g.
/// `"nsubj-pass"`); each hyphen-separated sub-label is significant on its
/// own for path pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepEdge {
    /// Source term (the governor).
    pub from: TermId,
    /// Target term (the dependent).
    pub to: TermId,
    /// Relation label.
    pub rfunc: String,
    pub(crate) sent: u32,
}

impl DepEdge {
    /// Sentence number inherited from the source term.
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Given one endpoint, return the other.
    ///
    /// Returns `None` if `term` is not an endpoint of this edge.
    pub fn other_end(&self, term: TermId) -> Option<TermId> {
        if self.from == term {
            Some(self.to)
        } else if self.to == term {
            Some(self.from)
        } else {
            None
        }
    }
}

/// A typed entity mention over a set of terms.
///
/// This is the representative non-dependency layer carried by the store;
/// it exercises the same by-sentence and inverse by-term indexing the
/// dependency layer uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity type label (e.g. `"PER"`, `"ORG"`).
    pub etype: String,
    /// Terms mentioned, in order. Never empty while stored.
    pub span: Vec<TermId>,
    pub(crate) sent: u32,
}

impl Entity {
    /// Sentence number inherited from the entity's first term at insertion.
    pub fn sent(&self) -> u32 {
        self.sent
    }
}
