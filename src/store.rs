//! The annotation store: single owner of every annotation layer and of
//! the derived indices that make the layers queryable.
//!
//! Layers are kept in insertion order. Three kinds of derived index are
//! maintained incrementally on insert and remove:
//!
//! - by sentence, per layer (`u32` sentence number → ordered ids);
//! - paragraph → ordered sentence numbers, from which every by-paragraph
//!   query is derived by flattening the sentence buckets;
//! - inverse postings: dependency edges by endpoint term, entities by
//!   member term, terms by word form.
//!
//! The store assumes a single writer; concurrent readers are safe only
//! while no writer is active. Removal tombstones the arena slot, so live
//! handles are never invalidated or reused.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{StoreError, StoreResult};
use crate::term::{DepEdge, DepId, Entity, EntityId, Term, TermId, WfId, WordForm};

const EMPTY_TERMS: &[TermId] = &[];
const EMPTY_DEPS: &[DepId] = &[];
const EMPTY_ENTITIES: &[EntityId] = &[];
const EMPTY_WFS: &[WfId] = &[];

/// Owner of all annotation layers for one document.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    // Arenas. Word forms are never removed; the other layers tombstone.
    wfs: Vec<WordForm>,
    terms: Vec<Option<Term>>,
    deps: Vec<Option<DepEdge>>,
    entities: Vec<Option<Entity>>,

    // Primary layers, insertion order.
    term_layer: Vec<TermId>,
    dep_layer: Vec<DepId>,
    entity_layer: Vec<EntityId>,

    // By-sentence buckets, insertion order within each bucket.
    wfs_by_sent: HashMap<u32, Vec<WfId>>,
    terms_by_sent: HashMap<u32, Vec<TermId>>,
    deps_by_sent: HashMap<u32, Vec<DepId>>,
    entities_by_sent: HashMap<u32, Vec<EntityId>>,

    // Paragraph number → sentence numbers seen in that paragraph.
    sents_by_para: BTreeMap<u32, BTreeSet<u32>>,

    // Inverse postings.
    deps_by_term: HashMap<TermId, Vec<DepId>>,
    entities_by_term: HashMap<TermId, Vec<EntityId>>,
    terms_by_wf: HashMap<WfId, Vec<TermId>>,
}

impl AnnotationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Append a word form.
    pub fn add_word_form(&mut self, wf: WordForm) -> WfId {
        let id = WfId(self.wfs.len() as u32);
        self.wfs_by_sent.entry(wf.sent).or_default().push(id);
        if let Some(para) = wf.para {
            self.sents_by_para.entry(para).or_default().insert(wf.sent);
        }
        self.wfs.push(wf);
        id
    }

    /// Append a term spanning the given word forms.
    ///
    /// The term inherits the sentence number of the first word form in
    /// its span. Errors on an empty span or an unresolvable handle.
    pub fn add_term(&mut self, span: Vec<WfId>) -> StoreResult<TermId> {
        self.add_term_with(span, None, None)
    }

    /// Append a term with lemma and part-of-speech metadata.
    pub fn add_term_with(
        &mut self,
        span: Vec<WfId>,
        lemma: Option<String>,
        pos: Option<String>,
    ) -> StoreResult<TermId> {
        let first = *span.first().ok_or(StoreError::EmptySpan)?;
        for &wf in &span {
            if wf.index() >= self.wfs.len() {
                return Err(StoreError::UnknownWordForm(wf.0));
            }
        }
        let sent = self.wfs[first.index()].sent;
        let id = TermId(self.terms.len() as u32);
        for &wf in &span {
            self.terms_by_wf.entry(wf).or_default().push(id);
        }
        self.terms.push(Some(Term { span, lemma, pos, sent }));
        self.term_layer.push(id);
        self.terms_by_sent.entry(sent).or_default().push(id);
        Ok(id)
    }

    /// Append a dependency edge `from → to` with the given relation label.
    ///
    /// The edge inherits the sentence number of its source term and is
    /// registered under both endpoints in the by-term index.
    pub fn add_dep(
        &mut self,
        from: TermId,
        to: TermId,
        rfunc: impl Into<String>,
    ) -> StoreResult<DepId> {
        let sent = self.term(from).ok_or(StoreError::UnknownTerm(from.0))?.sent;
        if self.term(to).is_none() {
            return Err(StoreError::UnknownTerm(to.0));
        }
        let id = DepId(self.deps.len() as u32);
        self.deps.push(Some(DepEdge {
            from,
            to,
            rfunc: rfunc.into(),
            sent,
        }));
        self.dep_layer.push(id);
        self.deps_by_sent.entry(sent).or_default().push(id);
        self.deps_by_term.entry(from).or_default().push(id);
        if to != from {
            self.deps_by_term.entry(to).or_default().push(id);
        }
        Ok(id)
    }

    /// Append an entity mention over the given terms.
    ///
    /// The entity inherits the sentence number of its first term.
    pub fn add_entity(
        &mut self,
        etype: impl Into<String>,
        span: Vec<TermId>,
    ) -> StoreResult<EntityId> {
        let first = *span.first().ok_or(StoreError::EmptySpan)?;
        for &t in &span {
            if self.term(t).is_none() {
                return Err(StoreError::UnknownTerm(t.0));
            }
        }
        let sent = self.term(first).ok_or(StoreError::UnknownTerm(first.0))?.sent;
        let id = EntityId(self.entities.len() as u32);
        let mut seen = BTreeSet::new();
        for &t in &span {
            if seen.insert(t) {
                self.entities_by_term.entry(t).or_default().push(id);
            }
        }
        self.entities.push(Some(Entity {
            etype: etype.into(),
            span,
            sent,
        }));
        self.entity_layer.push(id);
        self.entities_by_sent.entry(sent).or_default().push(id);
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove a dependency edge from the layer and every index.
    ///
    /// Returns `false` if the handle was already removed.
    pub fn remove_dep(&mut self, id: DepId) -> bool {
        let edge = match self.deps.get_mut(id.index()).and_then(Option::take) {
            Some(edge) => edge,
            None => return false,
        };
        retain_id(&mut self.dep_layer, id);
        remove_from_bucket(&mut self.deps_by_sent, edge.sent, id);
        remove_posting(&mut self.deps_by_term, edge.from, id);
        if edge.to != edge.from {
            remove_posting(&mut self.deps_by_term, edge.to, id);
        }
        true
    }

    /// Remove an entity from the layer and every index.
    ///
    /// Returns `false` if the handle was already removed.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let entity = match self.entities.get_mut(id.index()).and_then(Option::take) {
            Some(entity) => entity,
            None => return false,
        };
        retain_id(&mut self.entity_layer, id);
        remove_from_bucket(&mut self.entities_by_sent, entity.sent, id);
        for &t in &entity.span {
            remove_posting(&mut self.entities_by_term, t, id);
        }
        true
    }

    /// Remove a term, cascading to its dependents.
    ///
    /// Every dependency edge touching the term is removed, and the term
    /// is dropped from the span of every entity mentioning it (entities
    /// left with an empty span are removed). Then the term itself leaves
    /// the primary layer, its sentence bucket, and the by-word-form
    /// postings. Returns `false` if the handle was already removed.
    pub fn remove_term(&mut self, id: TermId) -> bool {
        if self.term(id).is_none() {
            return false;
        }

        let touching: Vec<DepId> = self.deps_by_term(id).to_vec();
        for dep in touching {
            self.remove_dep(dep);
        }

        let mentioning: Vec<EntityId> = self.entities_by_term(id).to_vec();
        for eid in mentioning {
            let now_empty = {
                let entity = match self.entities.get_mut(eid.index()).and_then(Option::as_mut) {
                    Some(entity) => entity,
                    None => continue,
                };
                entity.span.retain(|&t| t != id);
                entity.span.is_empty()
            };
            // The posting under the removed term must go in either case;
            // the entity's span no longer names it.
            remove_posting(&mut self.entities_by_term, id, eid);
            if now_empty {
                self.remove_entity(eid);
            }
        }

        let term = match self.terms.get_mut(id.index()).and_then(Option::take) {
            Some(term) => term,
            None => return false,
        };
        retain_id(&mut self.term_layer, id);
        remove_from_bucket(&mut self.terms_by_sent, term.sent, id);
        for &wf in &term.span {
            remove_posting(&mut self.terms_by_wf, wf, id);
        }
        true
    }

    // ------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------

    /// Resolve a word form handle.
    pub fn word_form(&self, id: WfId) -> Option<&WordForm> {
        self.wfs.get(id.index())
    }

    /// Resolve a term handle. `None` once the term has been removed.
    pub fn term(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id.index()).and_then(Option::as_ref)
    }

    /// Resolve a dependency edge handle. `None` once removed.
    pub fn dep(&self, id: DepId) -> Option<&DepEdge> {
        self.deps.get(id.index()).and_then(Option::as_ref)
    }

    /// Resolve an entity handle. `None` once removed.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index()).and_then(Option::as_ref)
    }

    // ------------------------------------------------------------------
    // Layer iteration, insertion order
    // ------------------------------------------------------------------

    /// All word forms in insertion order.
    pub fn word_forms(&self) -> impl Iterator<Item = (WfId, &WordForm)> {
        self.wfs
            .iter()
            .enumerate()
            .map(|(i, wf)| (WfId(i as u32), wf))
    }

    /// All live terms in insertion order.
    pub fn terms(&self) -> impl Iterator<Item = (TermId, &Term)> + '_ {
        self.term_layer
            .iter()
            .filter_map(move |&id| self.term(id).map(|t| (id, t)))
    }

    /// All live dependency edges in insertion order.
    pub fn deps(&self) -> impl Iterator<Item = (DepId, &DepEdge)> + '_ {
        self.dep_layer
            .iter()
            .filter_map(move |&id| self.dep(id).map(|d| (id, d)))
    }

    /// All live entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.entity_layer
            .iter()
            .filter_map(move |&id| self.entity(id).map(|e| (id, e)))
    }

    // ------------------------------------------------------------------
    // Derived-index lookups. Unknown keys return empty results.
    // ------------------------------------------------------------------

    /// Every dependency edge with the term as source or target, in
    /// insertion order.
    pub fn deps_by_term(&self, term: TermId) -> &[DepId] {
        self.deps_by_term
            .get(&term)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_DEPS)
    }

    /// Every entity whose span mentions the term, in insertion order.
    pub fn entities_by_term(&self, term: TermId) -> &[EntityId] {
        self.entities_by_term
            .get(&term)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_ENTITIES)
    }

    /// Every term whose span covers the word form, in insertion order.
    pub fn terms_by_wf(&self, wf: WfId) -> &[TermId] {
        self.terms_by_wf
            .get(&wf)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_TERMS)
    }

    /// Word forms of one sentence, in insertion order.
    pub fn wfs_by_sentence(&self, sent: u32) -> &[WfId] {
        self.wfs_by_sent
            .get(&sent)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_WFS)
    }

    /// Terms of one sentence, in insertion order.
    pub fn terms_by_sentence(&self, sent: u32) -> &[TermId] {
        self.terms_by_sent
            .get(&sent)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_TERMS)
    }

    /// Dependency edges of one sentence, in insertion order.
    pub fn deps_by_sentence(&self, sent: u32) -> &[DepId] {
        self.deps_by_sent
            .get(&sent)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_DEPS)
    }

    /// Entities of one sentence, in insertion order.
    pub fn entities_by_sentence(&self, sent: u32) -> &[EntityId] {
        self.entities_by_sent
            .get(&sent)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_ENTITIES)
    }

    /// Sentence numbers recorded for a paragraph, ascending.
    pub fn sentences_by_paragraph(&self, para: u32) -> Vec<u32> {
        self.sents_by_para
            .get(&para)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Word forms of one paragraph: its sentences' buckets, flattened.
    pub fn wfs_by_paragraph(&self, para: u32) -> Vec<WfId> {
        self.flatten_paragraph(para, |store, sent| store.wfs_by_sentence(sent))
    }

    /// Terms of one paragraph: its sentences' buckets, flattened.
    pub fn terms_by_paragraph(&self, para: u32) -> Vec<TermId> {
        self.flatten_paragraph(para, |store, sent| store.terms_by_sentence(sent))
    }

    /// Dependency edges of one paragraph: its sentences' buckets, flattened.
    pub fn deps_by_paragraph(&self, para: u32) -> Vec<DepId> {
        self.flatten_paragraph(para, |store, sent| store.deps_by_sentence(sent))
    }

    /// Entities of one paragraph: its sentences' buckets, flattened.
    pub fn entities_by_paragraph(&self, para: u32) -> Vec<EntityId> {
        self.flatten_paragraph(para, |store, sent| store.entities_by_sentence(sent))
    }

    fn flatten_paragraph<T: Copy>(
        &self,
        para: u32,
        bucket: impl Fn(&Self, u32) -> &[T],
    ) -> Vec<T> {
        let mut out = Vec::new();
        if let Some(sents) = self.sents_by_para.get(&para) {
            for &sent in sents {
                out.extend_from_slice(bucket(self, sent));
            }
        }
        out
    }

    /// Number of distinct sentences seen across all word forms.
    pub fn sentence_count(&self) -> usize {
        self.wfs_by_sent.len()
    }

    /// Number of distinct paragraphs seen across all word forms.
    pub fn paragraph_count(&self) -> usize {
        self.sents_by_para.len()
    }
}

fn retain_id<T: PartialEq>(layer: &mut Vec<T>, id: T) {
    if let Some(pos) = layer.iter().position(|x| *x == id) {
        layer.remove(pos);
    }
}

fn remove_from_bucket<T: PartialEq>(buckets: &mut HashMap<u32, Vec<T>>, key: u32, id: T) {
    if let Some(bucket) = buckets.get_mut(&key) {
        if let Some(pos) = bucket.iter().position(|x| *x == id) {
            bucket.remove(pos);
        }
        if bucket.is_empty() {
            buckets.remove(&key);
        }
    }
}

fn remove_posting<K: std::hash::Hash + Eq, T: PartialEq>(
    postings: &mut HashMap<K, Vec<T>>,
    key: K,
    id: T,
) {
    if let Some(list) = postings.get_mut(&key) {
        if let Some(pos) = list.iter().position(|x| *x == id) {
            list.remove(pos);
        }
        if list.is_empty() {
            postings.remove(&key);
        }
    }
}
