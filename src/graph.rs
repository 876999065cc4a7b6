//! Read-only navigation over the dependency layer.
//!
//! `DepGraph` borrows an [`AnnotationStore`] and answers graph-shaped
//! questions through its by-term index: incoming/outgoing edge lookup,
//! ancestor and descendant closures, common-root detection, and the path
//! between two terms.
//!
//! Dependency structures are expected to be forests per sentence (at most
//! one incoming edge per term), but that invariant is not enforced by the
//! store. Every traversal here carries a visited set, so a violated
//! invariant terminates with a defined answer instead of looping.

use std::collections::{HashSet, VecDeque};

use crate::error::PatternResult;
use crate::pattern::PatternEngine;
use crate::store::AnnotationStore;
use crate::term::{DepEdge, DepId, TermId};

/// Borrowed view over a store's dependency layer.
#[derive(Debug, Clone, Copy)]
pub struct DepGraph<'a> {
    store: &'a AnnotationStore,
}

impl<'a> DepGraph<'a> {
    /// Create a navigator over the given store.
    pub fn new(store: &'a AnnotationStore) -> Self {
        Self { store }
    }

    /// The edge governing `term`, if any.
    ///
    /// Scans the by-term postings for the first edge whose target is
    /// `term`. Under the forest invariant there is at most one; `None`
    /// means the term is a root.
    pub fn incoming_edge(&self, term: TermId) -> Option<DepId> {
        self.store
            .deps_by_term(term)
            .iter()
            .copied()
            .find(|&id| {
                self.store
                    .dep(id)
                    .map(|d| d.to == term)
                    .unwrap_or(false)
            })
    }

    /// Edges governed by `term`, in insertion order.
    pub fn outgoing_edges(&self, term: TermId) -> Vec<DepId> {
        self.store
            .deps_by_term(term)
            .iter()
            .copied()
            .filter(|&id| {
                self.store
                    .dep(id)
                    .map(|d| d.from == term)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// All terms reachable from the seeds by following edges forward
    /// (source → target), seeds included.
    ///
    /// The seeds act as ancestors; the result is the closure of their
    /// descendants.
    pub fn ancestors_closure(&self, seeds: impl IntoIterator<Item = TermId>) -> HashSet<TermId> {
        self.closure(seeds, |dep, term| {
            if dep.from == term {
                Some(dep.to)
            } else {
                None
            }
        })
    }

    /// All terms reachable from the seeds by following edges backward
    /// (target → source), seeds included.
    ///
    /// The seeds act as descendants; the result is the closure of their
    /// ancestors.
    pub fn descendants_closure(&self, seeds: impl IntoIterator<Item = TermId>) -> HashSet<TermId> {
        self.closure(seeds, |dep, term| {
            if dep.to == term {
                Some(dep.from)
            } else {
                None
            }
        })
    }

    fn closure(
        &self,
        seeds: impl IntoIterator<Item = TermId>,
        step: impl Fn(&DepEdge, TermId) -> Option<TermId>,
    ) -> HashSet<TermId> {
        let mut visited: HashSet<TermId> = HashSet::new();
        let mut queue: VecDeque<TermId> = VecDeque::new();
        for seed in seeds {
            if visited.insert(seed) {
                queue.push_back(seed);
            }
        }
        while let Some(term) = queue.pop_front() {
            for &id in self.store.deps_by_term(term) {
                let dep = match self.store.dep(id) {
                    Some(dep) => dep,
                    None => continue,
                };
                if let Some(next) = step(dep, term) {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        visited
    }

    /// The unique root of a term set, if one exists.
    ///
    /// A term is a candidate root when it has no incoming edge or its
    /// governor lies outside the set. Exactly one candidate is the
    /// answer; zero or several mean the set is ambiguous or disconnected
    /// and the result is `None`.
    pub fn common_root(&self, terms: impl IntoIterator<Item = TermId>) -> Option<TermId> {
        let set: HashSet<TermId> = terms.into_iter().collect();
        let mut root: Option<TermId> = None;
        for &term in &set {
            let governed_from_inside = self
                .incoming_edge(term)
                .and_then(|id| self.store.dep(id))
                .map(|dep| set.contains(&dep.from))
                .unwrap_or(false);
            if !governed_from_inside {
                match root {
                    None => root = Some(term),
                    Some(existing) if existing == term => {}
                    Some(_) => return None,
                }
            }
        }
        root
    }

    /// The edge sequence connecting `from` to `to`, in traversal order.
    ///
    /// Hops may run with or against edge direction. The search joins two
    /// upward walks at their nearest shared ancestor, which is exact for
    /// forest-shaped structures; multi-parent or cyclic structures the
    /// walks cannot join come back as `None` (unconnected), never as a
    /// hang.
    pub fn path(&self, from: TermId, to: TermId) -> Option<Vec<DepId>> {
        if from == to {
            return Some(Vec::new());
        }

        // Walk upward from `to`. If the walk hits `from`, `to` is a
        // descendant and the reversed walk is the whole path.
        let mut to_path: Vec<DepId> = Vec::new();
        let mut seen: HashSet<TermId> = HashSet::new();
        let mut cursor = to;
        while seen.insert(cursor) {
            let id = match self.incoming_edge(cursor) {
                Some(id) => id,
                None => break,
            };
            let dep = self.store.dep(id)?;
            to_path.push(id);
            if dep.from == from {
                to_path.reverse();
                return Some(to_path);
            }
            cursor = dep.from;
        }

        // Walk upward from `from`, checking at each step for `to` itself
        // or for a junction with the first walk.
        let mut from_path: Vec<DepId> = Vec::new();
        let mut seen: HashSet<TermId> = HashSet::new();
        let mut cursor = from;
        while seen.insert(cursor) {
            let id = match self.incoming_edge(cursor) {
                Some(id) => id,
                None => break,
            };
            let dep = self.store.dep(id)?;
            from_path.push(id);
            if dep.from == to {
                return Some(from_path);
            }
            let junction = to_path.iter().position(|&other| {
                self.store
                    .dep(other)
                    .map(|o| o.from == dep.from)
                    .unwrap_or(false)
            });
            if let Some(i) = junction {
                // Splice: root-to-`to` segment re-descends from the
                // shared ancestor.
                for j in (0..=i).rev() {
                    from_path.push(to_path[j]);
                }
                return Some(from_path);
            }
            cursor = dep.from;
        }

        None
    }

    /// Descendants of each seed whose connecting path matches `pattern`.
    ///
    /// For every seed, walks its descendant closure, computes the path
    /// seed → descendant, and keeps the descendants whose encoded path
    /// the compiled pattern accepts.
    pub fn descendants_matching(
        &self,
        seeds: impl IntoIterator<Item = TermId>,
        pattern: &str,
        engine: &PatternEngine,
    ) -> PatternResult<HashSet<TermId>> {
        let mut result = HashSet::new();
        for seed in seeds {
            for descendant in self.ancestors_closure(Some(seed)) {
                if let Some(path) = self.path(seed, descendant) {
                    if engine.matches(self.store, seed, &path, pattern)? {
                        result.insert(descendant);
                    }
                }
            }
        }
        Ok(result)
    }

    /// Ancestors of each seed whose connecting path matches `pattern`.
    pub fn ancestors_matching(
        &self,
        seeds: impl IntoIterator<Item = TermId>,
        pattern: &str,
        engine: &PatternEngine,
    ) -> PatternResult<HashSet<TermId>> {
        let mut result = HashSet::new();
        for seed in seeds {
            for ancestor in self.descendants_closure(Some(seed)) {
                if let Some(path) = self.path(seed, ancestor) {
                    if engine.matches(self.store, seed, &path, pattern)? {
                        result.insert(ancestor);
                    }
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AnnotationStore;
    use crate::term::WordForm;

    fn chain(store: &mut AnnotationStore, n: usize) -> Vec<TermId> {
        (0..n)
            .map(|i| {
                let wf = store.add_word_form(WordForm::new(format!("w{}", i), 1));
                store.add_term(vec![wf]).unwrap()
            })
            .collect()
    }

    #[test]
    fn incoming_and_outgoing() {
        let mut store = AnnotationStore::new();
        let t = chain(&mut store, 3);
        let d1 = store.add_dep(t[0], t[1], "nsubj").unwrap();
        let d2 = store.add_dep(t[0], t[2], "obj").unwrap();

        let graph = DepGraph::new(&store);
        assert_eq!(graph.incoming_edge(t[1]), Some(d1));
        assert_eq!(graph.incoming_edge(t[0]), None);
        assert_eq!(graph.outgoing_edges(t[0]), vec![d1, d2]);
        assert!(graph.outgoing_edges(t[2]).is_empty());
    }

    #[test]
    fn closures_contain_seeds_and_are_closed() {
        let mut store = AnnotationStore::new();
        let t = chain(&mut store, 4);
        store.add_dep(t[0], t[1], "a").unwrap();
        store.add_dep(t[1], t[2], "b").unwrap();
        store.add_dep(t[0], t[3], "c").unwrap();

        let graph = DepGraph::new(&store);
        let down = graph.ancestors_closure(Some(t[0]));
        assert_eq!(down.len(), 4);
        // Closed under outgoing edges.
        for &u in &down {
            for id in graph.outgoing_edges(u) {
                assert!(down.contains(&store.dep(id).unwrap().to));
            }
        }

        let up = graph.descendants_closure(Some(t[2]));
        assert_eq!(up, [t[2], t[1], t[0]].iter().copied().collect());
    }

    #[test]
    fn closure_terminates_on_cycle() {
        let mut store = AnnotationStore::new();
        let t = chain(&mut store, 2);
        store.add_dep(t[0], t[1], "a").unwrap();
        store.add_dep(t[1], t[0], "b").unwrap();

        let graph = DepGraph::new(&store);
        assert_eq!(graph.ancestors_closure(Some(t[0])).len(), 2);
        assert_eq!(graph.descendants_closure(Some(t[0])).len(), 2);
    }

    #[test]
    fn common_root_of_one_tree() {
        let mut store = AnnotationStore::new();
        let t = chain(&mut store, 3);
        store.add_dep(t[0], t[1], "a").unwrap();
        store.add_dep(t[1], t[2], "b").unwrap();

        let graph = DepGraph::new(&store);
        assert_eq!(graph.common_root(t.iter().copied()), Some(t[0]));
        // Subset excluding the root: t[1] governs t[2] from inside,
        // t[1] is governed from outside, so t[1] is the unique candidate.
        assert_eq!(graph.common_root(vec![t[1], t[2]]), Some(t[1]));
    }

    #[test]
    fn common_root_ambiguous_across_trees() {
        let mut store = AnnotationStore::new();
        let t = chain(&mut store, 4);
        store.add_dep(t[0], t[1], "a").unwrap();
        store.add_dep(t[2], t[3], "b").unwrap();

        let graph = DepGraph::new(&store);
        assert_eq!(graph.common_root(t.iter().copied()), None);
        assert_eq!(graph.common_root(Vec::new()), None);
    }

    #[test]
    fn path_trivial_and_descending() {
        let mut store = AnnotationStore::new();
        let t = chain(&mut store, 3);
        let d1 = store.add_dep(t[0], t[1], "subj").unwrap();
        let d2 = store.add_dep(t[1], t[2], "obj").unwrap();

        let graph = DepGraph::new(&store);
        assert_eq!(graph.path(t[0], t[0]), Some(vec![]));
        assert_eq!(graph.path(t[0], t[2]), Some(vec![d1, d2]));
        assert_eq!(graph.path(t[2], t[0]), Some(vec![d2, d1]));
    }

    #[test]
    fn path_through_shared_ancestor() {
        let mut store = AnnotationStore::new();
        let t = chain(&mut store, 5);
        // t0 governs t1 and t2; t1 governs t3; t2 governs t4.
        let a = store.add_dep(t[0], t[1], "a").unwrap();
        let b = store.add_dep(t[0], t[2], "b").unwrap();
        let c = store.add_dep(t[1], t[3], "c").unwrap();
        let d = store.add_dep(t[2], t[4], "d").unwrap();

        let graph = DepGraph::new(&store);
        // t3 up to t0, then down to t4.
        assert_eq!(graph.path(t[3], t[4]), Some(vec![c, a, b, d]));
        assert_eq!(graph.path(t[4], t[3]), Some(vec![d, b, a, c]));
    }

    #[test]
    fn path_between_disjoint_trees_is_none() {
        let mut store = AnnotationStore::new();
        let t = chain(&mut store, 4);
        store.add_dep(t[0], t[1], "a").unwrap();
        store.add_dep(t[2], t[3], "b").unwrap();

        let graph = DepGraph::new(&store);
        assert_eq!(graph.path(t[1], t[3]), None);
        assert_eq!(graph.path(t[0], t[2]), None);
    }

    #[test]
    fn path_terminates_on_cycle() {
        let mut store = AnnotationStore::new();
        let t = chain(&mut store, 3);
        store.add_dep(t[0], t[1], "a").unwrap();
        store.add_dep(t[1], t[0], "b").unwrap();

        let graph = DepGraph::new(&store);
        // t2 is outside the cycle; both walks terminate.
        assert_eq!(graph.path(t[0], t[2]), None);
    }
}
