//! Structural properties of path and closure queries.

use std::collections::HashSet;

use crate::{AnnotationStore, DepGraph, TermId, WordForm};

/// A two-sentence fixture: one five-term tree and one detached chain.
///
/// Sentence 1: t0 governs t1 and t2; t1 governs t3; t2 governs t4.
/// Sentence 2: u0 governs u1.
fn fixture() -> (AnnotationStore, Vec<TermId>, Vec<TermId>) {
    let mut store = AnnotationStore::new();
    let t: Vec<TermId> = (0..5)
        .map(|i| {
            let wf = store.add_word_form(WordForm::new(format!("t{}", i), 1));
            store.add_term(vec![wf]).unwrap()
        })
        .collect();
    let u: Vec<TermId> = (0..2)
        .map(|i| {
            let wf = store.add_word_form(WordForm::new(format!("u{}", i), 2));
            store.add_term(vec![wf]).unwrap()
        })
        .collect();
    store.add_dep(t[0], t[1], "a").unwrap();
    store.add_dep(t[0], t[2], "b").unwrap();
    store.add_dep(t[1], t[3], "c").unwrap();
    store.add_dep(t[2], t[4], "d").unwrap();
    store.add_dep(u[0], u[1], "e").unwrap();
    (store, t, u)
}

#[test]
fn path_to_self_is_empty_for_every_term() {
    let (store, t, u) = fixture();
    let graph = DepGraph::new(&store);
    for &term in t.iter().chain(u.iter()) {
        assert_eq!(graph.path(term, term), Some(vec![]));
    }
}

#[test]
fn path_reversal_reconstructs_the_opposite_path() {
    let (store, t, _) = fixture();
    let graph = DepGraph::new(&store);
    for &a in &t {
        for &b in &t {
            let forward = graph.path(a, b).unwrap();
            let mut backward = graph.path(b, a).unwrap();
            backward.reverse();
            // Same edges in opposite traversal order; the direction flip
            // is implicit in which endpoint the walk starts at.
            assert_eq!(forward, backward, "path({:?}, {:?})", a, b);
        }
    }
}

#[test]
fn paths_across_components_are_none() {
    let (store, t, u) = fixture();
    let graph = DepGraph::new(&store);
    for &a in &t {
        for &b in &u {
            assert_eq!(graph.path(a, b), None);
            assert_eq!(graph.path(b, a), None);
        }
    }
}

#[test]
fn ancestors_closure_is_closed_under_outgoing_edges() {
    let (store, t, _) = fixture();
    let graph = DepGraph::new(&store);
    for &seed in &t {
        let closure = graph.ancestors_closure(Some(seed));
        assert!(closure.contains(&seed));
        for &member in &closure {
            for id in graph.outgoing_edges(member) {
                assert!(closure.contains(&store.dep(id).unwrap().to));
            }
        }
    }
}

#[test]
fn descendants_closure_is_the_dual() {
    let (store, t, _) = fixture();
    let graph = DepGraph::new(&store);
    for &seed in &t {
        let closure = graph.descendants_closure(Some(seed));
        assert!(closure.contains(&seed));
        for &member in &closure {
            if let Some(id) = graph.incoming_edge(member) {
                assert!(closure.contains(&store.dep(id).unwrap().from));
            }
        }
    }
}

#[test]
fn closures_from_multiple_seeds_union() {
    let (store, t, u) = fixture();
    let graph = DepGraph::new(&store);
    let both = graph.ancestors_closure(vec![t[1], u[0]]);
    let expected: HashSet<TermId> = [t[1], t[3], u[0], u[1]].iter().copied().collect();
    assert_eq!(both, expected);
}

#[test]
fn common_root_round_trips_with_closure() {
    let (store, t, _) = fixture();
    let graph = DepGraph::new(&store);
    // The closure of the root is the whole tree, whose root it is.
    let tree = graph.ancestors_closure(Some(t[0]));
    assert_eq!(graph.common_root(tree), Some(t[0]));
}
