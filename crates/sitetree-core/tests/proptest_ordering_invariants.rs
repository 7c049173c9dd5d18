#![forbid(unsafe_code)]

//! Property tests for the ordering engines.
//!
//! Validates:
//! - Any sequence of planned moves keeps every sibling group dense.
//! - Dropping a page on its own gap plans nothing.
//! - Reparenting under self or a descendant is refused without side effects.
//! - Page count and id set never change across moves.

use proptest::prelude::*;

use sitetree_core::descendants::descendants;
use sitetree_core::{Page, PageId, PageStore, TreeError, plan_move, reorder};

// ============================================================================
// Strategy helpers
// ============================================================================

/// Build a forest where page `i` may only point at a page `< i`.
fn forest(parents: &[Option<usize>]) -> PageStore {
    let mut counts = vec![0usize; parents.len() + 1];
    let pages = parents
        .iter()
        .enumerate()
        .map(|(i, parent)| {
            let slot = parent.map_or(0, |p| p + 1);
            let order = counts[slot];
            counts[slot] += 1;
            let page =
                Page::new(format!("p{i}"), format!("Page {i}"), format!("p{i}")).with_order(order);
            match parent {
                Some(p) => page.with_parent(format!("p{p}")),
                None => page,
            }
        })
        .collect();
    PageStore::from_pages(pages).unwrap()
}

fn forest_strategy() -> impl Strategy<Value = Vec<Option<usize>>> {
    (1usize..14).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    prop::option::weighted(0.6, 0..i).boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

#[derive(Debug, Clone)]
struct DropOp {
    page: usize,
    parent: Option<usize>,
    index: usize,
}

fn drops_strategy() -> impl Strategy<Value = Vec<DropOp>> {
    prop::collection::vec(
        (0usize..14, prop::option::of(0usize..14), 0usize..16)
            .prop_map(|(page, parent, index)| DropOp {
                page,
                parent,
                index,
            }),
        1..30,
    )
}

fn pid(i: usize, len: usize) -> PageId {
    PageId::new(format!("p{}", i % len))
}

// ============================================================================
// Invariant 1: every group stays dense after any valid move
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn moves_preserve_dense_groups(parents in forest_strategy(), drops in drops_strategy()) {
        let mut store = forest(&parents);
        prop_assert!(store.validate().is_ok());
        let len = store.len();

        for drop in &drops {
            let page = pid(drop.page, len);
            let parent = drop.parent.map(|p| pid(p, len));
            let before = store.clone();
            match plan_move(&store, &page, parent.as_ref(), drop.index) {
                Ok(Some(plan)) => {
                    plan.apply(&mut store).unwrap();
                    prop_assert!(store.validate().is_ok(), "broken after {:?}", drop);
                    prop_assert_eq!(store.len(), len);
                }
                Ok(None) => prop_assert_eq!(&store, &before),
                Err(TreeError::InvalidMove { .. }) => prop_assert_eq!(&store, &before),
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
    }
}

// ============================================================================
// Invariant 2: no-op drops plan nothing
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn own_gaps_are_noops(parents in forest_strategy(), pick in 0usize..14) {
        let store = forest(&parents);
        let page = pid(pick, store.len());
        let index = store.get(&page).unwrap().order_index;
        prop_assert!(reorder(&store, &page, index).unwrap().is_none());
        prop_assert!(reorder(&store, &page, index + 1).unwrap().is_none());
    }
}

// ============================================================================
// Invariant 3: reparenting into the own subtree is refused
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn own_subtree_targets_are_refused(
        parents in forest_strategy(),
        pick in 0usize..14,
        index in 0usize..8,
    ) {
        let store = forest(&parents);
        let page = pid(pick, store.len());
        let mut forbidden = descendants(&store, &page).unwrap();
        forbidden.push(page.clone());
        for target in &forbidden {
            let result = plan_move(&store, &page, Some(target), index);
            let refused = matches!(result, Err(TreeError::InvalidMove { .. }));
            prop_assert!(refused, "move of {} under {} was accepted", page, target);
        }
    }
}
