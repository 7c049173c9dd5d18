#![forbid(unsafe_code)]

//! Reorder and reparent engines.
//!
//! Both engines read a [`PageStore`] and produce a [`MovePlan`]: the full new
//! index assignment for every sibling group the move touches. Plans are
//! computed without mutating anything, so the caller can snapshot the store,
//! apply the plan, and ship the same plan to the backing store.
//!
//! # Index semantics
//!
//! A reorder target is a *gap* index into the sibling list that still
//! contains the dragged page: gap `0` is before the first item and gap `n` is
//! after the last. A reparent target is an insertion index into the target
//! group, clamped to `[0, len]`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descendants::descendants;
use crate::error::{InvalidMoveReason, ParentLabel, Result, TreeError};
use crate::page::PageId;
use crate::store::PageStore;

/// New position for one page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderUpdate {
    pub page_id: PageId,
    pub order_index: usize,
}

impl OrderUpdate {
    #[must_use]
    pub fn new(page_id: PageId, order_index: usize) -> Self {
        Self {
            page_id,
            order_index,
        }
    }
}

/// A computed move, ready to apply and persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub page_id: PageId,
    pub from_parent: Option<PageId>,
    pub to_parent: Option<PageId>,
    /// Final position of the dragged page.
    pub order_index: usize,
    /// Dense assignment for every page of every touched group, the dragged
    /// page included.
    pub updates: Vec<OrderUpdate>,
}

impl MovePlan {
    #[must_use]
    pub fn is_reparent(&self) -> bool {
        self.from_parent != self.to_parent
    }

    /// Write the plan into `store`.
    pub fn apply(&self, store: &mut PageStore) -> Result<()> {
        store.assign(&self.page_id, self.to_parent.clone(), self.order_index)?;
        for update in &self.updates {
            store.set_order(&update.page_id, update.order_index)?;
        }
        Ok(())
    }
}

fn dense(ids: &[PageId]) -> impl Iterator<Item = OrderUpdate> + '_ {
    ids.iter()
        .enumerate()
        .map(|(order, id)| OrderUpdate::new(id.clone(), order))
}

/// Resolve a gap index into the post-removal insertion index.
///
/// Dropping after the page's own position shifts everything above the gap up
/// by one once the page is lifted out, so the gap index is decremented before
/// clamping into `[0, len - 1]`.
#[must_use]
pub fn resolve_reorder_index(len: usize, original: usize, requested: usize) -> usize {
    let adjusted = if original < requested {
        requested - 1
    } else {
        requested
    };
    adjusted.min(len.saturating_sub(1))
}

/// Reorder `page` within its current sibling group.
///
/// Returns `Ok(None)` when the drop resolves to the page's current position;
/// nothing needs to change or be persisted in that case.
pub fn reorder(store: &PageStore, page: &PageId, target_index: usize) -> Result<Option<MovePlan>> {
    let parent = store.page(page)?.parent_id.clone();
    let mut siblings = store.child_ids(parent.as_ref());
    let original = siblings
        .iter()
        .position(|id| id == page)
        .ok_or_else(|| TreeError::UnknownPage(page.clone()))?;

    let resolved = resolve_reorder_index(siblings.len(), original, target_index);
    if resolved == original {
        tracing::debug!(
            target: "sitetree.ordering",
            page = %page,
            index = original,
            "reorder resolves to current position"
        );
        return Ok(None);
    }

    let dragged = siblings.remove(original);
    siblings.insert(resolved, dragged);

    tracing::debug!(
        target: "sitetree.ordering",
        page = %page,
        parent = %ParentLabel(parent.clone()),
        from = original,
        to = resolved,
        "reorder planned"
    );

    Ok(Some(MovePlan {
        page_id: page.clone(),
        from_parent: parent.clone(),
        to_parent: parent,
        order_index: resolved,
        updates: dense(&siblings).collect(),
    }))
}

/// Refuse targets that would put `page` under itself or its own subtree.
pub fn check_reparent(
    store: &PageStore,
    page: &PageId,
    target_parent: Option<&PageId>,
) -> Result<()> {
    store.page(page)?;
    let Some(target) = target_parent else {
        return Ok(());
    };
    store.page(target)?;
    let reason = if target == page {
        Some(InvalidMoveReason::OwnPage)
    } else if descendants(store, page)?.contains(target) {
        Some(InvalidMoveReason::OwnDescendant)
    } else {
        None
    };
    match reason {
        Some(reason) => Err(TreeError::InvalidMove {
            page: page.clone(),
            target: target.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Move `page` under `target_parent` at `target_index`.
///
/// The vacated group closes its gap and the target group opens one; both end
/// dense. When the target parent is the current parent the index is read as
/// an insertion index into the group without the page.
pub fn reparent(
    store: &PageStore,
    page: &PageId,
    target_parent: Option<&PageId>,
    target_index: usize,
) -> Result<MovePlan> {
    check_reparent(store, page, target_parent)?;
    let from_parent = store.page(page)?.parent_id.clone();
    let to_parent = target_parent.cloned();

    let origin: Vec<PageId> = store
        .child_ids(from_parent.as_ref())
        .into_iter()
        .filter(|id| id != page)
        .collect();
    let mut target: Vec<PageId> = if from_parent == to_parent {
        origin.clone()
    } else {
        store.child_ids(to_parent.as_ref())
    };
    let order_index = target_index.min(target.len());
    target.insert(order_index, page.clone());

    let mut updates = Vec::with_capacity(origin.len() + target.len());
    if from_parent != to_parent {
        updates.extend(dense(&origin));
    }
    updates.extend(dense(&target));

    tracing::debug!(
        target: "sitetree.ordering",
        page = %page,
        from = %ParentLabel(from_parent.clone()),
        to = %ParentLabel(to_parent.clone()),
        index = order_index,
        "reparent planned"
    );

    Ok(MovePlan {
        page_id: page.clone(),
        from_parent,
        to_parent,
        order_index,
        updates,
    })
}

/// Plan a drop of `page` at `target_index` under `target_parent`, choosing
/// the reorder engine when the parent is unchanged and the reparent engine
/// otherwise.
pub fn plan_move(
    store: &PageStore,
    page: &PageId,
    target_parent: Option<&PageId>,
    target_index: usize,
) -> Result<Option<MovePlan>> {
    let current = store.page(page)?.parent_id.as_ref();
    if current == target_parent {
        reorder(store, page, target_index)
    } else {
        reparent(store, page, target_parent, target_index).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;

    fn id(s: &str) -> PageId {
        PageId::new(s)
    }

    /// Roots A, B, C; D child of A.
    fn abc() -> PageStore {
        PageStore::from_pages(vec![
            Page::new("a", "A", "a").with_order(0),
            Page::new("b", "B", "b").with_order(1),
            Page::new("c", "C", "c").with_order(2),
            Page::new("d", "D", "d").with_parent("a").with_order(0),
            Page::new("e", "E", "e").with_parent("a").with_order(1),
        ])
        .unwrap()
    }

    fn applied(store: &PageStore, plan: &MovePlan) -> PageStore {
        let mut next = store.clone();
        plan.apply(&mut next).unwrap();
        next
    }

    fn order_of(store: &PageStore, page: &str) -> (Option<PageId>, usize) {
        let page = store.get(&id(page)).unwrap();
        (page.parent_id.clone(), page.order_index)
    }

    #[test]
    fn resolve_compensates_for_removal() {
        assert_eq!(resolve_reorder_index(3, 0, 2), 1);
        assert_eq!(resolve_reorder_index(3, 0, 3), 2);
        assert_eq!(resolve_reorder_index(3, 2, 0), 0);
        assert_eq!(resolve_reorder_index(3, 1, 1), 1);
        assert_eq!(resolve_reorder_index(3, 1, 2), 1);
        assert_eq!(resolve_reorder_index(3, 0, 99), 2);
    }

    #[test]
    fn drag_first_after_second() {
        let store = abc();
        let plan = reorder(&store, &id("a"), 2).unwrap().unwrap();
        let next = applied(&store, &plan);
        assert_eq!(next.child_ids(None), vec![id("b"), id("a"), id("c")]);
        assert_eq!(order_of(&next, "b").1, 0);
        assert_eq!(order_of(&next, "a").1, 1);
        assert_eq!(order_of(&next, "c").1, 2);
        assert!(next.validate().is_ok());
    }

    #[test]
    fn drag_to_trailing_gap_appends() {
        let store = abc();
        let plan = reorder(&store, &id("a"), 3).unwrap().unwrap();
        let next = applied(&store, &plan);
        assert_eq!(next.child_ids(None), vec![id("b"), id("c"), id("a")]);
    }

    #[test]
    fn drag_last_to_front() {
        let store = abc();
        let plan = reorder(&store, &id("c"), 0).unwrap().unwrap();
        assert_eq!(
            applied(&store, &plan).child_ids(None),
            vec![id("c"), id("a"), id("b")]
        );
    }

    #[test]
    fn drop_on_own_gaps_is_noop() {
        let store = abc();
        assert!(reorder(&store, &id("b"), 1).unwrap().is_none());
        assert!(reorder(&store, &id("b"), 2).unwrap().is_none());
    }

    #[test]
    fn reparent_into_other_group() {
        let store = abc();
        let plan = reparent(&store, &id("d"), Some(&id("b")), 0).unwrap();
        assert!(plan.is_reparent());
        let next = applied(&store, &plan);
        assert_eq!(order_of(&next, "d"), (Some(id("b")), 0));
        assert_eq!(order_of(&next, "e"), (Some(id("a")), 0));
        assert!(next.validate().is_ok());
    }

    #[test]
    fn reparent_clamps_index_to_group_length() {
        let store = abc();
        let plan = reparent(&store, &id("c"), Some(&id("a")), 40).unwrap();
        let next = applied(&store, &plan);
        assert_eq!(order_of(&next, "c"), (Some(id("a")), 2));
        assert_eq!(next.child_ids(None), vec![id("a"), id("b")]);
        assert!(next.validate().is_ok());
    }

    #[test]
    fn reparent_to_root() {
        let store = abc();
        let plan = reparent(&store, &id("e"), None, 1).unwrap();
        let next = applied(&store, &plan);
        assert_eq!(
            next.child_ids(None),
            vec![id("a"), id("e"), id("b"), id("c")]
        );
        assert_eq!(next.child_ids(Some(&id("a"))), vec![id("d")]);
        assert!(next.validate().is_ok());
    }

    #[test]
    fn reparent_under_self_is_rejected() {
        let err = reparent(&abc(), &id("a"), Some(&id("a")), 0).unwrap_err();
        assert!(matches!(
            err,
            TreeError::InvalidMove {
                reason: InvalidMoveReason::OwnPage,
                ..
            }
        ));
    }

    #[test]
    fn reparent_under_descendant_is_rejected() {
        let err = reparent(&abc(), &id("a"), Some(&id("d")), 0).unwrap_err();
        assert!(matches!(
            err,
            TreeError::InvalidMove {
                reason: InvalidMoveReason::OwnDescendant,
                ..
            }
        ));
    }

    #[test]
    fn reparent_to_unknown_parent_is_rejected() {
        assert!(matches!(
            reparent(&abc(), &id("a"), Some(&id("zz")), 0),
            Err(TreeError::UnknownPage(_))
        ));
    }

    #[test]
    fn plan_move_dispatches_on_parent() {
        let store = abc();
        let same = plan_move(&store, &id("a"), None, 2).unwrap().unwrap();
        assert!(!same.is_reparent());
        let (a, c) = (id("a"), id("c"));
        let cross = plan_move(&store, &a, Some(&c), 0).unwrap().unwrap();
        assert!(cross.is_reparent());
        assert_eq!(cross.updates.len(), 3);
    }

    #[test]
    fn same_parent_reparent_stays_dense() {
        let store = abc();
        let plan = reparent(&store, &id("a"), None, 2).unwrap();
        let next = applied(&store, &plan);
        assert_eq!(next.child_ids(None), vec![id("b"), id("c"), id("a")]);
        assert_eq!(plan.updates.len(), 3);
    }
}
