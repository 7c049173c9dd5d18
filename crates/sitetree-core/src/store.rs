#![forbid(unsafe_code)]

//! The flat page store.
//!
//! [`PageStore`] mirrors the persisted page table as a flat list keyed by
//! id. Sibling groups and children are computed on demand by filtering on
//! `parent_id`, so the hierarchy never exists as owned nested nodes.
//!
//! The store is a plain value: cloning it is the rollback snapshot used by
//! the optimistic editor.
//!
//! # Invariants
//!
//! 1. Ids are unique.
//! 2. Every `parent_id` names a page in the store and the parent relation is
//!    acyclic.
//! 3. Every sibling group carries dense `order_index` values `0..k`.
//!
//! Mutating operations here keep 1 and 3 for every group they touch and
//! refuse operations that would break 2. [`PageStore::validate`] checks all
//! three for data seeded from outside.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::descendants::descendants;
use crate::error::{ParentLabel, Result, TreeError};
use crate::page::{Page, PageDraft, PageId, validate_slug};
use crate::path::ancestors;

/// How a delete treats the page's subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteStrategy {
    /// Remove only the page; its direct children become root pages.
    #[default]
    PromoteChildren,
    /// Remove the page and every descendant.
    Cascade,
}

/// What a delete removed and re-parented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteReport {
    pub removed: Vec<PageId>,
    pub promoted: Vec<PageId>,
}

/// One visible navigation entry produced by [`PageStore::menu`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: PageId,
    pub title: String,
    pub route: String,
    pub depth: usize,
}

/// Flat, id-indexed collection of pages.
#[derive(Debug, Clone, Default)]
pub struct PageStore {
    pages: Vec<Page>,
    index: AHashMap<PageId, usize>,
}

impl PartialEq for PageStore {
    fn eq(&self, other: &Self) -> bool {
        self.pages == other.pages
    }
}

impl Eq for PageStore {}

impl PageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from a page listing. Only id uniqueness is enforced here;
    /// call [`validate`](Self::validate) to check the hierarchy.
    pub fn from_pages(pages: Vec<Page>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(pages.len());
        for (pos, page) in pages.iter().enumerate() {
            if index.insert(page.id.clone(), pos).is_some() {
                return Err(TreeError::DuplicatePage(page.id.clone()));
            }
        }
        Ok(Self { pages, index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All pages in storage order.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    #[must_use]
    pub fn get(&self, id: &PageId) -> Option<&Page> {
        self.index.get(id).map(|&pos| &self.pages[pos])
    }

    #[must_use]
    pub fn contains(&self, id: &PageId) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a page or fail with [`TreeError::UnknownPage`].
    pub fn page(&self, id: &PageId) -> Result<&Page> {
        self.get(id)
            .ok_or_else(|| TreeError::UnknownPage(id.clone()))
    }

    pub(crate) fn page_mut(&mut self, id: &PageId) -> Result<&mut Page> {
        match self.index.get(id) {
            Some(&pos) => Ok(&mut self.pages[pos]),
            None => Err(TreeError::UnknownPage(id.clone())),
        }
    }

    /// The sibling group under `parent` (`None` = roots), sorted by
    /// `order_index`. Ties fall back to id so the order is total.
    #[must_use]
    pub fn children(&self, parent: Option<&PageId>) -> Vec<&Page> {
        let mut group: Vec<&Page> = self
            .pages
            .iter()
            .filter(|page| page.parent_id.as_ref() == parent)
            .collect();
        group.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then_with(|| a.id.cmp(&b.id))
        });
        group
    }

    /// Ids of the sibling group under `parent`, in display order.
    #[must_use]
    pub fn child_ids(&self, parent: Option<&PageId>) -> Vec<PageId> {
        self.children(parent)
            .into_iter()
            .map(|page| page.id.clone())
            .collect()
    }

    #[must_use]
    pub fn has_children(&self, id: &PageId) -> bool {
        self.pages
            .iter()
            .any(|page| page.parent_id.as_ref() == Some(id))
    }

    /// Distinct parent values present in the store.
    fn groups(&self) -> BTreeMap<Option<PageId>, Vec<&Page>> {
        let mut groups: BTreeMap<Option<PageId>, Vec<&Page>> = BTreeMap::new();
        for page in &self.pages {
            groups.entry(page.parent_id.clone()).or_default().push(page);
        }
        groups
    }

    /// Check the store invariants, reporting the first violation.
    pub fn validate(&self) -> Result<()> {
        for page in &self.pages {
            match &page.parent_id {
                Some(parent) if !self.contains(parent) => {
                    return Err(TreeError::DanglingParent {
                        page: page.id.clone(),
                        parent: parent.clone(),
                    });
                }
                _ => {}
            }
        }
        for page in &self.pages {
            ancestors(self, &page.id)?;
        }
        for (parent, mut group) in self.groups() {
            group.sort_by_key(|page| page.order_index);
            for (expected, page) in group.iter().enumerate() {
                if page.order_index != expected {
                    return Err(TreeError::BrokenOrdering {
                        parent: ParentLabel(parent),
                        expected,
                        found: page.order_index,
                    });
                }
            }
        }
        Ok(())
    }

    /// Insert a new page from the edit form.
    ///
    /// Without an explicit position the page goes to the end of its parent's
    /// sibling list; otherwise the position is clamped and later siblings
    /// shift down by one.
    pub fn create(&mut self, draft: PageDraft) -> Result<&Page> {
        validate_slug(&draft.slug)?;
        if self.contains(&draft.id) {
            return Err(TreeError::DuplicatePage(draft.id));
        }
        if let Some(parent) = &draft.parent_id {
            self.page(parent)?;
        }

        let siblings = self.child_ids(draft.parent_id.as_ref());
        let position = draft
            .position
            .map_or(siblings.len(), |pos| pos.min(siblings.len()));
        for (order, id) in siblings.iter().enumerate().skip(position) {
            self.page_mut(id)?.order_index = order + 1;
        }

        tracing::debug!(
            target: "sitetree.store",
            page = %draft.id,
            parent = %ParentLabel(draft.parent_id.clone()),
            position,
            "page created"
        );

        let page = Page {
            id: draft.id,
            title: draft.title,
            slug: draft.slug,
            parent_id: draft.parent_id,
            order_index: position,
            is_active: draft.is_active,
            show_in_menu: draft.show_in_menu,
        };
        let pos = self.pages.len();
        self.index.insert(page.id.clone(), pos);
        self.pages.push(page);
        Ok(&self.pages[pos])
    }

    pub fn set_active(&mut self, id: &PageId, active: bool) -> Result<()> {
        self.page_mut(id)?.is_active = active;
        Ok(())
    }

    pub fn set_show_in_menu(&mut self, id: &PageId, show: bool) -> Result<()> {
        self.page_mut(id)?.show_in_menu = show;
        Ok(())
    }

    /// Set a page's parent and position directly. Callers are responsible for
    /// keeping the touched groups dense; the ordering engines produce
    /// assignments that do.
    pub fn assign(
        &mut self,
        id: &PageId,
        parent: Option<PageId>,
        order_index: usize,
    ) -> Result<()> {
        let page = self.page_mut(id)?;
        page.parent_id = parent;
        page.order_index = order_index;
        Ok(())
    }

    /// Set only a page's position within its current group.
    pub fn set_order(&mut self, id: &PageId, order_index: usize) -> Result<()> {
        self.page_mut(id)?.order_index = order_index;
        Ok(())
    }

    /// Re-number the group under `parent` as `0..k`, keeping its current
    /// relative order.
    pub fn renumber(&mut self, parent: Option<&PageId>) -> Result<()> {
        let ids = self.child_ids(parent);
        for (order, id) in ids.iter().enumerate() {
            self.set_order(id, order)?;
        }
        Ok(())
    }

    /// Remove a page according to `strategy`.
    pub fn delete(&mut self, id: &PageId, strategy: DeleteStrategy) -> Result<DeleteReport> {
        let parent = self.page(id)?.parent_id.clone();
        let report = match strategy {
            DeleteStrategy::PromoteChildren => {
                let children = self.child_ids(Some(id));
                self.remove_ids(std::slice::from_ref(id));
                self.renumber(parent.as_ref())?;
                let root_count = self.children(None).len();
                for (offset, child) in children.iter().enumerate() {
                    self.assign(child, None, root_count + offset)?;
                }
                DeleteReport {
                    removed: vec![id.clone()],
                    promoted: children,
                }
            }
            DeleteStrategy::Cascade => {
                let mut removed = vec![id.clone()];
                removed.extend(descendants(self, id)?);
                self.remove_ids(&removed);
                self.renumber(parent.as_ref())?;
                DeleteReport {
                    removed,
                    promoted: Vec::new(),
                }
            }
        };

        tracing::debug!(
            target: "sitetree.store",
            page = %id,
            strategy = ?strategy,
            removed = report.removed.len(),
            promoted = report.promoted.len(),
            "page deleted"
        );
        Ok(report)
    }

    fn remove_ids(&mut self, ids: &[PageId]) {
        self.pages.retain(|page| !ids.contains(&page.id));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .pages
            .iter()
            .enumerate()
            .map(|(pos, page)| (page.id.clone(), pos))
            .collect();
    }

    /// Active, menu-visible pages whose ancestors are all active, depth
    /// first in display order.
    ///
    /// The walk starts at the roots, so pages caught in a parent cycle are
    /// unreachable and simply absent.
    #[must_use]
    pub fn menu(&self) -> Vec<MenuEntry> {
        let mut out = Vec::new();
        self.collect_menu(None, 0, "", &mut out);
        out
    }

    fn collect_menu(
        &self,
        parent: Option<&PageId>,
        depth: usize,
        prefix: &str,
        out: &mut Vec<MenuEntry>,
    ) {
        for page in self.children(parent) {
            if !page.is_active {
                continue;
            }
            let route = format!("{prefix}/{}", page.slug);
            if page.show_in_menu {
                out.push(MenuEntry {
                    id: page.id.clone(),
                    title: page.title.clone(),
                    route: route.clone(),
                    depth,
                });
            }
            self.collect_menu(Some(&page.id), depth + 1, &route, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PageId {
        PageId::new(s)
    }

    /// A(0){D(0),E(1)}, B(1), C(2)
    fn sample() -> PageStore {
        PageStore::from_pages(vec![
            Page::new("a", "A", "a").with_order(0),
            Page::new("b", "B", "b").with_order(1),
            Page::new("c", "C", "c").with_order(2),
            Page::new("d", "D", "d").with_parent("a").with_order(0),
            Page::new("e", "E", "e").with_parent("a").with_order(1),
        ])
        .unwrap()
    }

    fn orders(store: &PageStore, parent: Option<&str>) -> Vec<(String, usize)> {
        let parent = parent.map(id);
        store
            .children(parent.as_ref())
            .into_iter()
            .map(|p| (p.id.to_string(), p.order_index))
            .collect()
    }

    #[test]
    fn from_pages_rejects_duplicates() {
        let err = PageStore::from_pages(vec![Page::new("a", "A", "a"), Page::new("a", "A2", "a2")])
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicatePage(id("a")));
    }

    #[test]
    fn children_are_sorted_by_order_index() {
        let store = PageStore::from_pages(vec![
            Page::new("x", "X", "x").with_order(2),
            Page::new("y", "Y", "y").with_order(0),
            Page::new("z", "Z", "z").with_order(1),
        ])
        .unwrap();
        assert_eq!(store.child_ids(None), vec![id("y"), id("z"), id("x")]);
    }

    #[test]
    fn validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validate_reports_gap() {
        let store = PageStore::from_pages(vec![
            Page::new("a", "A", "a").with_order(0),
            Page::new("b", "B", "b").with_order(2),
        ])
        .unwrap();
        assert!(matches!(
            store.validate(),
            Err(TreeError::BrokenOrdering { expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn validate_reports_dangling_parent() {
        let store =
            PageStore::from_pages(vec![Page::new("a", "A", "a").with_parent("ghost")]).unwrap();
        assert!(matches!(
            store.validate(),
            Err(TreeError::DanglingParent { .. })
        ));
    }

    #[test]
    fn validate_reports_cycle() {
        let store = PageStore::from_pages(vec![
            Page::new("a", "A", "a").with_parent("b"),
            Page::new("b", "B", "b").with_parent("a"),
        ])
        .unwrap();
        assert!(matches!(
            store.validate(),
            Err(TreeError::CycleDetected { .. })
        ));
    }

    #[test]
    fn create_appends_to_parent_group_by_default() {
        let mut store = sample();
        let draft = PageDraft::new("f", "F", "f").under("a");
        let page = store.create(draft).unwrap();
        assert_eq!(page.order_index, 2);
        assert_eq!(
            orders(&store, Some("a")),
            vec![("d".into(), 0), ("e".into(), 1), ("f".into(), 2)]
        );
    }

    #[test]
    fn create_at_position_shifts_later_siblings() {
        let mut store = sample();
        store.create(PageDraft::new("f", "F", "f").at(1)).unwrap();
        assert_eq!(
            orders(&store, None),
            vec![("a".into(), 0), ("f".into(), 1), ("b".into(), 2), ("c".into(), 3)]
        );
        assert!(store.validate().is_ok());
    }

    #[test]
    fn create_rejects_unknown_parent_and_bad_slug() {
        let mut store = sample();
        assert!(matches!(
            store.create(PageDraft::new("f", "F", "f").under("nope")),
            Err(TreeError::UnknownPage(_))
        ));
        assert!(matches!(
            store.create(PageDraft::new("f", "F", "F F")),
            Err(TreeError::InvalidSlug { .. })
        ));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn delete_promotes_children_to_root() {
        let mut store = sample();
        let report = store
            .delete(&id("a"), DeleteStrategy::PromoteChildren)
            .unwrap();
        assert_eq!(report.removed, vec![id("a")]);
        assert_eq!(report.promoted, vec![id("d"), id("e")]);
        assert_eq!(
            orders(&store, None),
            vec![("b".into(), 0), ("c".into(), 1), ("d".into(), 2), ("e".into(), 3)]
        );
        assert!(store.validate().is_ok());
    }

    #[test]
    fn cascade_delete_removes_subtree() {
        let mut store = sample();
        let report = store.delete(&id("a"), DeleteStrategy::Cascade).unwrap();
        assert_eq!(report.removed, vec![id("a"), id("d"), id("e")]);
        assert_eq!(store.len(), 2);
        assert!(store.get(&id("d")).is_none());
        assert_eq!(orders(&store, None), vec![("b".into(), 0), ("c".into(), 1)]);
    }

    #[test]
    fn delete_child_closes_gap() {
        let mut store = sample();
        store
            .delete(&id("d"), DeleteStrategy::PromoteChildren)
            .unwrap();
        assert_eq!(orders(&store, Some("a")), vec![("e".into(), 0)]);
        assert!(store.validate().is_ok());
    }

    #[test]
    fn menu_skips_inactive_branches() {
        let mut store = sample();
        store.set_active(&id("a"), false).unwrap();
        store.set_show_in_menu(&id("c"), false).unwrap();
        let menu = store.menu();
        let routes: Vec<_> = menu.iter().map(|m| m.route.as_str()).collect();
        assert_eq!(routes, vec!["/b"]);
    }

    #[test]
    fn menu_includes_nested_routes() {
        let store = sample();
        let menu = store.menu();
        let routes: Vec<_> = menu.iter().map(|m| (m.route.as_str(), m.depth)).collect();
        assert_eq!(
            routes,
            vec![("/a", 0), ("/a/d", 1), ("/a/e", 1), ("/b", 0), ("/c", 0)]
        );
    }

    #[test]
    fn snapshot_clone_is_structurally_equal() {
        let store = sample();
        let snapshot = store.clone();
        assert_eq!(store, snapshot);
    }
}
