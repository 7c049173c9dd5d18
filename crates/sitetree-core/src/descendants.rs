#![forbid(unsafe_code)]

//! Transitive children of a page.

use ahash::AHashSet;

use crate::error::Result;
use crate::page::PageId;
use crate::store::PageStore;

/// All pages transitively parented by `id`, depth first in sibling order.
/// `id` itself is not included.
pub fn descendants(store: &PageStore, id: &PageId) -> Result<Vec<PageId>> {
    store.page(id)?;
    let mut visited = AHashSet::new();
    visited.insert(id.clone());
    let mut out = Vec::new();
    collect(store, id, &mut visited, &mut out);
    Ok(out)
}

fn collect(
    store: &PageStore,
    parent: &PageId,
    visited: &mut AHashSet<PageId>,
    out: &mut Vec<PageId>,
) {
    for child in store.child_ids(Some(parent)) {
        // A revisit only happens on cyclic data; the branch is cut there.
        if !visited.insert(child.clone()) {
            continue;
        }
        out.push(child.clone());
        collect(store, &child, visited, out);
    }
}

/// Whether `candidate` lies in the subtree below `ancestor`.
pub fn is_descendant(store: &PageStore, ancestor: &PageId, candidate: &PageId) -> Result<bool> {
    Ok(descendants(store, ancestor)?.contains(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;

    fn store() -> PageStore {
        PageStore::from_pages(vec![
            Page::new("a", "A", "a"),
            Page::new("b", "B", "b").with_order(1),
            Page::new("d", "D", "d").with_parent("a"),
            Page::new("e", "E", "e").with_parent("a").with_order(1),
            Page::new("f", "F", "f").with_parent("d"),
        ])
        .unwrap()
    }

    fn ids(list: &[&str]) -> Vec<PageId> {
        list.iter().map(|s| PageId::new(*s)).collect()
    }

    #[test]
    fn collects_depth_first() {
        assert_eq!(
            descendants(&store(), &PageId::new("a")).unwrap(),
            ids(&["d", "f", "e"])
        );
    }

    #[test]
    fn leaf_has_no_descendants() {
        let below = descendants(&store(), &PageId::new("b")).unwrap();
        assert!(below.is_empty());
    }

    #[test]
    fn descendant_query() {
        let store = store();
        let (a, d, f) = (PageId::new("a"), PageId::new("d"), PageId::new("f"));
        assert!(is_descendant(&store, &a, &f).unwrap());
        assert!(!is_descendant(&store, &d, &a).unwrap());
        assert!(!is_descendant(&store, &a, &a).unwrap());
    }

    #[test]
    fn cyclic_data_terminates() {
        let store = PageStore::from_pages(vec![
            Page::new("a", "A", "a").with_parent("b"),
            Page::new("b", "B", "b").with_parent("a"),
        ])
        .unwrap();
        assert_eq!(descendants(&store, &PageId::new("a")).unwrap(), ids(&["b"]));
    }
}
