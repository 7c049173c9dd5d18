#![forbid(unsafe_code)]

//! Route resolution by walking parent references.
//!
//! The walk records every id it visits and stops with
//! [`TreeError::CycleDetected`] on the first revisit, so corrupted data can
//! never hang the resolver.

use ahash::AHashSet;

use crate::error::{Result, TreeError};
use crate::page::PageId;
use crate::store::PageStore;

/// Ancestors of `id`, nearest parent first. Does not include `id`.
pub fn ancestors(store: &PageStore, id: &PageId) -> Result<Vec<PageId>> {
    let mut visited = AHashSet::new();
    visited.insert(id.clone());
    let mut chain = Vec::new();
    let mut current = store.page(id)?;

    while let Some(parent) = &current.parent_id {
        if !visited.insert(parent.clone()) {
            return Err(TreeError::CycleDetected {
                page: id.clone(),
                repeated: parent.clone(),
            });
        }
        current = store.get(parent).ok_or_else(|| TreeError::DanglingParent {
            page: current.id.clone(),
            parent: parent.clone(),
        })?;
        chain.push(parent.clone());
    }
    Ok(chain)
}

/// Number of ancestors above `id`; roots have depth 0.
pub fn depth(store: &PageStore, id: &PageId) -> Result<usize> {
    ancestors(store, id).map(|chain| chain.len())
}

/// Full route of a page: `/` followed by the slugs from the topmost ancestor
/// down to the page, joined by `/`.
pub fn route(store: &PageStore, id: &PageId) -> Result<String> {
    let chain = ancestors(store, id)?;
    let mut route = String::new();
    for ancestor in chain.iter().rev() {
        route.push('/');
        route.push_str(&store.page(ancestor)?.slug);
    }
    route.push('/');
    route.push_str(&store.page(id)?.slug);
    Ok(route)
}
