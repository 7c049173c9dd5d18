#![forbid(unsafe_code)]

//! Page records.
//!
//! A [`Page`] is one row of the persisted page table. Hierarchy is expressed
//! only through `parent_id`; the tree itself is always derived on demand from
//! the flat [`PageStore`](crate::store::PageStore).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};

/// Opaque page identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PageId(String);

impl PageId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single page row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub slug: String,
    /// `None` for root pages.
    pub parent_id: Option<PageId>,
    /// Position among the pages sharing `parent_id`.
    pub order_index: usize,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub is_active: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub show_in_menu: bool,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl Page {
    /// Create an active, menu-visible root page at position 0.
    #[must_use]
    pub fn new(id: impl Into<PageId>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: slug.into(),
            parent_id: None,
            order_index: 0,
            is_active: true,
            show_in_menu: true,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<PageId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_order(mut self, order_index: usize) -> Self {
        self.order_index = order_index;
        self
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    #[must_use]
    pub fn with_menu(mut self, show: bool) -> Self {
        self.show_in_menu = show;
        self
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input of the page edit form.
///
/// The store assigns the final position; `position` only expresses a
/// preference and defaults to the end of the parent's sibling list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDraft {
    pub id: PageId,
    pub title: String,
    pub slug: String,
    pub parent_id: Option<PageId>,
    pub position: Option<usize>,
    pub is_active: bool,
    pub show_in_menu: bool,
}

impl PageDraft {
    #[must_use]
    pub fn new(id: impl Into<PageId>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: slug.into(),
            parent_id: None,
            position: None,
            is_active: true,
            show_in_menu: true,
        }
    }

    #[must_use]
    pub fn under(mut self, parent: impl Into<PageId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    #[must_use]
    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

/// Check that `slug` is a usable URL segment: lower-case ASCII letters,
/// digits, and inner hyphens.
pub fn validate_slug(slug: &str) -> Result<()> {
    let invalid = |message| {
        Err(TreeError::InvalidSlug {
            slug: slug.to_string(),
            message,
        })
    };
    if slug.is_empty() {
        return invalid("slug is empty");
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return invalid("slug cannot start or end with '-'");
    }
    if !slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return invalid("only lower-case letters, digits and '-' are allowed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_hierarchy_fields() {
        let page = Page::new("d", "Team", "team")
            .with_parent("a")
            .with_order(2);
        assert_eq!(page.parent_id, Some(PageId::new("a")));
        assert_eq!(page.order_index, 2);
        assert!(!page.is_root());
        assert!(page.is_active && page.show_in_menu);
    }

    #[test]
    fn slug_rules() {
        assert!(validate_slug("about-us").is_ok());
        assert!(validate_slug("2024").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("About").is_err());
        assert!(validate_slug("a/b").is_err());
        assert!(validate_slug("-lead").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn flags_default_to_true_when_missing() {
        let page: Page = serde_json::from_str(
            r#"{"id":"a","title":"A","slug":"a","parent_id":null,"order_index":0}"#,
        )
        .unwrap();
        assert!(page.is_active);
        assert!(page.show_in_menu);
        assert_eq!(page.id.as_str(), "a");
    }
}
