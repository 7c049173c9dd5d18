#![forbid(unsafe_code)]

//! Error type shared by the page store, resolvers, and ordering engines.

use thiserror::Error;

use crate::page::PageId;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unknown page: {0}")]
    UnknownPage(PageId),

    #[error("duplicate page id: {0}")]
    DuplicatePage(PageId),

    #[error("page {page} references missing parent {parent}")]
    DanglingParent { page: PageId, parent: PageId },

    #[error("parent chain of page {page} loops back through {repeated}")]
    CycleDetected { page: PageId, repeated: PageId },

    #[error("cannot move page {page} under {target}: {reason}")]
    InvalidMove {
        page: PageId,
        target: PageId,
        reason: InvalidMoveReason,
    },

    #[error("invalid slug {slug:?}: {message}")]
    InvalidSlug { slug: String, message: &'static str },

    #[error("sibling group under {parent} is not dense: expected index {expected}, found {found}")]
    BrokenOrdering {
        parent: ParentLabel,
        expected: usize,
        found: usize,
    },
}

/// Why a reparent was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMoveReason {
    /// The target parent is the dragged page itself.
    OwnPage,
    /// The target parent lies inside the dragged page's subtree.
    OwnDescendant,
}

impl std::fmt::Display for InvalidMoveReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OwnPage => f.write_str("a page cannot become its own parent"),
            Self::OwnDescendant => f.write_str("target is a descendant of the page"),
        }
    }
}

/// Display helper naming a sibling group by its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLabel(pub Option<PageId>);

impl std::fmt::Display for ParentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("<root>"),
        }
    }
}

impl TreeError {
    /// Data-integrity faults mean the store itself is corrupted, as opposed
    /// to a rejected operator request.
    #[must_use]
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            Self::DanglingParent { .. } | Self::CycleDetected { .. } | Self::BrokenOrdering { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_move_message_names_both_pages() {
        let err = TreeError::InvalidMove {
            page: PageId::new("a"),
            target: PageId::new("d"),
            reason: InvalidMoveReason::OwnDescendant,
        };
        assert_eq!(
            err.to_string(),
            "cannot move page a under d: target is a descendant of the page"
        );
        assert!(!err.is_integrity_fault());
    }

    #[test]
    fn broken_ordering_labels_root_group() {
        let err = TreeError::BrokenOrdering {
            parent: ParentLabel(None),
            expected: 1,
            found: 3,
        };
        assert!(err.to_string().contains("<root>"));
        assert!(err.is_integrity_fault());
    }
}
