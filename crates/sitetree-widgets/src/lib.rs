#![forbid(unsafe_code)]

//! Tree layout and drag-and-drop geometry for the sitetree editor.
//!
//! [`tree_view::TreeLayout`] lays a page store out as rows with gap, item,
//! and placeholder drop targets; [`drop_zone::DropClassifier`] decides what a
//! release over one of those targets means.

pub mod drop_zone;
pub mod tree_view;

pub use drop_zone::{
    DEFAULT_CHILD_THRESHOLD, DragSession, DropClassifier, DropResolution, DropTarget, Placement,
};
pub use tree_view::{LayoutOptions, LayoutRow, RowKind, TreeGuides, TreeLayout, TreeViewState};
