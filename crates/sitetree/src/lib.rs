#![forbid(unsafe_code)]

//! sitetree public facade crate.
//!
//! Re-exports the page model, the tree layout and drop classification, and
//! (with the default `runtime` feature) the optimistic editor, behind one
//! dependency and a prelude.
//!
//! ```
//! use sitetree::prelude::*;
//!
//! let mut store = PageStore::from_pages(vec![
//!     Page::new("a", "A", "a").with_order(0),
//!     Page::new("b", "B", "b").with_order(1),
//! ])
//! .unwrap();
//! let plan = plan_move(&store, &PageId::new("a"), None, 2).unwrap().unwrap();
//! plan.apply(&mut store).unwrap();
//! assert_eq!(store.get(&PageId::new("a")).unwrap().order_index, 1);
//! ```

use thiserror::Error;

// --- Core re-exports -------------------------------------------------------

pub use sitetree_core::{
    DeleteReport, DeleteStrategy, InvalidMoveReason, MenuEntry, MovePlan, OrderUpdate, Page,
    PageDraft, PageId, PageStore, TreeError, plan_move, reorder, reparent,
};
pub use sitetree_core::{Offset, Rect, Size};

// --- Widget re-exports -----------------------------------------------------

pub use sitetree_widgets::{
    DragSession, DropClassifier, DropResolution, DropTarget, LayoutOptions, Placement, TreeGuides,
    TreeLayout, TreeViewState,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use sitetree_runtime::{
    Cmd, Dispatcher, EditorConfig, EditorError, EditorMsg, EditorPhase, GatewayError,
    JsonFileBackend, MemoryBackend, Model, MoveOutcome, MoveRequest, PageRepository,
    PersistRequest, PersistenceGateway, RepositoryOp, Ticket, TreeEditor,
};

// --- Errors ---------------------------------------------------------------

/// Any error a sitetree API can return.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[cfg(feature = "runtime")]
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[cfg(feature = "runtime")]
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[cfg(feature = "runtime")]
    #[error(transparent)]
    Config(#[from] sitetree_runtime::ConfigError),
}

/// Standard result type for sitetree APIs.
pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{
        DropClassifier, Error, Page, PageDraft, PageId, PageStore, Placement, Result, TreeError,
        TreeLayout, plan_move,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{Cmd, Dispatcher, EditorConfig, EditorMsg, MemoryBackend, Model, TreeEditor};

    pub use crate::{core, widgets};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use sitetree_core as core;
#[cfg(feature = "runtime")]
pub use sitetree_runtime as runtime;
pub use sitetree_widgets as widgets;

#[cfg(all(test, feature = "runtime"))]
mod tests {
    use super::prelude::*;

    #[test]
    fn prelude_drives_an_editor() {
        let backend = MemoryBackend::from_pages(vec![
            Page::new("a", "A", "a").with_order(0),
            Page::new("b", "B", "b").with_order(1),
        ])
        .unwrap();
        let mut dispatcher = Dispatcher::new(backend);
        let mut editor = TreeEditor::empty(EditorConfig::default());
        dispatcher.start(&mut editor);
        dispatcher.run(
            &mut editor,
            EditorMsg::Drop {
                page: PageId::new("b"),
                placement: Placement::Sibling {
                    parent: None,
                    index: 0,
                },
            },
        );
        let b = editor.store().get(&PageId::new("b")).unwrap();
        assert_eq!(b.order_index, 0);
        assert_eq!(dispatcher.backend().store(), editor.store());
    }

    #[test]
    fn errors_convert_into_facade_error() {
        let err: Error = TreeError::UnknownPage(PageId::new("x")).into();
        assert!(matches!(err, Error::Tree(_)));
    }
}
