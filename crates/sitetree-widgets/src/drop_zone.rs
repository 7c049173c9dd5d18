#![forbid(unsafe_code)]

//! Drop-zone geometry classification.
//!
//! A drag ends over one of three kinds of [`DropTarget`]: a gap between
//! siblings, an item row, or the empty-children placeholder of a leaf page.
//! [`DropClassifier::classify`] turns the hovered target plus the pointer's
//! offset into a [`Placement`]:
//!
//! ```text
//!   gap row   |<-- 33% of dragged width -->|
//!             |   sibling insert here      |  child of page above  ...
//!             0                        threshold
//! ```
//!
//! - Placeholder of `P`: always first child of `P`.
//! - Item row of `P`: first child of `P`.
//! - Gap: pointer x at or below the threshold inserts as a sibling at the
//!   gap's index; past the threshold nests under the sibling directly above
//!   the gap. A leading gap has nothing above it and stays a sibling insert.
//!
//! Classification is a pure function of the captured drag size, the pointer
//! offset, and the target metadata.

use sitetree_core::{Offset, PageId, Size};

use crate::tree_view::TreeLayout;

/// Fraction of the dragged item's width that separates "insert between"
/// from "nest under".
pub const DEFAULT_CHILD_THRESHOLD: f32 = 0.33;

/// A rendered target region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Insertion point `index` in the group under `parent`.
    Gap {
        parent: Option<PageId>,
        index: usize,
        /// The sibling rendered directly above the gap.
        above: Option<PageId>,
    },
    /// The row of `page` itself.
    Item { page: PageId },
    /// Placeholder rendered under an expanded page without children.
    EmptyChildren { page: PageId },
}

/// Where a drop puts the dragged page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Insert at gap `index` of the group under `parent`.
    Sibling {
        parent: Option<PageId>,
        index: usize,
    },
    /// Insert as the first child of `parent`.
    Child { parent: PageId },
}

impl Placement {
    #[must_use]
    pub fn parent(&self) -> Option<&PageId> {
        match self {
            Self::Sibling { parent, .. } => parent.as_ref(),
            Self::Child { parent } => Some(parent),
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Sibling { index, .. } => *index,
            Self::Child { .. } => 0,
        }
    }
}

/// Threshold-based sibling/child classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropClassifier {
    child_threshold: f32,
}

impl Default for DropClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHILD_THRESHOLD)
    }
}

impl DropClassifier {
    /// Create a classifier; the ratio is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(child_threshold: f32) -> Self {
        let child_threshold = if child_threshold.is_finite() {
            child_threshold.clamp(0.0, 1.0)
        } else {
            DEFAULT_CHILD_THRESHOLD
        };
        Self { child_threshold }
    }

    #[must_use]
    pub fn child_threshold(&self) -> f32 {
        self.child_threshold
    }

    /// Horizontal threshold in cells for a dragged item of `dragged` size.
    #[must_use]
    pub fn threshold_for(&self, dragged: Size) -> f32 {
        f32::from(dragged.width) * self.child_threshold
    }

    #[must_use]
    pub fn classify(&self, dragged: Size, pointer: Offset, target: &DropTarget) -> Placement {
        match target {
            DropTarget::EmptyChildren { page } | DropTarget::Item { page } => Placement::Child {
                parent: page.clone(),
            },
            DropTarget::Gap {
                parent,
                index,
                above,
            } => {
                let nests = f32::from(pointer.x) > self.threshold_for(dragged);
                match above {
                    Some(above) if nests => Placement::Child {
                        parent: above.clone(),
                    },
                    _ => Placement::Sibling {
                        parent: parent.clone(),
                        index: *index,
                    },
                }
            }
        }
    }
}

/// A drag in progress: the dragged page and its size sampled at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    page: PageId,
    size: Size,
}

/// The outcome of releasing a drag over the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropResolution {
    pub page: PageId,
    pub target: DropTarget,
    pub pointer: Offset,
    pub placement: Placement,
}

impl DragSession {
    #[must_use]
    pub fn new(page: PageId, size: Size) -> Self {
        Self { page, size }
    }

    /// Start dragging `page`, sampling its row size from `layout`.
    #[must_use]
    pub fn begin(layout: &TreeLayout, page: &PageId) -> Option<Self> {
        let area = layout.item_area(page)?;
        tracing::debug!(
            target: "sitetree.drag",
            page = %page,
            width = area.width,
            height = area.height,
            "drag started"
        );
        Some(Self::new(page.clone(), area.size()))
    }

    #[must_use]
    pub fn page(&self) -> &PageId {
        &self.page
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Classify a release at absolute cell `(x, y)`. `None` when the pointer
    /// is over no target.
    #[must_use]
    pub fn resolve(
        &self,
        layout: &TreeLayout,
        classifier: &DropClassifier,
        x: u16,
        y: u16,
    ) -> Option<DropResolution> {
        let hit = layout.hit_test(x, y)?;
        let placement = classifier.classify(self.size, hit.offset, &hit.target);
        tracing::debug!(
            target: "sitetree.drag",
            page = %self.page,
            target = ?hit.target,
            offset_x = hit.offset.x,
            placement = ?placement,
            "drop classified"
        );
        Some(DropResolution {
            page: self.page.clone(),
            target: hit.target,
            pointer: hit.offset,
            placement,
        })
    }
}
