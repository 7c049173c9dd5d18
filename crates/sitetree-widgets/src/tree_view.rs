#![forbid(unsafe_code)]

//! Page-tree layout with interleaved drop targets.
//!
//! [`TreeLayout`] turns the flat [`PageStore`] into nested [`SiblingGroup`]s
//! and then into a flat list of [`LayoutRow`]s with screen areas for hit
//! testing. Each group is laid out as
//!
//! ```text
//! gap(0)
//! item 0
//!     <children of item 0, or an empty placeholder>
//! gap(1)
//! item 1
//!     ...
//! gap(n)
//! ```
//!
//! Layout starts at the root group, so pages caught in a parent cycle are
//! never reached.
//!
//! # Example
//!
//! ```
//! use sitetree_core::{Page, PageStore};
//! use sitetree_widgets::tree_view::{LayoutOptions, TreeLayout, TreeViewState};
//!
//! let store = PageStore::from_pages(vec![
//!     Page::new("a", "About", "about"),
//!     Page::new("t", "Team", "team").with_parent("a"),
//! ]).unwrap();
//! let layout = TreeLayout::new(&store, &TreeViewState::default(), LayoutOptions::default());
//! assert_eq!(layout.root().items().count(), 1);
//! ```

use ahash::AHashSet;
use sitetree_core::{Offset, Page, PageId, PageStore, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::drop_zone::DropTarget;

/// Guide character styles for tree rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeGuides {
    /// ASCII guides: `|`, `+--`, `` `-- ``.
    Ascii,
    /// Unicode box-drawing characters (default).
    #[default]
    Unicode,
    /// Rounded Unicode characters.
    Rounded,
}

impl TreeGuides {
    /// Vertical continuation (item has siblings below).
    #[must_use]
    pub const fn vertical(&self) -> &str {
        match self {
            Self::Ascii => "|   ",
            Self::Unicode | Self::Rounded => "\u{2502}   ",
        }
    }

    /// Branch guide (item has siblings below).
    #[must_use]
    pub const fn branch(&self) -> &str {
        match self {
            Self::Ascii => "+-- ",
            Self::Unicode | Self::Rounded => "\u{251C}\u{2500}\u{2500} ",
        }
    }

    /// Last-item guide (no siblings below).
    #[must_use]
    pub const fn last(&self) -> &str {
        match self {
            Self::Ascii => "`-- ",
            Self::Unicode => "\u{2514}\u{2500}\u{2500} ",
            Self::Rounded => "\u{2570}\u{2500}\u{2500} ",
        }
    }

    /// Empty indentation (no guide needed).
    #[must_use]
    pub const fn space(&self) -> &str {
        "    "
    }

    /// Marker drawn on gap rows while a drag is active.
    #[must_use]
    pub const fn gap(&self) -> &str {
        match self {
            Self::Ascii => "....",
            Self::Unicode | Self::Rounded => "\u{2504}\u{2504}\u{2504}\u{2504}",
        }
    }
}

/// Sizing of the laid-out rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Cells of indentation per depth level.
    pub indent: u16,
    /// Height of item and placeholder rows.
    pub row_height: u16,
    /// Height of gap rows; `0` makes gaps unhittable.
    pub gap_height: u16,
    /// Total available width.
    pub width: u16,
    /// Render an empty-children placeholder under leaf pages.
    pub placeholders: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            row_height: 1,
            gap_height: 1,
            width: 60,
            placeholders: true,
        }
    }
}

/// Per-view UI state that survives relayout.
#[derive(Debug, Clone, Default)]
pub struct TreeViewState {
    collapsed: AHashSet<PageId>,
}

impl TreeViewState {
    #[must_use]
    pub fn is_collapsed(&self, id: &PageId) -> bool {
        self.collapsed.contains(id)
    }

    pub fn set_collapsed(&mut self, id: PageId, collapsed: bool) {
        if collapsed {
            self.collapsed.insert(id);
        } else {
            self.collapsed.remove(&id);
        }
    }

    /// Toggle and return the new collapsed state.
    pub fn toggle(&mut self, id: &PageId) -> bool {
        if self.collapsed.remove(id) {
            false
        } else {
            self.collapsed.insert(id.clone());
            true
        }
    }

    /// Forget state for pages that no longer exist.
    pub fn retain_known(&mut self, store: &PageStore) {
        self.collapsed.retain(|id| store.contains(id));
    }
}

/// Drop slot between two siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropSlot {
    pub parent: Option<PageId>,
    pub index: usize,
    pub above: Option<PageId>,
}

/// A page inside its sibling group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemNode {
    pub page: PageId,
    pub title: String,
    pub is_active: bool,
    pub children: ChildView,
}

/// What is shown below an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildView {
    Group(SiblingGroup),
    /// Leaf page; rendered as a placeholder when placeholders are enabled.
    Empty,
    /// Children exist but are hidden.
    Collapsed { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupEntry {
    Gap(DropSlot),
    Item(ItemNode),
}

/// The pages sharing one parent, with a gap before, between, and after them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingGroup {
    pub parent: Option<PageId>,
    pub depth: usize,
    pub entries: Vec<GroupEntry>,
}

impl SiblingGroup {
    fn build(
        store: &PageStore,
        state: &TreeViewState,
        parent: Option<&PageId>,
        depth: usize,
    ) -> Self {
        let pages = store.children(parent);
        let mut entries = Vec::with_capacity(pages.len() * 2 + 1);
        entries.push(GroupEntry::Gap(DropSlot {
            parent: parent.cloned(),
            index: 0,
            above: None,
        }));
        for (index, page) in pages.iter().enumerate() {
            entries.push(GroupEntry::Item(ItemNode::build(store, state, page, depth)));
            entries.push(GroupEntry::Gap(DropSlot {
                parent: parent.cloned(),
                index: index + 1,
                above: Some(page.id.clone()),
            }));
        }
        Self {
            parent: parent.cloned(),
            depth,
            entries,
        }
    }

    /// Items of this group, in order.
    pub fn items(&self) -> impl Iterator<Item = &ItemNode> {
        self.entries.iter().filter_map(|entry| match entry {
            GroupEntry::Item(item) => Some(item),
            GroupEntry::Gap(_) => None,
        })
    }

    /// Gaps of this group, in order.
    pub fn gaps(&self) -> impl Iterator<Item = &DropSlot> {
        self.entries.iter().filter_map(|entry| match entry {
            GroupEntry::Gap(slot) => Some(slot),
            GroupEntry::Item(_) => None,
        })
    }
}

impl ItemNode {
    fn build(store: &PageStore, state: &TreeViewState, page: &Page, depth: usize) -> Self {
        let child_count = store.children(Some(&page.id)).len();
        let children = if child_count == 0 {
            ChildView::Empty
        } else if state.is_collapsed(&page.id) {
            ChildView::Collapsed { count: child_count }
        } else {
            ChildView::Group(SiblingGroup::build(store, state, Some(&page.id), depth + 1))
        };
        Self {
            page: page.id.clone(),
            title: page.title.clone(),
            is_active: page.is_active,
            children,
        }
    }
}

/// Kind of a laid-out row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Gap,
    Item,
    Placeholder,
}

/// One laid-out row with its hit area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRow {
    pub kind: RowKind,
    pub target: DropTarget,
    pub depth: usize,
    pub area: Rect,
    /// Guide prefix flags: for each ancestor level, whether that level's
    /// item was the last in its group.
    lineage: Vec<bool>,
    /// Whether this item is the last in its group (items only).
    is_last: bool,
    label: String,
}

impl LayoutRow {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A hit on a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub target: DropTarget,
    pub area: Rect,
    pub offset: Offset,
}

/// The full laid-out tree.
#[derive(Debug, Clone)]
pub struct TreeLayout {
    root: SiblingGroup,
    rows: Vec<LayoutRow>,
    options: LayoutOptions,
}

impl TreeLayout {
    #[must_use]
    pub fn new(store: &PageStore, state: &TreeViewState, options: LayoutOptions) -> Self {
        let root = SiblingGroup::build(store, state, None, 0);
        let mut builder = RowBuilder {
            options,
            y: 0,
            rows: Vec::new(),
            lineage: Vec::new(),
        };
        builder.group(&root);
        tracing::trace!(
            target: "sitetree.layout",
            pages = store.len(),
            rows = builder.rows.len(),
            "tree laid out"
        );
        Self {
            root,
            rows: builder.rows,
            options,
        }
    }

    #[must_use]
    pub fn root(&self) -> &SiblingGroup {
        &self.root
    }

    #[must_use]
    pub fn rows(&self) -> &[LayoutRow] {
        &self.rows
    }

    #[must_use]
    pub fn options(&self) -> LayoutOptions {
        self.options
    }

    /// Total height of the laid-out tree.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.rows.last().map_or(0, |row| row.area.bottom())
    }

    /// Area of a page's item row, if the page is visible.
    #[must_use]
    pub fn item_area(&self, page: &PageId) -> Option<Rect> {
        self.rows.iter().find_map(|row| match &row.target {
            DropTarget::Item { page: id } if id == page => Some(row.area),
            _ => None,
        })
    }

    /// Target under absolute cell `(x, y)`.
    #[must_use]
    pub fn hit_test(&self, x: u16, y: u16) -> Option<Hit> {
        self.rows.iter().find_map(|row| {
            row.area.offset_of(x, y).map(|offset| Hit {
                target: row.target.clone(),
                area: row.area,
                offset,
            })
        })
    }

    /// Render rows as text lines. Gap rows are drawn only when `show_gaps`
    /// is set (typically while dragging) and are blank otherwise.
    #[must_use]
    pub fn render_lines(&self, guides: TreeGuides, show_gaps: bool) -> Vec<String> {
        let width = usize::from(self.options.width);
        let mut lines = Vec::new();
        for row in &self.rows {
            if row.area.is_empty() {
                continue;
            }
            if row.kind == RowKind::Gap && !show_gaps {
                lines.extend((0..row.area.height).map(|_| String::new()));
                continue;
            }
            let mut line = String::new();
            for (level, last) in row.lineage.iter().enumerate() {
                let is_own_level = level + 1 == row.lineage.len() && row.kind == RowKind::Item;
                let guide = match (is_own_level, *last) {
                    (true, _) if row.is_last => guides.last(),
                    (true, _) => guides.branch(),
                    (false, true) => guides.space(),
                    (false, false) => guides.vertical(),
                };
                line.push_str(guide);
            }
            match row.kind {
                RowKind::Item | RowKind::Placeholder => line.push_str(&row.label),
                RowKind::Gap => line.push_str(guides.gap()),
            }
            lines.push(truncate_to_width(line.trim_end(), width));
            for _ in 1..row.area.height {
                lines.push(String::new());
            }
        }
        lines
    }
}

fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

struct RowBuilder {
    options: LayoutOptions,
    y: u16,
    rows: Vec<LayoutRow>,
    lineage: Vec<bool>,
}

impl RowBuilder {
    fn push(
        &mut self,
        kind: RowKind,
        target: DropTarget,
        depth: usize,
        is_last: bool,
        label: String,
    ) {
        let height = match kind {
            RowKind::Gap => self.options.gap_height,
            RowKind::Item | RowKind::Placeholder => self.options.row_height,
        };
        let depth_cells = u16::try_from(depth).unwrap_or(u16::MAX);
        let x = self.options.indent.saturating_mul(depth_cells);
        let width = self.options.width.saturating_sub(x);
        self.rows.push(LayoutRow {
            kind,
            target,
            depth,
            area: Rect::new(x, self.y, width, height),
            lineage: self.lineage.clone(),
            is_last,
            label,
        });
        self.y = self.y.saturating_add(height);
    }

    fn group(&mut self, group: &SiblingGroup) {
        let item_count = group.items().count();
        let mut seen = 0;
        for entry in &group.entries {
            match entry {
                GroupEntry::Gap(slot) => {
                    let target = DropTarget::Gap {
                        parent: slot.parent.clone(),
                        index: slot.index,
                        above: slot.above.clone(),
                    };
                    let trailing = seen == item_count;
                    self.lineage.push(trailing);
                    self.push(RowKind::Gap, target, group.depth, false, String::new());
                    self.lineage.pop();
                }
                GroupEntry::Item(item) => {
                    seen += 1;
                    let is_last = seen == item_count;
                    self.lineage.push(is_last);
                    self.push(
                        RowKind::Item,
                        DropTarget::Item {
                            page: item.page.clone(),
                        },
                        group.depth,
                        is_last,
                        item_label(item),
                    );
                    self.children(item);
                    self.lineage.pop();
                }
            }
        }
    }

    fn children(&mut self, item: &ItemNode) {
        match &item.children {
            ChildView::Group(group) => self.group(group),
            ChildView::Empty if self.options.placeholders => {
                let depth = self.lineage.len();
                self.push(
                    RowKind::Placeholder,
                    DropTarget::EmptyChildren {
                        page: item.page.clone(),
                    },
                    depth,
                    false,
                    "(no subpages)".to_string(),
                );
            }
            ChildView::Empty | ChildView::Collapsed { .. } => {}
        }
    }
}

fn item_label(item: &ItemNode) -> String {
    let marker = match item.children {
        ChildView::Group(_) => "\u{25BE} ",
        ChildView::Collapsed { .. } => "\u{25B8} ",
        ChildView::Empty => "",
    };
    let mut label = format!("{marker}{}", item.title);
    if let ChildView::Collapsed { count } = item.children {
        label.push_str(&format!(" (+{count})"));
    }
    if !item.is_active {
        label.push_str(" [inactive]");
    }
    label
}
