#![forbid(unsafe_code)]

//! Core: page records, the flat page store, and the ordering engines.
//!
//! # Role in sitetree
//! `sitetree-core` owns the data model. Everything the editor shows or
//! mutates is a [`Page`] in a [`PageStore`]; the hierarchy is derived from
//! `parent_id` on demand.
//!
//! # Primary responsibilities
//! - **PageStore**: flat, id-indexed page table with sibling queries,
//!   create/toggle/delete, and invariant validation.
//! - **Path resolution**: bounded parent-chain walks ([`path::route`]).
//! - **Descendants**: transitive children ([`descendants::descendants`]).
//! - **Ordering**: reorder and reparent engines producing [`MovePlan`]s.
//!
//! # How it fits in the system
//! `sitetree-widgets` lays the store out as nested sibling groups with drop
//! targets; `sitetree-runtime` applies [`MovePlan`]s optimistically and
//! persists them.

pub mod descendants;
pub mod error;
pub mod geometry;
pub mod ordering;
pub mod page;
pub mod path;
pub mod store;

pub use error::{InvalidMoveReason, Result, TreeError};
pub use geometry::{Offset, Rect, Size};
pub use ordering::{MovePlan, OrderUpdate, plan_move, reorder, reparent};
pub use page::{Page, PageDraft, PageId};
pub use store::{DeleteReport, DeleteStrategy, MenuEntry, PageStore};
