#![forbid(unsafe_code)]

//! Persistence boundary.
//!
//! The editor never talks to storage directly. It emits
//! [`Cmd::Persist`](crate::program::Cmd::Persist) carrying a
//! [`PersistRequest`]; the host hands the request to a
//! [`PersistenceGateway`] and feeds the outcome back as a message.
//!
//! Each request is one logical operation: backends must apply all of its
//! updates or none of them.

use serde::{Deserialize, Serialize};
use sitetree_core::{
    DeleteReport, DeleteStrategy, MovePlan, OrderUpdate, Page, PageDraft, PageId, PageStore,
};

use crate::error::GatewayError;

/// Cross-parent move: the moved page's new coordinates plus the dense
/// assignment for the vacated and the target group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub page_id: PageId,
    pub new_parent_id: Option<PageId>,
    pub new_order_index: usize,
    pub updates: Vec<OrderUpdate>,
}

/// A batch the backend must apply atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PersistRequest {
    /// New positions within one parent group.
    Reorder { updates: Vec<OrderUpdate> },
    Move(MoveRequest),
}

impl PersistRequest {
    /// Build the request that persists `plan`.
    #[must_use]
    pub fn from_plan(plan: &MovePlan) -> Self {
        if plan.is_reparent() {
            Self::Move(MoveRequest {
                page_id: plan.page_id.clone(),
                new_parent_id: plan.to_parent.clone(),
                new_order_index: plan.order_index,
                updates: plan.updates.clone(),
            })
        } else {
            Self::Reorder {
                updates: plan.updates.clone(),
            }
        }
    }

    #[must_use]
    pub fn updates(&self) -> &[OrderUpdate] {
        match self {
            Self::Reorder { updates } => updates,
            Self::Move(request) => &request.updates,
        }
    }

    /// Apply the request to `store` as one unit. On error `store` is left
    /// untouched.
    pub fn apply_to(&self, store: &mut PageStore) -> Result<(), GatewayError> {
        let mut next = store.clone();
        if let Self::Move(request) = self {
            next.assign(
                &request.page_id,
                request.new_parent_id.clone(),
                request.new_order_index,
            )?;
        }
        for update in self.updates() {
            next.set_order(&update.page_id, update.order_index)?;
        }
        next.validate()?;
        *store = next;
        Ok(())
    }
}

/// Sends recomputed positions to the backing store.
pub trait PersistenceGateway {
    /// Persist new positions within one parent group.
    fn reorder(&mut self, updates: &[OrderUpdate]) -> Result<(), GatewayError>;

    /// Persist a cross-parent move.
    fn move_page(&mut self, request: &MoveRequest) -> Result<(), GatewayError>;

    fn persist(&mut self, request: &PersistRequest) -> Result<(), GatewayError> {
        match request {
            PersistRequest::Reorder { updates } => self.reorder(updates),
            PersistRequest::Move(request) => self.move_page(request),
        }
    }
}

/// Page edits that go through the backing store first; the editor refetches
/// after each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOp {
    Create(PageDraft),
    SetActive { page: PageId, active: bool },
    SetShowInMenu { page: PageId, show: bool },
    Delete {
        page: PageId,
        strategy: DeleteStrategy,
    },
}

/// Listing and plain edits of the page table.
pub trait PageRepository {
    fn list_pages(&mut self) -> Result<Vec<Page>, GatewayError>;

    fn create_page(&mut self, draft: PageDraft) -> Result<Page, GatewayError>;

    fn set_active(&mut self, page: &PageId, active: bool) -> Result<(), GatewayError>;

    fn set_show_in_menu(&mut self, page: &PageId, show: bool) -> Result<(), GatewayError>;

    fn delete_page(
        &mut self,
        page: &PageId,
        strategy: DeleteStrategy,
    ) -> Result<DeleteReport, GatewayError>;

    fn execute(&mut self, op: RepositoryOp) -> Result<(), GatewayError> {
        match op {
            RepositoryOp::Create(draft) => self.create_page(draft).map(|_| ()),
            RepositoryOp::SetActive { page, active } => self.set_active(&page, active),
            RepositoryOp::SetShowInMenu { page, show } => self.set_show_in_menu(&page, show),
            RepositoryOp::Delete { page, strategy } => {
                self.delete_page(&page, strategy).map(|_| ())
            }
        }
    }
}
