#![forbid(unsafe_code)]

//! The page-tree editor model.
//!
//! [`TreeEditor`] owns the live [`PageStore`] the view renders from. Moves
//! are optimistic:
//!
//! ```text
//!              drop resolved            Persisted(Ok)
//!   Idle ───────────────────▶ Mutating ───────────────▶ Confirmed ─▶ Idle
//!                               │
//!                               │       Persisted(Err)
//!                               └──────────────────────▶ RolledBack ─▶ Idle
//! ```
//!
//! A resolved drop snapshots the store, applies the [`MovePlan`] at once and
//! returns [`Cmd::Persist`]. The snapshot is kept under the move's
//! [`Ticket`] until the answer arrives. A failure restores that snapshot,
//! even when later moves were confirmed in between; those are lost with it.
//!
//! Moves that fail their precondition (unknown page, target inside the
//! dragged subtree) never touch the store and produce no command. No-op
//! drops produce nothing at all.

use sitetree_core::{MovePlan, Page, PageId, PageStore, TreeError, plan_move};
use sitetree_widgets::{DragSession, Placement, TreeGuides, TreeLayout, TreeViewState};

use crate::config::EditorConfig;
use crate::error::{EditorError, GatewayError};
use crate::gateway::{PersistRequest, RepositoryOp};
use crate::program::{Cmd, Model, Ticket};

/// Messages understood by [`TreeEditor`].
#[derive(Debug)]
pub enum EditorMsg {
    /// The page table was (re)loaded.
    Refetched(Result<Vec<Page>, GatewayError>),
    /// Pointer went down on a page row.
    DragStart { page: PageId },
    DragCancel,
    /// Pointer released at absolute cell `(x, y)`.
    Release { x: u16, y: u16 },
    /// Move `page` to an already classified placement.
    Drop { page: PageId, placement: Placement },
    /// Answer to the `Persist` command issued under `ticket`.
    Persisted {
        ticket: Ticket,
        result: Result<(), GatewayError>,
    },
    ToggleCollapsed(PageId),
    /// Run a repository edit; the editor refetches once it succeeds.
    Edit(RepositoryOp),
    /// Answer to a `Repository` command.
    Edited(Result<(), GatewayError>),
}

/// Whether moves are waiting for the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Idle,
    Mutating { in_flight: usize },
}

/// How the most recently answered move ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Confirmed { ticket: Ticket, page: PageId },
    RolledBack { ticket: Ticket, page: PageId },
}

#[derive(Debug)]
struct InFlight {
    ticket: Ticket,
    page: PageId,
    snapshot: PageStore,
}

/// Elm-style model of the page-tree editor.
#[derive(Debug)]
pub struct TreeEditor {
    store: PageStore,
    view: TreeViewState,
    config: EditorConfig,
    drag: Option<DragSession>,
    in_flight: Vec<InFlight>,
    next_ticket: Ticket,
    last_error: Option<EditorError>,
    last_outcome: Option<MoveOutcome>,
}

impl TreeEditor {
    #[must_use]
    pub fn new(store: PageStore, config: EditorConfig) -> Self {
        Self {
            store,
            view: TreeViewState::default(),
            config,
            drag: None,
            in_flight: Vec::new(),
            next_ticket: Ticket::new(1),
            last_error: None,
            last_outcome: None,
        }
    }

    /// An editor with no pages; [`Model::init`] asks for the first load.
    #[must_use]
    pub fn empty(config: EditorConfig) -> Self {
        Self::new(PageStore::new(), config)
    }

    #[must_use]
    pub fn store(&self) -> &PageStore {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn view_state(&self) -> &TreeViewState {
        &self.view
    }

    #[must_use]
    pub fn phase(&self) -> EditorPhase {
        match self.in_flight.len() {
            0 => EditorPhase::Idle,
            in_flight => EditorPhase::Mutating { in_flight },
        }
    }

    /// Tickets still waiting for an answer, oldest first.
    #[must_use]
    pub fn pending_tickets(&self) -> Vec<Ticket> {
        self.in_flight.iter().map(|flight| flight.ticket).collect()
    }

    #[must_use]
    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// The most recent refused or rolled-back operation.
    #[must_use]
    pub fn last_error(&self) -> Option<&EditorError> {
        self.last_error.as_ref()
    }

    /// Take the recorded error, leaving none behind.
    pub fn take_error(&mut self) -> Option<EditorError> {
        self.last_error.take()
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<&MoveOutcome> {
        self.last_outcome.as_ref()
    }

    /// Lay out the current store.
    #[must_use]
    pub fn layout(&self) -> TreeLayout {
        TreeLayout::new(&self.store, &self.view, self.config.layout_options())
    }

    fn allocate_ticket(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket = ticket.next();
        ticket
    }

    fn reject(&mut self, err: TreeError) -> Cmd<EditorMsg> {
        tracing::warn!(target: "sitetree.editor", error = %err, "operation rejected");
        self.last_error = Some(EditorError::Rejected(err));
        Cmd::none()
    }

    fn start_drag(&mut self, page: PageId) -> Cmd<EditorMsg> {
        if !self.store.contains(&page) {
            return self.reject(TreeError::UnknownPage(page));
        }
        self.drag = DragSession::begin(&self.layout(), &page);
        if self.drag.is_none() {
            tracing::debug!(target: "sitetree.editor", page = %page, "drag on hidden page ignored");
        }
        Cmd::none()
    }

    fn release(&mut self, x: u16, y: u16) -> Cmd<EditorMsg> {
        let Some(drag) = self.drag.take() else {
            return Cmd::none();
        };
        let layout = self.layout();
        match drag.resolve(&layout, &self.config.classifier(), x, y) {
            Some(resolution) => self.apply_move(resolution.page, resolution.placement),
            None => {
                tracing::debug!(
                    target: "sitetree.editor",
                    page = %drag.page(),
                    x,
                    y,
                    "released outside any drop target"
                );
                Cmd::none()
            }
        }
    }

    fn apply_move(&mut self, page: PageId, placement: Placement) -> Cmd<EditorMsg> {
        let span = tracing::debug_span!(
            target: "sitetree.editor",
            "editor.move",
            page = %page,
            parent = ?placement.parent(),
            index = placement.index(),
            ticket = tracing::field::Empty,
        );
        let _guard = span.enter();

        let plan = match plan_move(&self.store, &page, placement.parent(), placement.index()) {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                tracing::debug!(target: "sitetree.editor", "drop leaves the tree unchanged");
                return Cmd::none();
            }
            Err(err) => return self.reject(err),
        };

        let snapshot = self.store.clone();
        if let Err(err) = plan.apply(&mut self.store) {
            self.store = snapshot;
            return self.reject(err);
        }

        let ticket = self.allocate_ticket();
        span.record("ticket", ticket.get());
        log_plan(&plan);
        self.in_flight.push(InFlight {
            ticket,
            page,
            snapshot,
        });
        Cmd::Persist {
            ticket,
            request: PersistRequest::from_plan(&plan),
        }
    }

    fn persisted(&mut self, ticket: Ticket, result: Result<(), GatewayError>) -> Cmd<EditorMsg> {
        let Some(pos) = self.in_flight.iter().position(|f| f.ticket == ticket) else {
            tracing::warn!(target: "sitetree.editor", %ticket, "answer for unknown ticket dropped");
            return Cmd::none();
        };
        let flight = self.in_flight.remove(pos);
        match result {
            Ok(()) => {
                tracing::info!(
                    target: "sitetree.editor",
                    %ticket,
                    page = %flight.page,
                    "move confirmed"
                );
                self.last_outcome = Some(MoveOutcome::Confirmed {
                    ticket,
                    page: flight.page,
                });
            }
            Err(err) => {
                tracing::warn!(
                    target: "sitetree.editor",
                    %ticket,
                    page = %flight.page,
                    error = %err,
                    "move rolled back"
                );
                self.store = flight.snapshot;
                self.last_error = Some(EditorError::Persist(err));
                self.last_outcome = Some(MoveOutcome::RolledBack {
                    ticket,
                    page: flight.page,
                });
            }
        }
        Cmd::none()
    }

    fn refetched(&mut self, result: Result<Vec<Page>, GatewayError>) -> Cmd<EditorMsg> {
        let pages = match result {
            Ok(pages) => pages,
            Err(err) => {
                tracing::warn!(target: "sitetree.editor", error = %err, "page listing failed");
                self.last_error = Some(EditorError::Persist(err));
                return Cmd::none();
            }
        };
        match PageStore::from_pages(pages) {
            Ok(store) => {
                tracing::debug!(target: "sitetree.editor", pages = store.len(), "pages loaded");
                let fault = store.validate().err();
                self.store = store;
                self.view.retain_known(&self.store);
                if let Some(err) = fault {
                    tracing::warn!(
                        target: "sitetree.editor",
                        error = %err,
                        integrity = err.is_integrity_fault(),
                        "loaded tree is inconsistent"
                    );
                    self.last_error = Some(EditorError::Rejected(err));
                }
                Cmd::none()
            }
            Err(err) => self.reject(err),
        }
    }
}

fn log_plan(plan: &MovePlan) {
    tracing::debug!(
        target: "sitetree.editor",
        from = ?plan.from_parent,
        to = ?plan.to_parent,
        order_index = plan.order_index,
        updates = plan.updates.len(),
        reparent = plan.is_reparent(),
        "optimistic move applied"
    );
}

impl Model for TreeEditor {
    type Message = EditorMsg;

    fn init(&mut self) -> Cmd<EditorMsg> {
        Cmd::Refetch
    }

    fn update(&mut self, msg: EditorMsg) -> Cmd<EditorMsg> {
        match msg {
            EditorMsg::Refetched(result) => self.refetched(result),
            EditorMsg::DragStart { page } => self.start_drag(page),
            EditorMsg::DragCancel => {
                self.drag = None;
                Cmd::none()
            }
            EditorMsg::Release { x, y } => self.release(x, y),
            EditorMsg::Drop { page, placement } => {
                self.drag = None;
                self.apply_move(page, placement)
            }
            EditorMsg::Persisted { ticket, result } => self.persisted(ticket, result),
            EditorMsg::ToggleCollapsed(page) => {
                self.view.toggle(&page);
                Cmd::none()
            }
            EditorMsg::Edit(op) => {
                tracing::info!(target: "sitetree.editor", op = ?op, "repository edit requested");
                Cmd::Repository(op)
            }
            EditorMsg::Edited(Ok(())) => Cmd::Refetch,
            EditorMsg::Edited(Err(err)) => {
                tracing::warn!(target: "sitetree.editor", error = %err, "repository edit failed");
                self.last_error = Some(EditorError::Persist(err));
                Cmd::none()
            }
        }
    }

    fn view(&self) -> Vec<String> {
        self.layout()
            .render_lines(TreeGuides::Unicode, self.drag.is_some())
    }
}
