#![forbid(unsafe_code)]

//! Elm-style model and command types.
//!
//! A [`Model`] reacts to messages in [`Model::update`] and returns a [`Cmd`]
//! describing side effects. The model never performs I/O itself; the host
//! (see [`Dispatcher`](crate::dispatcher::Dispatcher)) executes commands and
//! feeds results back as messages.
//!
//! # Example
//!
//! ```
//! use sitetree_runtime::program::{Cmd, Model};
//!
//! struct Counter(i32);
//!
//! impl Model for Counter {
//!     type Message = i32;
//!
//!     fn update(&mut self, delta: i32) -> Cmd<i32> {
//!         self.0 += delta;
//!         Cmd::none()
//!     }
//!
//!     fn view(&self) -> Vec<String> {
//!         vec![self.0.to_string()]
//!     }
//! }
//! ```

use std::fmt;

use crate::gateway::{PersistRequest, RepositoryOp};

/// Identifies one in-flight persistence call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Application state and behavior.
pub trait Model: Sized {
    type Message;

    /// Startup commands, typically the initial load.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state as text lines.
    fn view(&self) -> Vec<String>;
}

/// Side effects requested by a model.
#[derive(Debug)]
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Execute multiple commands.
    Batch(Vec<Cmd<M>>),
    /// Send a message back to the model.
    Msg(M),
    /// Send `request` to the persistence gateway; the answer comes back
    /// tagged with `ticket`.
    Persist {
        ticket: Ticket,
        request: PersistRequest,
    },
    /// Reload the page table from the repository.
    Refetch,
    /// Run an edit against the repository.
    Repository(RepositoryOp),
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a batch of commands.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|cmd| !cmd.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Number of leaf commands, batches flattened.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Batch(cmds) => cmds.iter().map(Self::count).sum(),
            _ => 1,
        }
    }

    /// The ticket of a `Persist` command.
    #[must_use]
    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            Self::Persist { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }

    /// Flatten nested batches into leaf commands.
    #[must_use]
    pub fn into_leaves(self) -> Vec<Self> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(cmds) => cmds.into_iter().flat_map(Self::into_leaves).collect(),
            other => vec![other],
        }
    }
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}
