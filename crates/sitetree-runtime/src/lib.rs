#![forbid(unsafe_code)]

//! Runtime: the editor model, its commands, and persistence backends.
//!
//! # Role in sitetree
//! `sitetree-runtime` turns drops into optimistic store mutations and
//! persistence commands, and reverts them when the backend refuses.
//!
//! # Primary responsibilities
//! - **TreeEditor**: Elm-style model with the optimistic move / rollback
//!   state machine ([`editor`]).
//! - **Cmd / Model**: side-effect descriptions ([`program`]).
//! - **Gateways**: [`PersistenceGateway`] and [`PageRepository`] traits with
//!   the in-memory and JSON-file backends ([`backend`]).
//! - **Dispatcher**: a host that executes commands now, later, or out of
//!   order ([`dispatcher`]).
//! - **EditorConfig**: thresholds and layout sizing, loadable from TOML or
//!   JSON with the `config` feature.

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod program;

pub use backend::{JsonFileBackend, MemoryBackend};
pub use config::{ConfigError, EditorConfig, LayoutPolicy};
pub use dispatcher::{Dispatcher, Pending};
pub use editor::{EditorMsg, EditorPhase, MoveOutcome, TreeEditor};
pub use error::{EditorError, GatewayError};
pub use gateway::{MoveRequest, PageRepository, PersistRequest, PersistenceGateway, RepositoryOp};
pub use program::{Cmd, Model, Ticket};
