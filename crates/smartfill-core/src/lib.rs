//! # SmartFill Core
//!
//! The form autofill engine: field discovery, select-option matching,
//! fill execution with undo snapshots, cross-frame orchestration and the
//! service that ties them to a value resolver and the state store.
//!
//! ## Layers
//!
//! - [`dom`], [`locator`], [`scanner`], [`matcher`], [`executor`] - work on
//!   one frame's document
//! - [`agent`] - answers frame requests against a document
//! - [`orchestrator`] - fans requests out over a [`FrameChannel`](smartfill_protocols::FrameChannel)
//! - [`undo`], [`history`] - persisted bookkeeping
//! - [`autofill`] - the end-to-end service

pub mod agent;
pub mod autofill;
pub mod dom;
pub mod error;
pub mod executor;
pub mod history;
pub mod local_page;
pub mod locator;
pub mod matcher;
pub mod orchestrator;
pub mod scanner;
pub mod undo;
pub mod validator;

pub use agent::FrameAgent;
pub use autofill::{
    resolve_values, Autofill, FillOutcome, FillPreview, PrepareOutcome, PreviewEntry,
    DEFAULT_FRAME_TIMEOUT,
};
pub use dom::{Document, Mutation, PageCapture, SerializedNode};
pub use error::AutofillError;
pub use executor::FillExecutor;
pub use history::HistoryStore;
pub use local_page::{FrameBehavior, LocalPage};
pub use orchestrator::{FillReport, FrameOrchestrator, PageScan};
pub use undo::UndoManager;
pub use validator::extract_values;
