//! # tally
//!
//! A grading assistant for an instructor's class: it sends the photographed
//! test, the rubric, the submission rows and the participation rosters to an
//! LLM, then validates, orders and exports the report that comes back.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Environment-driven configuration
pub mod config;
/// The grading engine boundary and its OpenAI-compatible adapter
pub mod engine;
/// Request-level errors and row-level warnings
pub mod error;
/// Prompt assets embedded in the binary
pub mod prompts;
/// Report data model, validation, ordering and export
pub mod report;
/// Multimodal request assembly
pub mod request;
/// A single grading run
pub mod session;
/// Published spreadsheet helpers
pub mod sheet;
/// Immutable application state and its reducer
pub mod state;
/// Cancellable status ticker
pub mod status;

pub use engine::{GradingEngine, OpenAiEngine};
pub use error::{EngineError, RowWarning};
pub use report::{GradingReport, GradingResult};
pub use request::ClassInput;
