//! Core domain types and traits for the Shipwright build runner.
//!
//! This crate contains:
//! - Job, pipe and project records
//! - The error taxonomy
//! - Event payloads published while jobs run
//! - Collaborator traits: process executor, job store, event sink

pub mod error;
pub mod event;
pub mod executor;
pub mod id;
pub mod job;
pub mod project;
pub mod store;

pub use error::{Error, Result};
pub use event::JobEvent;
pub use executor::{ExecStream, OutputChunk, ProcessExecutor, StreamKind};
pub use id::Id;
pub use job::{Job, JobStatus, Pipe};
pub use project::{Project, Repo, RunStep, Variable};
pub use store::{EventSink, JobStore};
