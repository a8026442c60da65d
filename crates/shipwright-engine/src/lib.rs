//! Job scheduling and pipeline execution for Shipwright.
//!
//! One global queue admits a single job body at a time; the build engine
//! provisions the project's workspace and drives its pipeline through an
//! injected process executor, persisting the job record after every state
//! transition.

pub mod engine;
pub mod pipe;
pub mod queue;
pub mod vars;
pub mod workspace;

pub use engine::{BuildEngine, EngineConfig};
pub use pipe::PipeRunner;
pub use queue::SerialQueue;
