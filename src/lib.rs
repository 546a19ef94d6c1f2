// YouTube toolkit core
//
// Every toolkit operation (metadata, downloads, search, analysis) is served
// by a chain of interchangeable backends. See `fallback` for the machinery.

pub mod fallback;

pub use fallback::models;
pub use fallback::operation;
pub use fallback::{
    AggregatedFailure, AttemptFailure, BackendError, BackendHandle, BackendRegistry, ErrorKind,
    FallbackConfig, Operation, Orchestrator, Position, ResultEnvelope, ToolkitBackend,
};
