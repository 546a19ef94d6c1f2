// Fallback core - registry, attempt executor and orchestrator
//
// Backends are registered per operation in priority order. The orchestrator
// tries them one at a time and returns a ResultEnvelope holding either the
// first success or every failure in attempt order.

pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod envelope;
pub mod errors;
pub mod executor;
pub mod models;
pub mod operation;
pub mod orchestrator;
pub mod registry;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::FallbackConfig;
pub use diagnostics::{render_report, FailureReporter, SilentReporter, TracingReporter};
pub use envelope::{AggregatedFailure, ResultEnvelope};
pub use errors::{
    BackendError, ConfigError, ErrorKind, InvalidStateError, RegistryError, UnknownOperationError,
};
pub use executor::{AttemptExecutor, AttemptFailure};
pub use operation::{Operation, OperationName};
pub use orchestrator::{Orchestrator, ProbeReport};
pub use registry::{BackendChain, BackendHandle, BackendName, BackendRegistry, Position};
pub use traits::{
    Analyze, BackendFuture, BackendResult, Capability, CapabilityFamily, DownloadToPath,
    ResolveMetadata, Search, StreamToBuffer, ToolkitBackend,
};
