// Orchestrator with fallback logic
//
// Strategy:
// 1. Look up the chain registered for the operation
// 2. Try backends strictly in order, one at a time
// 3. Stop at the first success; later backends are never touched
// 4. If every backend fails (or the caller cancels), return all failures

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::diagnostics::{FailureReporter, TracingReporter};
use super::envelope::{AggregatedFailure, ResultEnvelope};
use super::errors::{ConfigError, RegistryError};
use super::executor::{AttemptExecutor, AttemptFailure};
use super::operation::{Operation, OperationName};
use super::registry::{BackendChain, BackendName, BackendRegistry};
use super::traits::{Capability, Probe};

/// Outcome of probing one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub backend: BackendName,
    pub failure: Option<AttemptFailure>,
}

impl ProbeReport {
    pub fn is_available(&self) -> bool {
        self.failure.is_none()
    }
}

/// Fallback orchestrator over a shared, read-only registry.
///
/// Holds no per-call state, so one orchestrator can serve any number of
/// concurrent calls.
pub struct Orchestrator {
    registry: Arc<BackendRegistry>,
    executor: AttemptExecutor,
    reporter: Arc<dyn FailureReporter>,
}

impl Orchestrator {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self {
            registry,
            executor: AttemptExecutor::new(),
            reporter: Arc::new(TracingReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Run `operation` against its backends until one succeeds.
    ///
    /// `Err` is reserved for configuration faults (unknown operation,
    /// capability mismatch); backend failures always come back inside the
    /// envelope.
    pub async fn invoke<C: Capability>(
        &self,
        operation: &Operation<C>,
        args: &C::Args,
        cancel: &CancellationToken,
    ) -> Result<ResultEnvelope<C::Output>, RegistryError> {
        let chain = self.registry.lookup(operation.name())?;

        if chain.family() != C::FAMILY {
            return Err(ConfigError::CapabilityMismatch {
                operation: operation.name().to_string(),
                registered: chain.family(),
                requested: C::FAMILY,
            }
            .into());
        }

        if chain.is_empty() {
            return Err(ConfigError::EmptyChain(operation.name().to_string()).into());
        }

        Ok(self.run_chain::<C>(&chain, args, cancel).await)
    }

    async fn run_chain<C: Capability>(
        &self,
        chain: &BackendChain,
        args: &C::Args,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<C::Output> {
        let operation = chain.operation();
        let mut failures = Vec::with_capacity(chain.len());

        for (index, backend) in chain.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(operation = %operation, backend = %backend.name(), "cancelled before attempt");
                failures.push(AttemptFailure::cancelled_before_start(backend.name(), operation));
                break;
            }

            debug!(
                operation = %operation,
                backend = %backend.name(),
                attempt = index + 1,
                of = chain.len(),
                "trying backend"
            );

            match self.executor.run::<C>(backend, operation, args, cancel).await {
                Ok(value) => return ResultEnvelope::success(value),
                Err(failure) => {
                    failures.push(failure);
                    if cancel.is_cancelled() {
                        break;
                    }
                }
            }
        }

        let aggregated = AggregatedFailure::new(operation.clone(), failures);
        self.reporter.report(&aggregated);
        ResultEnvelope::failure(aggregated)
    }

    /// Probe every distinct backend once, in registry order.
    ///
    /// A failed probe does not stop the others; cancellation marks the
    /// remaining backends as cancelled without touching them.
    pub async fn probe_backends(&self, cancel: &CancellationToken) -> Vec<ProbeReport> {
        let label = probe_operation();
        let mut reports = Vec::new();

        for backend in self.registry.backends() {
            let failure = if cancel.is_cancelled() {
                Some(AttemptFailure::cancelled_before_start(backend.name(), &label))
            } else {
                self.executor
                    .run::<Probe>(&backend, &label, &(), cancel)
                    .await
                    .err()
            };

            reports.push(ProbeReport {
                backend: backend.name().clone(),
                failure,
            });
        }

        reports
    }
}

fn probe_operation() -> OperationName {
    OperationName::from_static("probe")
}
