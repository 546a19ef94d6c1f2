// Attempt executor - runs one backend call and normalizes its outcome

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::errors::{BackendError, ErrorKind};
use super::operation::OperationName;
use super::registry::{BackendHandle, BackendName};
use super::traits::{BackendResult, Capability};

/// Structured record of one failed attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptFailure {
    backend: BackendName,
    operation: OperationName,
    kind: ErrorKind,
    message: String,
    elapsed: Duration,
}

impl AttemptFailure {
    pub fn new(
        backend: BackendName,
        operation: OperationName,
        kind: ErrorKind,
        message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            backend,
            operation,
            kind,
            message: message.into(),
            elapsed,
        }
    }

    /// Record for a backend that was never started because the caller cancelled
    pub(crate) fn cancelled_before_start(backend: &BackendName, operation: &OperationName) -> Self {
        Self::new(
            backend.clone(),
            operation.clone(),
            ErrorKind::Cancelled,
            "cancelled before the attempt started",
            Duration::ZERO,
        )
    }

    pub fn backend(&self) -> &BackendName {
        &self.backend
    }

    pub fn operation(&self) -> &OperationName {
        &self.operation
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Runs exactly one backend invocation.
///
/// Backend faults never leave this boundary as anything but an
/// [`AttemptFailure`]. No timeout is applied; the only way to stop a hung
/// backend is the caller's cancellation token.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttemptExecutor;

impl AttemptExecutor {
    pub fn new() -> Self {
        Self
    }

    pub async fn run<C: Capability>(
        &self,
        backend: &BackendHandle,
        operation: &OperationName,
        args: &C::Args,
        cancel: &CancellationToken,
    ) -> Result<C::Output, AttemptFailure> {
        let started = Instant::now();

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(BackendError::Cancelled),
            result = Self::call::<C>(backend, args, cancel) => result,
        };

        let elapsed = started.elapsed();

        match outcome {
            Ok(value) => {
                debug!(
                    operation = %operation,
                    backend = %backend.name(),
                    elapsed = ?elapsed,
                    "attempt succeeded"
                );
                Ok(value)
            }
            Err(err) => {
                // Only the caller's token makes an attempt Cancelled. A backend
                // that reports Cancelled on its own is just another failure.
                let kind = match (cancel.is_cancelled(), err.kind()) {
                    (true, _) => ErrorKind::Cancelled,
                    (false, ErrorKind::Cancelled) => ErrorKind::Unknown,
                    (false, kind) => kind,
                };
                debug!(
                    operation = %operation,
                    backend = %backend.name(),
                    elapsed = ?elapsed,
                    kind = %kind,
                    error = %err,
                    "attempt failed"
                );
                Err(AttemptFailure::new(
                    backend.name().clone(),
                    operation.clone(),
                    kind,
                    err.message(),
                    elapsed,
                ))
            }
        }
    }

    async fn call<C: Capability>(
        backend: &BackendHandle,
        args: &C::Args,
        cancel: &CancellationToken,
    ) -> BackendResult<C::Output> {
        let instance = backend.instance().await?;
        C::call(instance.as_ref(), args, cancel).await
    }
}
