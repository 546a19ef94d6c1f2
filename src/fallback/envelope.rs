// Result envelope - the one shape every orchestrated call returns

use serde::Serialize;
use std::fmt;

use super::errors::{ErrorKind, InvalidStateError};
use super::executor::AttemptFailure;
use super::operation::OperationName;
use super::registry::BackendName;

/// Every attempt of one failed call, in attempt order.
///
/// Only the orchestrator builds these, and only after at least one attempt,
/// so the list is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedFailure {
    operation: OperationName,
    attempts: Vec<AttemptFailure>,
}

impl AggregatedFailure {
    pub(crate) fn new(operation: OperationName, attempts: Vec<AttemptFailure>) -> Self {
        debug_assert!(!attempts.is_empty(), "aggregated failure without attempts");
        Self {
            operation,
            attempts,
        }
    }

    pub fn operation(&self) -> &OperationName {
        &self.operation
    }

    pub fn attempts(&self) -> &[AttemptFailure] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttemptFailure> {
        self.attempts.iter()
    }

    pub fn last(&self) -> Option<&AttemptFailure> {
        self.attempts.last()
    }

    /// Backend names in attempt order
    pub fn backend_names(&self) -> Vec<&BackendName> {
        self.attempts.iter().map(AttemptFailure::backend).collect()
    }

    /// Whether the call ended because the caller cancelled it
    pub fn was_cancelled(&self) -> bool {
        self.last().is_some_and(|a| a.kind() == ErrorKind::Cancelled)
    }
}

impl fmt::Display for AggregatedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.was_cancelled() {
            write!(
                f,
                "operation '{}' was cancelled after {} attempt(s)",
                self.operation,
                self.attempts.len()
            )?;
        } else {
            write!(
                f,
                "all {} backend(s) failed for operation '{}'",
                self.attempts.len(),
                self.operation
            )?;
        }

        for attempt in &self.attempts {
            write!(
                f,
                "; {} ({}): {}",
                attempt.backend(),
                attempt.kind(),
                attempt.message()
            )?;
        }

        Ok(())
    }
}

impl std::error::Error for AggregatedFailure {}

impl<'a> IntoIterator for &'a AggregatedFailure {
    type Item = &'a AttemptFailure;
    type IntoIter = std::slice::Iter<'a, AttemptFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome<T> {
    Success(T),
    Failure(AggregatedFailure),
}

/// Success value or aggregated failure, never both, never neither
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ResultEnvelope<T> {
    outcome: Outcome<T>,
}

impl<T> ResultEnvelope<T> {
    pub(crate) fn success(value: T) -> Self {
        Self {
            outcome: Outcome::Success(value),
        }
    }

    pub(crate) fn failure(failures: AggregatedFailure) -> Self {
        Self {
            outcome: Outcome::Failure(failures),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn value(&self) -> Result<&T, InvalidStateError> {
        match &self.outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(_) => Err(InvalidStateError {
                requested: "value",
                actual: "failure",
            }),
        }
    }

    pub fn failures(&self) -> Result<&AggregatedFailure, InvalidStateError> {
        match &self.outcome {
            Outcome::Failure(failures) => Ok(failures),
            Outcome::Success(_) => Err(InvalidStateError {
                requested: "failure",
                actual: "value",
            }),
        }
    }

    pub fn into_result(self) -> Result<T, AggregatedFailure> {
        match self.outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(failures) => Err(failures),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultEnvelope<U> {
        match self.outcome {
            Outcome::Success(value) => ResultEnvelope::success(f(value)),
            Outcome::Failure(failures) => ResultEnvelope::failure(failures),
        }
    }
}
