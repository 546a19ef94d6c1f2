// Backend registry - ordered backend chains per operation
//
// Built once at startup, then shared read-only (usually behind an Arc)
// by every orchestrated call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::config::FallbackConfig;
use super::errors::{BackendError, ConfigError, UnknownOperationError};
use super::operation::{Operation, OperationName};
use super::traits::{BackendResult, Capability, CapabilityFamily, ToolkitBackend};

const MAX_NAME_LENGTH: usize = 64;

/// Validated backend name used in diagnostics (e.g. `yt-dlp`, `youtube_api`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackendName(String);

impl BackendName {
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBackendName);
        }

        let is_valid = trimmed.len() <= MAX_NAME_LENGTH
            && trimmed.chars().all(|c| {
                c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.')
            });

        if !is_valid {
            return Err(ConfigError::InvalidBackendName(raw));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BackendName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BackendName> for String {
    fn from(name: BackendName) -> Self {
        name.0
    }
}

impl AsRef<str> for BackendName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BackendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type BackendFactory = Box<dyn Fn() -> BackendResult<Arc<dyn ToolkitBackend>> + Send + Sync>;

struct LazyBackend {
    name: BackendName,
    factory: Option<BackendFactory>,
    instance: OnceCell<Arc<dyn ToolkitBackend>>,
}

/// Shared handle to one backend, constructed on first use.
///
/// Clones share the same instance, so a backend registered for several
/// operations is initialized once for all of them.
#[derive(Clone)]
pub struct BackendHandle(Arc<LazyBackend>);

impl BackendHandle {
    /// Wrap an already constructed backend
    pub fn ready(backend: Arc<dyn ToolkitBackend>) -> Result<Self, ConfigError> {
        Ok(Self(Arc::new(LazyBackend {
            name: BackendName::new(backend.name())?,
            factory: None,
            instance: OnceCell::new_with(Some(backend)),
        })))
    }

    /// Defer construction until the first attempt that needs the backend.
    ///
    /// A factory error becomes that attempt's failure and is not cached; the
    /// next call runs the factory again.
    pub fn lazy<F>(name: impl Into<String>, factory: F) -> Result<Self, ConfigError>
    where
        F: Fn() -> BackendResult<Arc<dyn ToolkitBackend>> + Send + Sync + 'static,
    {
        Ok(Self(Arc::new(LazyBackend {
            name: BackendName::new(name)?,
            factory: Some(Box::new(factory)),
            instance: OnceCell::new(),
        })))
    }

    pub fn name(&self) -> &BackendName {
        &self.0.name
    }

    pub fn is_initialized(&self) -> bool {
        self.0.instance.initialized()
    }

    pub(crate) async fn instance(&self) -> BackendResult<Arc<dyn ToolkitBackend>> {
        let lazy = &self.0;
        lazy.instance
            .get_or_try_init(|| async {
                match &lazy.factory {
                    Some(factory) => factory(),
                    None => Err(BackendError::Other(format!(
                        "backend {} has no instance",
                        lazy.name
                    ))),
                }
            })
            .await
            .cloned()
    }

    fn same_backend(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("name", &self.0.name)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Where `register` inserts a backend in an operation's chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    First,
    #[default]
    Last,
    /// 0-based rank; must not exceed the current chain length
    Rank(usize),
}

/// Read-only snapshot of one operation's backends, in attempt order
#[derive(Debug, Clone)]
pub struct BackendChain {
    operation: OperationName,
    family: CapabilityFamily,
    backends: Arc<[BackendHandle]>,
}

impl BackendChain {
    pub fn operation(&self) -> &OperationName {
        &self.operation
    }

    pub fn family(&self) -> CapabilityFamily {
        self.family
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendHandle> {
        self.backends.iter()
    }

    pub fn names(&self) -> Vec<&BackendName> {
        self.iter().map(BackendHandle::name).collect()
    }
}

impl PartialEq for BackendChain {
    fn eq(&self, other: &Self) -> bool {
        self.operation == other.operation
            && self.family == other.family
            && self.backends.len() == other.backends.len()
            && self
                .backends
                .iter()
                .zip(other.backends.iter())
                .all(|(a, b)| a.same_backend(b))
    }
}

#[derive(Clone)]
struct ChainEntry {
    family: CapabilityFamily,
    backends: Vec<BackendHandle>,
}

/// Ordered backend chains keyed by operation
#[derive(Default)]
pub struct BackendRegistry {
    chains: BTreeMap<OperationName, ChainEntry>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `backend` into the chain for `operation` at `position`
    pub fn register<C: Capability>(
        &mut self,
        operation: &Operation<C>,
        backend: BackendHandle,
        position: Position,
    ) -> Result<(), ConfigError> {
        let name = operation.name();

        if let Some(entry) = self.chains.get(name) {
            if entry.family != C::FAMILY {
                return Err(ConfigError::CapabilityMismatch {
                    operation: name.to_string(),
                    registered: entry.family,
                    requested: C::FAMILY,
                });
            }
            if entry.backends.iter().any(|b| b.name() == backend.name()) {
                return Err(ConfigError::DuplicateBackend {
                    operation: name.to_string(),
                    backend: backend.name().to_string(),
                });
            }
        }

        let len = self.chains.get(name).map_or(0, |e| e.backends.len());
        let index = match position {
            Position::First => 0,
            Position::Last => len,
            Position::Rank(rank) if rank <= len => rank,
            Position::Rank(rank) => {
                return Err(ConfigError::PositionOutOfRange {
                    operation: name.to_string(),
                    position: rank,
                    len,
                })
            }
        };

        self.chains
            .entry(name.clone())
            .or_insert_with(|| ChainEntry {
                family: C::FAMILY,
                backends: Vec::new(),
            })
            .backends
            .insert(index, backend);

        Ok(())
    }

    /// Append `backend` to the chain (the common case)
    pub fn push<C: Capability>(
        &mut self,
        operation: &Operation<C>,
        backend: BackendHandle,
    ) -> Result<(), ConfigError> {
        self.register(operation, backend, Position::Last)
    }

    pub fn lookup(&self, operation: &OperationName) -> Result<BackendChain, UnknownOperationError> {
        let entry = self
            .chains
            .get(operation)
            .ok_or_else(|| UnknownOperationError(operation.to_string()))?;

        Ok(BackendChain {
            operation: operation.clone(),
            family: entry.family,
            backends: Arc::from(entry.backends.as_slice()),
        })
    }

    /// Registered operations, sorted by name
    pub fn operations(&self) -> Vec<&OperationName> {
        self.chains.keys().collect()
    }

    /// Every distinct backend, walking chains in operation-name order
    pub fn backends(&self) -> Vec<BackendHandle> {
        let mut seen: Vec<BackendHandle> = Vec::new();
        for entry in self.chains.values() {
            for backend in &entry.backends {
                if !seen.iter().any(|b| b.same_backend(backend)) {
                    seen.push(backend.clone());
                }
            }
        }
        seen
    }

    /// Apply startup overrides: disables first, then preferences.
    ///
    /// All or nothing: on error the registry is left exactly as it was.
    pub fn apply_config(&mut self, config: &FallbackConfig) -> Result<(), ConfigError> {
        let mut chains = self.chains.clone();

        for disabled in &config.disabled {
            let disabled = BackendName::new(disabled.as_str())?;
            for (operation, entry) in chains.iter_mut() {
                entry.backends.retain(|b| b.name() != &disabled);
                if entry.backends.is_empty() {
                    return Err(ConfigError::EmptyChain(operation.to_string()));
                }
            }
        }

        for (operation, backend) in &config.preferred {
            let operation = OperationName::new(operation.as_str())?;
            let backend = BackendName::new(backend.as_str())?;
            let entry = chains
                .get_mut(&operation)
                .ok_or_else(|| ConfigError::UnknownOperation(operation.to_string()))?;
            let index = entry
                .backends
                .iter()
                .position(|b| b.name() == &backend)
                .ok_or_else(|| ConfigError::UnknownBackend {
                    operation: operation.to_string(),
                    backend: backend.to_string(),
                })?;
            let preferred = entry.backends.remove(index);
            entry.backends.insert(0, preferred);
        }

        self.chains = chains;
        Ok(())
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (operation, entry) in &self.chains {
            let names: Vec<&str> = entry.backends.iter().map(|b| b.name().as_str()).collect();
            map.entry(&operation.as_str(), &names);
        }
        map.finish()
    }
}
