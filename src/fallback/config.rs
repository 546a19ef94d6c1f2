// Startup overrides for backend ordering

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::errors::ConfigError;

/// Overrides applied once to a registry with `BackendRegistry::apply_config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Backend moved to the front of the chain, keyed by operation name
    pub preferred: BTreeMap<String, String>,
    /// Backends removed from every chain
    pub disabled: Vec<String>,
}

impl FallbackConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }

    pub fn with_preferred(mut self, operation: impl Into<String>, backend: impl Into<String>) -> Self {
        self.preferred.insert(operation.into(), backend.into());
        self
    }

    pub fn with_disabled(mut self, backend: impl Into<String>) -> Self {
        self.disabled.push(backend.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::operation::{download_audio, download_video, get_video_info};
    use crate::fallback::registry::{BackendHandle, BackendRegistry};
    use crate::fallback::test_support::StubBackend;
    use std::sync::Arc;

    fn handle(name: &'static str) -> BackendHandle {
        BackendHandle::ready(Arc::new(StubBackend::succeeding(name))).unwrap()
    }

    fn toolkit_registry() -> BackendRegistry {
        let pytubefix = handle("pytubefix");
        let ytdlp = handle("yt-dlp");
        let mut registry = BackendRegistry::new();
        registry.push(&get_video_info(), pytubefix.clone()).unwrap();
        registry.push(&get_video_info(), ytdlp.clone()).unwrap();
        registry.push(&download_audio(), pytubefix.clone()).unwrap();
        registry.push(&download_audio(), ytdlp.clone()).unwrap();
        registry.push(&download_video(), ytdlp).unwrap();
        registry.push(&download_video(), pytubefix).unwrap();
        registry
    }

    fn names(registry: &BackendRegistry, operation: &crate::fallback::operation::OperationName) -> Vec<String> {
        let chain = registry.lookup(operation).unwrap();
        chain.names().iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parses_partial_json() {
        let config = FallbackConfig::from_json_str(r#"{"disabled": ["youtube_api"]}"#).unwrap();
        assert_eq!(config, FallbackConfig::default().with_disabled("youtube_api"));
    }

    #[test]
    fn test_rejects_bad_json() {
        let err = FallbackConfig::from_json_str("{\"disabled\": 3}").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn test_preferred_backend_moves_to_front() {
        let mut registry = toolkit_registry();
        let config = FallbackConfig::default().with_preferred("download_audio", "yt-dlp");
        registry.apply_config(&config).unwrap();

        assert_eq!(names(&registry, download_audio().name()), ["yt-dlp", "pytubefix"]);
        assert_eq!(names(&registry, get_video_info().name()), ["pytubefix", "yt-dlp"]);
    }

    #[test]
    fn test_disabled_backend_leaves_every_chain() {
        let mut registry = toolkit_registry();
        registry
            .apply_config(&FallbackConfig::default().with_disabled("pytubefix"))
            .unwrap();

        assert_eq!(names(&registry, get_video_info().name()), ["yt-dlp"]);
        assert_eq!(names(&registry, download_video().name()), ["yt-dlp"]);
    }

    #[test]
    fn test_disabling_a_sole_backend_is_rejected() {
        let mut registry = BackendRegistry::new();
        registry.push(&get_video_info(), handle("pytubefix")).unwrap();

        let err = registry
            .apply_config(&FallbackConfig::default().with_disabled("pytubefix"))
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyChain("get_video_info".to_string()));
    }

    #[test]
    fn test_unknown_preferred_backend_is_rejected() {
        let mut registry = toolkit_registry();
        let err = registry
            .apply_config(&FallbackConfig::default().with_preferred("get_video_info", "scrapetube"))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownBackend {
                operation: "get_video_info".to_string(),
                backend: "scrapetube".to_string(),
            }
        );
    }
}
