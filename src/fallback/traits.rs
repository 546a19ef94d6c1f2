// Capability interface - what every backend implements

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use super::errors::BackendError;
use super::models::{
    AnalysisReport, AnalyzeRequest, DownloadRequest, DownloadedFile, MediaBuffer, MetadataRequest,
    SearchHit, SearchRequest, StreamRequest, VideoInfo,
};

pub type BackendResult<T> = Result<T, BackendError>;

/// Boxed future returned by a capability call
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = BackendResult<T>> + Send + 'a>>;

/// Trait for backend implementations.
///
/// A backend serves its own operations or fails; it never falls back to
/// another backend itself. Capabilities it does not have keep the default
/// body, which reports `NotSupported`.
#[async_trait]
pub trait ToolkitBackend: Send + Sync {
    /// Name of the backend (for diagnostics)
    fn name(&self) -> &'static str;

    /// Resolve video metadata and formats
    async fn resolve_metadata(
        &self,
        _request: &MetadataRequest,
        _cancel: &CancellationToken,
    ) -> BackendResult<VideoInfo> {
        Err(BackendError::NotSupported(format!(
            "{} cannot resolve metadata",
            self.name()
        )))
    }

    /// Download media into `request.output_dir`
    async fn download_to_path(
        &self,
        _request: &DownloadRequest,
        _cancel: &CancellationToken,
    ) -> BackendResult<DownloadedFile> {
        Err(BackendError::NotSupported(format!(
            "{} cannot download",
            self.name()
        )))
    }

    /// Produce media bytes in memory
    async fn stream_to_buffer(
        &self,
        _request: &StreamRequest,
        _cancel: &CancellationToken,
    ) -> BackendResult<MediaBuffer> {
        Err(BackendError::NotSupported(format!(
            "{} cannot stream",
            self.name()
        )))
    }

    async fn search(
        &self,
        _request: &SearchRequest,
        _cancel: &CancellationToken,
    ) -> BackendResult<Vec<SearchHit>> {
        Err(BackendError::NotSupported(format!(
            "{} cannot search",
            self.name()
        )))
    }

    /// Comments, chapters, heatmaps and other derived data
    async fn analyze(
        &self,
        _request: &AnalyzeRequest,
        _cancel: &CancellationToken,
    ) -> BackendResult<AnalysisReport> {
        Err(BackendError::NotSupported(format!(
            "{} cannot analyze",
            self.name()
        )))
    }

    /// Cheap availability check (tool installed, key present, ...)
    async fn probe(&self, _cancel: &CancellationToken) -> BackendResult<()> {
        Ok(())
    }
}

/// Capability family an operation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityFamily {
    ResolveMetadata,
    DownloadToPath,
    StreamToBuffer,
    Search,
    Analyze,
    /// Backend health check; used by probing, never registered
    Probe,
}

impl CapabilityFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolveMetadata => "resolve_metadata",
            Self::DownloadToPath => "download_to_path",
            Self::StreamToBuffer => "stream_to_buffer",
            Self::Search => "search",
            Self::Analyze => "analyze",
            Self::Probe => "probe",
        }
    }
}

impl fmt::Display for CapabilityFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed binding between a capability family and its backend method
pub trait Capability: Send + Sync + 'static {
    type Args: Send + Sync;
    type Output: Send;

    const FAMILY: CapabilityFamily;

    fn call<'a>(
        backend: &'a dyn ToolkitBackend,
        args: &'a Self::Args,
        cancel: &'a CancellationToken,
    ) -> BackendFuture<'a, Self::Output>;
}

pub struct ResolveMetadata;
pub struct DownloadToPath;
pub struct StreamToBuffer;
pub struct Search;
pub struct Analyze;
pub(crate) struct Probe;

impl Capability for ResolveMetadata {
    type Args = MetadataRequest;
    type Output = VideoInfo;
    const FAMILY: CapabilityFamily = CapabilityFamily::ResolveMetadata;

    fn call<'a>(
        backend: &'a dyn ToolkitBackend,
        args: &'a MetadataRequest,
        cancel: &'a CancellationToken,
    ) -> BackendFuture<'a, VideoInfo> {
        backend.resolve_metadata(args, cancel)
    }
}

impl Capability for DownloadToPath {
    type Args = DownloadRequest;
    type Output = DownloadedFile;
    const FAMILY: CapabilityFamily = CapabilityFamily::DownloadToPath;

    fn call<'a>(
        backend: &'a dyn ToolkitBackend,
        args: &'a DownloadRequest,
        cancel: &'a CancellationToken,
    ) -> BackendFuture<'a, DownloadedFile> {
        backend.download_to_path(args, cancel)
    }
}

impl Capability for StreamToBuffer {
    type Args = StreamRequest;
    type Output = MediaBuffer;
    const FAMILY: CapabilityFamily = CapabilityFamily::StreamToBuffer;

    fn call<'a>(
        backend: &'a dyn ToolkitBackend,
        args: &'a StreamRequest,
        cancel: &'a CancellationToken,
    ) -> BackendFuture<'a, MediaBuffer> {
        backend.stream_to_buffer(args, cancel)
    }
}

impl Capability for Search {
    type Args = SearchRequest;
    type Output = Vec<SearchHit>;
    const FAMILY: CapabilityFamily = CapabilityFamily::Search;

    fn call<'a>(
        backend: &'a dyn ToolkitBackend,
        args: &'a SearchRequest,
        cancel: &'a CancellationToken,
    ) -> BackendFuture<'a, Vec<SearchHit>> {
        backend.search(args, cancel)
    }
}

impl Capability for Analyze {
    type Args = AnalyzeRequest;
    type Output = AnalysisReport;
    const FAMILY: CapabilityFamily = CapabilityFamily::Analyze;

    fn call<'a>(
        backend: &'a dyn ToolkitBackend,
        args: &'a AnalyzeRequest,
        cancel: &'a CancellationToken,
    ) -> BackendFuture<'a, AnalysisReport> {
        backend.analyze(args, cancel)
    }
}

impl Capability for Probe {
    type Args = ();
    type Output = ();
    const FAMILY: CapabilityFamily = CapabilityFamily::Probe;

    fn call<'a>(
        backend: &'a dyn ToolkitBackend,
        _args: &'a (),
        cancel: &'a CancellationToken,
    ) -> BackendFuture<'a, ()> {
        backend.probe(cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SearchOnly;

    #[async_trait]
    impl ToolkitBackend for SearchOnly {
        fn name(&self) -> &'static str {
            "search-only"
        }

        async fn search(
            &self,
            request: &SearchRequest,
            _cancel: &CancellationToken,
        ) -> BackendResult<Vec<SearchHit>> {
            Ok(vec![SearchHit {
                video_id: "abc123".to_string(),
                title: request.query.clone(),
                channel: None,
                url: "https://www.youtube.com/watch?v=abc123".to_string(),
            }])
        }
    }

    #[tokio::test]
    async fn test_capability_dispatches_to_matching_method() {
        let cancel = CancellationToken::new();
        let hits = Search::call(&SearchOnly, &SearchRequest::new("lofi"), &cancel)
            .await
            .unwrap();
        assert_eq!(hits[0].title, "lofi");
    }

    #[tokio::test]
    async fn test_missing_capability_is_not_supported() {
        let cancel = CancellationToken::new();
        let err = ResolveMetadata::call(&SearchOnly, &MetadataRequest::new("x"), &cancel)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::NotSupported("search-only cannot resolve metadata".to_string())
        );
    }

    #[tokio::test]
    async fn test_default_probe_succeeds() {
        let cancel = CancellationToken::new();
        assert!(Probe::call(&SearchOnly, &(), &cancel).await.is_ok());
    }
}
