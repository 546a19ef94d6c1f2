// Scripted backends and reporters shared by the unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

use super::diagnostics::FailureReporter;
use super::envelope::AggregatedFailure;
use super::errors::BackendError;
use super::models::{
    AnalysisReport, AnalyzeRequest, DownloadRequest, DownloadedFile, MediaBuffer, MetadataRequest,
    SearchHit, SearchRequest, StreamRequest, VideoInfo,
};
use super::traits::{BackendResult, ToolkitBackend};

#[derive(Debug, Clone)]
enum Script {
    Succeed,
    Fail(BackendError),
    Hang,
}

/// Backend that answers every capability the same scripted way.
///
/// Successful metadata uses the backend name as the video id, so tests can
/// tell which backend won.
#[derive(Debug)]
pub(crate) struct StubBackend {
    name: &'static str,
    script: Script,
    calls: AtomicUsize,
    probes: AtomicUsize,
}

impl StubBackend {
    fn scripted(name: &'static str, script: Script) -> Self {
        Self {
            name,
            script,
            calls: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn succeeding(name: &'static str) -> Self {
        Self::scripted(name, Script::Succeed)
    }

    pub(crate) fn failing(name: &'static str, error: BackendError) -> Self {
        Self::scripted(name, Script::Fail(error))
    }

    pub(crate) fn hanging(name: &'static str) -> Self {
        Self::scripted(name, Script::Hang)
    }

    /// Capability calls so far, probes excluded
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    async fn answer<T>(&self, value: impl FnOnce() -> T) -> BackendResult<T> {
        match &self.script {
            Script::Succeed => Ok(value()),
            Script::Fail(error) => Err(error.clone()),
            Script::Hang => std::future::pending().await,
        }
    }

    async fn call<T>(&self, value: impl FnOnce() -> T) -> BackendResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer(value).await
    }
}

#[async_trait]
impl ToolkitBackend for StubBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn resolve_metadata(
        &self,
        _request: &MetadataRequest,
        _cancel: &CancellationToken,
    ) -> BackendResult<VideoInfo> {
        self.call(|| VideoInfo::new(self.name, format!("served by {}", self.name)))
            .await
    }

    async fn download_to_path(
        &self,
        request: &DownloadRequest,
        _cancel: &CancellationToken,
    ) -> BackendResult<DownloadedFile> {
        self.call(|| DownloadedFile {
            path: request.output_dir.join(format!("{}.bin", self.name)),
            bytes: Some(1024),
        })
        .await
    }

    async fn stream_to_buffer(
        &self,
        _request: &StreamRequest,
        _cancel: &CancellationToken,
    ) -> BackendResult<MediaBuffer> {
        self.call(|| MediaBuffer {
            data: self.name.as_bytes().to_vec(),
            mime_type: Some("audio/mp4".to_string()),
        })
        .await
    }

    async fn search(
        &self,
        request: &SearchRequest,
        _cancel: &CancellationToken,
    ) -> BackendResult<Vec<SearchHit>> {
        self.call(|| {
            vec![SearchHit {
                video_id: self.name.to_string(),
                title: request.query.clone(),
                channel: None,
                url: format!("https://www.youtube.com/watch?v={}", self.name),
            }]
        })
        .await
    }

    async fn analyze(
        &self,
        request: &AnalyzeRequest,
        _cancel: &CancellationToken,
    ) -> BackendResult<AnalysisReport> {
        self.call(|| AnalysisReport {
            kind: request.kind,
            entries: vec![serde_json::json!({ "backend": self.name })],
        })
        .await
    }

    async fn probe(&self, _cancel: &CancellationToken) -> BackendResult<()> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.answer(|| ()).await
    }
}

/// Counts the aggregated failures handed to it
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    reports: AtomicUsize,
}

impl RecordingReporter {
    pub(crate) fn reports(&self) -> usize {
        self.reports.load(Ordering::SeqCst)
    }
}

impl FailureReporter for RecordingReporter {
    fn report(&self, _failures: &AggregatedFailure) {
        self.reports.fetch_add(1, Ordering::SeqCst);
    }
}
