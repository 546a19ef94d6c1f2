// Argument and result records passed between callers and backends

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of search results, as in the toolkit's search API
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Video metadata as produced by any metadata backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub uploader: String,
    pub duration_seconds: u64,
    pub thumbnail: Option<String>,
    pub webpage_url: String,
    pub formats: Vec<MediaFormat>,
}

impl VideoInfo {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            webpage_url: format!("https://www.youtube.com/watch?v={}", id),
            id,
            title: title.into(),
            uploader: "Unknown".to_string(),
            duration_seconds: 0,
            thumbnail: None,
            formats: Vec::new(),
        }
    }
}

/// One downloadable stream of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFormat {
    /// Format ID (e.g., "137", "140")
    pub format_id: String,
    /// File extension (mp4, webm, m4a)
    pub ext: String,
    /// Video height in pixels
    pub height: Option<u32>,
    /// Video codec (avc1, vp9, av01, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    pub acodec: Option<String>,
    /// File size in bytes
    pub filesize: Option<u64>,
    /// Approximate file size (when exact is unknown)
    pub filesize_approx: Option<u64>,
}

impl MediaFormat {
    /// Get effective file size (exact or approximate)
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    /// Whether this stream carries audio but no video
    pub fn is_audio_only(&self) -> bool {
        let has = |codec: &Option<String>| codec.as_deref().is_some_and(|c| c != "none");
        has(&self.acodec) && !has(&self.vcodec)
    }
}

/// What a download or stream should produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaKind {
    Audio {
        /// Container/codec (wav, mp3, m4a)
        format: String,
        /// Target bitrate (best, 320k, 128k, ...)
        bitrate: String,
    },
    Video {
        /// Quality selector (best, 1080p, 720p, ...)
        quality: String,
    },
    Captions {
        language: String,
    },
}

impl MediaKind {
    pub fn audio() -> Self {
        Self::Audio {
            format: "wav".to_string(),
            bitrate: "128k".to_string(),
        }
    }

    pub fn video() -> Self {
        Self::Video {
            quality: "best".to_string(),
        }
    }

    pub fn captions() -> Self {
        Self::Captions {
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRequest {
    pub url: String,
}

impl MetadataRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    /// Directory the backend writes into; the file name is the backend's choice
    pub output_dir: PathBuf,
    pub media: MediaKind,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>, media: MediaKind) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.into(),
            media,
        }
    }
}

/// Result of a successful download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRequest {
    pub url: String,
    pub media: MediaKind,
}

impl StreamRequest {
    pub fn new(url: impl Into<String>, media: MediaKind) -> Self {
        Self {
            url: url.into(),
            media,
        }
    }
}

/// In-memory media produced by a streaming backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBuffer {
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub video_id: String,
    pub title: String,
    pub channel: Option<String>,
    pub url: String,
}

/// Kind of derived data an analysis backend computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Comments,
    Chapters,
    Heatmap,
    CaptionAnalytics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
    pub kind: AnalysisKind,
    /// Upper bound on returned entries, backend default when unset
    pub max_items: Option<usize>,
}

impl AnalyzeRequest {
    pub fn new(url: impl Into<String>, kind: AnalysisKind) -> Self {
        Self {
            url: url.into(),
            kind,
            max_items: None,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

/// Backend-specific analysis entries; the core never inspects them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub kind: AnalysisKind,
    pub entries: Vec<serde_json::Value>,
}
