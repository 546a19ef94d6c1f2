// Operation identifiers and the standard operation catalogue

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

use super::errors::ConfigError;
use super::traits::{
    Analyze, Capability, CapabilityFamily, DownloadToPath, ResolveMetadata, Search, StreamToBuffer,
};

const MAX_NAME_LENGTH: usize = 64;

/// Validated operation identifier such as `get_video_info`.
///
/// Input is trimmed; only `[a-z0-9_]` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationName(String);

impl OperationName {
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ConfigError::EmptyOperationName);
        }

        let is_valid = trimmed.len() <= MAX_NAME_LENGTH
            && trimmed
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if !is_valid {
            return Err(ConfigError::InvalidOperationName(raw));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Only for compile-time names checked by the tests below
    pub(crate) fn from_static(name: &'static str) -> Self {
        Self(name.to_string())
    }
}

impl TryFrom<String> for OperationName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OperationName> for String {
    fn from(name: OperationName) -> Self {
        name.0
    }
}

impl AsRef<str> for OperationName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An operation name bound to the capability that serves it
pub struct Operation<C> {
    name: OperationName,
    _capability: PhantomData<fn() -> C>,
}

impl<C: Capability> Operation<C> {
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self::from_name(OperationName::new(name)?))
    }

    pub fn from_name(name: OperationName) -> Self {
        Self {
            name,
            _capability: PhantomData,
        }
    }

    pub fn name(&self) -> &OperationName {
        &self.name
    }

    pub fn family(&self) -> CapabilityFamily {
        C::FAMILY
    }
}

impl<C> Clone for Operation<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _capability: PhantomData,
        }
    }
}

impl<C: Capability> fmt::Debug for Operation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("family", &C::FAMILY)
            .finish()
    }
}

fn builtin<C: Capability>(name: &'static str) -> Operation<C> {
    Operation::from_name(OperationName::from_static(name))
}

pub fn get_video_info() -> Operation<ResolveMetadata> {
    builtin("get_video_info")
}

pub fn get_available_formats() -> Operation<ResolveMetadata> {
    builtin("get_available_formats")
}

pub fn download_audio() -> Operation<DownloadToPath> {
    builtin("download_audio")
}

pub fn download_video() -> Operation<DownloadToPath> {
    builtin("download_video")
}

pub fn download_captions() -> Operation<DownloadToPath> {
    builtin("download_captions")
}

pub fn stream_audio() -> Operation<StreamToBuffer> {
    builtin("stream_audio")
}

pub fn search_videos() -> Operation<Search> {
    builtin("search_videos")
}

pub fn get_comments() -> Operation<Analyze> {
    builtin("get_comments")
}

pub fn get_chapters() -> Operation<Analyze> {
    builtin("get_chapters")
}

pub fn get_heatmap() -> Operation<Analyze> {
    builtin("get_heatmap")
}
