//! The hosted model that watches the video.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GradeResult;

/// Processing state of an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Processing,
    Active,
    Failed,
    Unknown(String),
}

impl FileState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PROCESSING" => Self::Processing,
            "ACTIVE" => Self::Active,
            "FAILED" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => f.write_str("PROCESSING"),
            Self::Active => f.write_str("ACTIVE"),
            Self::Failed => f.write_str("FAILED"),
            Self::Unknown(raw) if raw.is_empty() => f.write_str("UNKNOWN"),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Reference to an uploaded asset that prompts can point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaHandle {
    pub name: String,
    pub uri: String,
    pub mime_type: String,
}

#[async_trait]
pub trait VideoModel: Send + Sync {
    /// Upload a local asset. The returned handle may still be processing.
    async fn upload(&self, path: &Path) -> GradeResult<MediaHandle>;

    async fn file_state(&self, handle: &MediaHandle) -> GradeResult<FileState>;

    /// Run `prompt` against the asset and return the raw model text.
    async fn generate(&self, model: &str, handle: &MediaHandle, prompt: &str)
        -> GradeResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_states() {
        assert_eq!(FileState::parse("ACTIVE"), FileState::Active);
        assert_eq!(FileState::parse("processing"), FileState::Processing);
        assert_eq!(FileState::parse(" FAILED "), FileState::Failed);
        assert_eq!(
            FileState::parse("STATE_UNSPECIFIED"),
            FileState::Unknown("STATE_UNSPECIFIED".to_string())
        );
        assert_eq!(FileState::parse("").to_string(), "UNKNOWN");
    }
}
