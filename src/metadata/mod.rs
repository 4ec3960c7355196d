use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;

pub mod chapters;

use crate::resolver::VideoId;

/// Descriptive information about a video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub uploader: Option<String>,

    /// Upload date as reported upstream (`YYYYMMDD`)
    pub upload_date: Option<String>,

    /// Duration in seconds
    pub duration: Option<u64>,

    pub chapters: Vec<Chapter>,
}

/// A titled section of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,

    /// Start time in seconds
    pub start_time: u64,

    /// End time in seconds; absent for a final chapter without explicit end
    pub end_time: Option<u64>,

    /// Human-readable start time
    pub timestamp: String,
}

impl VideoMetadata {
    /// Build metadata from a yt-dlp info JSON document
    ///
    /// Chapters come from the `chapters` array, falling back to timestamps
    /// listed in the description.
    pub fn from_info_json(info: &Value) -> Self {
        let text = |key: &str| info.get(key).and_then(Value::as_str).map(str::to_string);

        let mut chapters = chapters::parse_chapters(info);
        if chapters.is_empty() {
            if let Some(description) = info.get("description").and_then(Value::as_str) {
                chapters = chapters::parse_chapters_from_description(description);
            }
        }

        Self {
            title: text("title"),
            uploader: text("uploader").or_else(|| text("channel")),
            upload_date: text("upload_date"),
            duration: info
                .get("duration")
                .and_then(Value::as_f64)
                .map(|d| d.max(0.0) as u64),
            chapters,
        }
    }
}

/// Source of video metadata
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch(&self, id: &VideoId) -> Result<VideoMetadata>;
}

/// Metadata provider using yt-dlp
pub struct YtDlpMetadata {
    yt_dlp_path: String,
}

impl YtDlpMetadata {
    pub fn new(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
        }
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--skip-download", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.yt_dlp_path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str).context("yt-dlp returned invalid JSON")?;

        Ok(info)
    }
}

impl Default for YtDlpMetadata {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl MetadataProvider for YtDlpMetadata {
    async fn fetch(&self, id: &VideoId) -> Result<VideoMetadata> {
        let info = self.get_video_info(&id.watch_url()).await?;
        Ok(VideoMetadata::from_info_json(&info))
    }
}
