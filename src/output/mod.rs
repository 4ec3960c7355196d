use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::transcribe::TranscriptionResult;
use crate::utils::{format_timestamp, generate_unique_filename};

const RULE_WIDTH: usize = 80;

/// Render a result in the requested format
pub fn render(result: &TranscriptionResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_as_text(result)),
        OutputFormat::Json => format_as_json(result),
    }
}

/// Plain text, preceded by a metadata header when metadata is present
pub fn format_as_text(result: &TranscriptionResult) -> String {
    let mut lines = Vec::new();

    if let Some(metadata) = &result.metadata {
        let rule = "=".repeat(RULE_WIDTH);

        lines.push(rule.clone());
        lines.push(format!("Title: {}", metadata.title.as_deref().unwrap_or("Unknown")));
        lines.push(format!("Uploader: {}", metadata.uploader.as_deref().unwrap_or("Unknown")));
        if let Some(duration) = metadata.duration {
            lines.push(format!("Duration: {}", format_timestamp(duration)));
        }
        if !metadata.chapters.is_empty() {
            lines.push("Chapters:".to_string());
            for chapter in &metadata.chapters {
                lines.push(format!("  {} {}", chapter.timestamp, chapter.title));
            }
        }
        lines.push(format!("URL: {}", result.video_id.watch_url()));
        lines.push(rule);
        lines.push(String::new());
    }

    lines.push(result.transcript.to_string());
    lines.join("\n")
}

/// Pretty-printed JSON of the whole result
pub fn format_as_json(result: &TranscriptionResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize transcription result")
}

/// Save transcription result to file
pub async fn save_to_file(result: &TranscriptionResult, path: &Path, format: OutputFormat) -> Result<()> {
    let content = render(result, format)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }

    fs_err::write(path, content)?;
    Ok(())
}

/// Print transcription result to console
pub fn print_to_console(result: &TranscriptionResult, format: OutputFormat) -> Result<()> {
    let content = render(result, format)?;
    println!("{}", content);
    Ok(())
}

/// File path in `dir` named after the video title, or the video id without one
pub fn auto_output_path(dir: &Path, result: &TranscriptionResult, format: OutputFormat) -> PathBuf {
    let base_name = result.title().unwrap_or(result.video_id.as_str());
    generate_unique_filename(dir, base_name, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Chapter, VideoMetadata};
    use crate::resolver::VideoId;
    use crate::transcript::reflow::reflow_text;
    use crate::transcript::ReflowOptions;
    use tempfile::TempDir;

    fn result(metadata: Option<VideoMetadata>) -> TranscriptionResult {
        TranscriptionResult {
            video_id: VideoId::parse("dQw4w9WgXcQ").unwrap(),
            language_code: "en".to_string(),
            language: "English".to_string(),
            is_generated: true,
            transcript: reflow_text("first part. second part.", &ReflowOptions::default()),
            metadata,
            extracted_at: chrono::Utc::now(),
        }
    }

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            title: Some("Rick: The Video".to_string()),
            uploader: Some("Rick Astley".to_string()),
            upload_date: None,
            duration: Some(3725),
            chapters: vec![Chapter {
                title: "Intro".to_string(),
                start_time: 0,
                end_time: None,
                timestamp: "00:00".to_string(),
            }],
        }
    }

    #[test]
    fn test_text_without_metadata_is_bare_transcript() {
        assert_eq!(format_as_text(&result(None)), "First part. Second part.");
    }

    #[test]
    fn test_text_header() {
        let text = format_as_text(&result(Some(metadata())));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "=".repeat(80));
        assert_eq!(lines[1], "Title: Rick: The Video");
        assert_eq!(lines[2], "Uploader: Rick Astley");
        assert_eq!(lines[3], "Duration: 01:02:05");
        assert_eq!(lines[4], "Chapters:");
        assert_eq!(lines[5], "  00:00 Intro");
        assert_eq!(lines[6], "URL: https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(lines[7], "=".repeat(80));
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "First part. Second part.");
    }

    #[test]
    fn test_json_fields() {
        let json = format_as_json(&result(Some(metadata()))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["video_id"], "dQw4w9WgXcQ");
        assert_eq!(value["is_generated"], true);
        assert_eq!(value["metadata"]["duration"], 3725);
        assert_eq!(value["metadata"]["chapters"][0]["title"], "Intro");
    }

    #[tokio::test]
    async fn test_save_and_auto_name() {
        let dir = TempDir::new().unwrap();

        let with_title = result(Some(metadata()));
        let path = auto_output_path(dir.path(), &with_title, OutputFormat::Text);
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Rick-The-Video_"));

        save_to_file(&with_title, &path, OutputFormat::Text).await.unwrap();
        let saved = fs_err::read_to_string(&path).unwrap();
        assert!(saved.ends_with("First part. Second part."));

        let untitled = auto_output_path(dir.path(), &result(None), OutputFormat::Json);
        let name = untitled.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("dQw4w9WgXcQ_"));
        assert!(name.ends_with(".json"));
    }
}
