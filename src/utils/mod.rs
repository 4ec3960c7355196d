use std::path::{Path, PathBuf};

const MAX_FILENAME_STEM: usize = 100;

/// Format seconds as `MM:SS`, or `HH:MM:SS` from one hour up
pub fn format_timestamp(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Parse `M:SS`, `MM:SS` or `H:MM:SS` into seconds
pub fn parse_timestamp(timestamp: &str) -> Option<u64> {
    let parts = timestamp
        .trim()
        .split(':')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [minutes, seconds] => Some(minutes * 60 + seconds),
        [hours, minutes, seconds] => Some(hours * 3600 + minutes * 60 + seconds),
        _ => None,
    }
}

/// Sanitize a title for use as a file name stem
///
/// Punctuation is dropped, runs of whitespace and hyphens collapse to one
/// hyphen, and the result is capped at 100 characters.
pub fn sanitize_filename(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();

    kept.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(MAX_FILENAME_STEM)
        .collect()
}

/// Generate a timestamped file name that does not exist yet in `dir`
pub fn generate_unique_filename(dir: &Path, base_name: &str, extension: &str) -> PathBuf {
    let stem = match sanitize_filename(base_name) {
        stem if stem.is_empty() => "transcript".to_string(),
        stem => stem,
    };
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    let candidate = dir.join(format!("{}_{}.{}", stem, timestamp, extension));
    if !candidate.exists() {
        return candidate;
    }

    let random_suffix = uuid::Uuid::new_v4().to_string()[..8].to_string();
    dir.join(format!("{}_{}_{}.{}", stem, timestamp, random_suffix, extension))
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!("{} - required for titles, durations and chapters", yt_dlp_path));
    }

    missing
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
