//! Sequential processing of many inputs with a success/failure tally.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::output;
use crate::transcribe::TranscriptionPipeline;

/// How each batch item is written
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory for auto-named result files; results go to stdout when absent
    pub output_dir: Option<PathBuf>,
    pub format: OutputFormat,
    pub include_metadata: bool,
    pub quiet: bool,
}

/// One input that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub input: String,
    pub reason: String,
}

/// Outcome of a batch run
#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_success(&mut self) {
        self.processed += 1;
        self.succeeded += 1;
    }

    fn record_failure(&mut self, input: &str, reason: String) {
        self.processed += 1;
        self.failures.push(BatchFailure {
            input: input.to_string(),
            reason,
        });
    }

    /// Print the tally to stderr
    pub fn print_summary(&self) {
        eprintln!();
        eprintln!("{}", style("Batch processing complete").bold());
        eprintln!("  Processed:  {}", self.processed);
        eprintln!("  Successful: {}", style(self.succeeded).green());
        eprintln!("  Failed:     {}", style(self.failed()).red());

        if !self.failures.is_empty() {
            eprintln!();
            eprintln!("Failed inputs:");
            for failure in &self.failures {
                eprintln!("  {} {}: {}", style("✗").red(), failure.input, failure.reason);
            }
        }
    }
}

/// Inputs listed in a batch file: trimmed, without blank lines and `#` comments
pub fn parse_batch_input(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read and parse a batch file; a file without inputs is an error
pub fn read_batch_file(path: &Path) -> Result<Vec<String>> {
    let content = fs_err::read_to_string(path).context("Failed to read batch file")?;
    let inputs = parse_batch_input(&content);

    if inputs.is_empty() {
        anyhow::bail!("No URLs found in {}", path.display());
    }

    Ok(inputs)
}

/// Process every input in order, continuing past failures
pub async fn run_batch(
    pipeline: &TranscriptionPipeline,
    inputs: &[String],
    options: &BatchOptions,
) -> Result<BatchReport> {
    if let Some(dir) = &options.output_dir {
        fs_err::create_dir_all(dir).context("Failed to create output directory")?;
    }

    let progress = if options.output_dir.is_some() && !options.quiet {
        let bar = ProgressBar::new(inputs.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress template")?,
        );
        Some(bar)
    } else {
        None
    };

    let mut report = BatchReport::default();

    for (index, input) in inputs.iter().enumerate() {
        if let Some(bar) = &progress {
            bar.set_message(input.clone());
        }
        tracing::info!("[{}/{}] Processing {}", index + 1, inputs.len(), input);

        match process_one(pipeline, input, options).await {
            Ok(saved) => {
                if let (Some(path), Some(bar)) = (&saved, &progress) {
                    bar.println(format!("{} {}", style("✓").green(), path.display()));
                }
                report.record_success();
            }
            Err(e) => {
                tracing::warn!("Failed to process {}: {:#}", input, e);
                report.record_failure(input, format!("{:#}", e));
            }
        }

        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    Ok(report)
}

/// Returns the saved file path when writing to a directory
async fn process_one(
    pipeline: &TranscriptionPipeline,
    input: &str,
    options: &BatchOptions,
) -> Result<Option<PathBuf>> {
    let result = pipeline.transcribe(input, options.include_metadata).await?;

    match &options.output_dir {
        Some(dir) => {
            let path = output::auto_output_path(dir, &result, options.format);
            output::save_to_file(&result, &path, options.format).await?;
            Ok(Some(path))
        }
        None => {
            output::print_to_console(&result, options.format)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{
        FetchError, MockTranscriptLister, ReflowOptions, TrackHandle, TranscriptCandidate,
        TranscriptCue,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_parse_batch_input() {
        let content = "# my list\n\nhttps://youtu.be/dQw4w9WgXcQ\n   \n  jNQXAC9IVRw  \n#skip\n";
        assert_eq!(
            parse_batch_input(content),
            vec!["https://youtu.be/dQw4w9WgXcQ", "jNQXAC9IVRw"]
        );
    }

    #[test]
    fn test_empty_batch_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("urls.txt");
        fs_err::write(&path, "# nothing here\n\n").unwrap();

        assert!(read_batch_file(&path).is_err());
    }

    fn pipeline() -> TranscriptionPipeline {
        let mut lister = MockTranscriptLister::new();
        lister.expect_list_candidates().returning(|id| {
            if id.as_str() == "jNQXAC9IVRw" {
                Err(FetchError::VideoUnavailable)
            } else {
                Ok(vec![TranscriptCandidate::new(
                    "en",
                    "English",
                    false,
                    TrackHandle::new("https://example.test/en"),
                )])
            }
        });
        lister
            .expect_fetch_cues()
            .returning(|_| Ok(vec![TranscriptCue::new("all good here", 0.0, 1.0)]));

        TranscriptionPipeline::with_components(Arc::new(lister), None, ReflowOptions::default())
    }

    #[tokio::test]
    async fn test_batch_continues_past_failures() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let inputs = vec![
            "https://youtu.be/dQw4w9WgXcQ".to_string(),
            "not a url".to_string(),
            "jNQXAC9IVRw".to_string(),
            "https://www.youtube.com/shorts/aqz-KE-bpKQ".to_string(),
        ];
        let options = BatchOptions {
            output_dir: Some(out.clone()),
            format: OutputFormat::Text,
            include_metadata: false,
            quiet: true,
        };

        let report = run_batch(&pipeline(), &inputs, &options).await.unwrap();

        assert_eq!(report.processed, 4);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed(), 2);
        assert!(!report.all_succeeded());
        assert_eq!(report.failures[0].input, "not a url");
        assert!(report.failures[0].reason.contains("Invalid YouTube URL"));
        assert_eq!(report.failures[1].input, "jNQXAC9IVRw");

        let written = fs_err::read_dir(&out).unwrap().count();
        assert_eq!(written, 2);
    }
}
