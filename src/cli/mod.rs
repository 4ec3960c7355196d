use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tubescribe",
    about = "Tubescribe - Extract clean, paragraph-formatted transcripts from YouTube videos",
    version,
    long_about = "A CLI tool and HTTP service that turns YouTube captions into readable prose. Accepts watch, youtu.be, shorts, live and embed URLs or bare video IDs, picks the best caption track and reflows it into paragraphs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = "TUBESCRIBE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators and informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the transcript of a single video
    Transcribe {
        /// YouTube URL or 11-character video ID
        #[arg(value_name = "URL_OR_ID")]
        url: String,

        /// Output file path, or "auto" to name it after the video title (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Skip title, duration and chapter lookup
        #[arg(long)]
        no_metadata: bool,
    },

    /// Extract transcripts for every URL listed in a file
    Batch {
        /// File with one URL or video ID per line ('#' starts a comment)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Directory for transcript files (prints to console if not specified)
        #[arg(short = 'd', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Skip title, duration and chapter lookup
        #[arg(long)]
        no_metadata: bool,
    },

    /// Run the HTTP service
    Serve {
        /// Address to bind (overrides the configuration file)
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Port to listen on (overrides the configuration file)
        #[arg(long, value_name = "PORT")]
        port: Option<u16>,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text with an optional metadata header
    Text,
    /// JSON with transcript, track and metadata
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}
