use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Translate SRT subtitles into Persian and repair right-to-left rendering", long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Model name (e.g., gemini-2.0-flash, gemini-2.5-pro)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// API key (overrides the GEMINI_API_KEY environment variable)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Defaults to `translate` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate every .srt file in the input directory
    Translate {
        /// Directory containing source subtitles
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Directory receiving translated subtitles
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Subtitle blocks per request
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Translate a single subtitle file
    File {
        /// Source subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (default: same name in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Subtitle blocks per request
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Repair right-to-left rendering of an existing subtitle file
    FixRtl {
        /// Subtitle file to repair
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the default configuration to a TOML file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "farsisub.toml")]
        output: PathBuf,
    },
}
