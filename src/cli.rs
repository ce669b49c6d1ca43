use clap::Parser;
use std::path::PathBuf;

use crate::disposition::Mode;

#[derive(Parser, Debug, Default)]
#[command(name = "dedupe-files", version)]
#[command(about = "Find byte-for-byte duplicate files and keep only the oldest copy")]
pub struct Cli {
    /// Directory to scan for duplicates
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// What to do with every copy except the oldest
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Directory that receives duplicates in backup mode
    #[arg(long)]
    pub backup_path: Option<PathBuf>,

    /// TOML file with defaults for the options above
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
