pub mod cli;
pub mod config;
pub mod digest;
pub mod disposition;
pub mod inventory;
pub mod report;
pub mod resolver;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use digest::file_digest;
pub use disposition::{Delete, Disposition, Mode, Outcome, Relocate, ReportOnly};
pub use inventory::{Inventory, build};
pub use report::Report;
pub use resolver::{Summary, resolve, resolve_with};
pub use utils::{FileRecord, format_human_elapsed, format_mtime};
