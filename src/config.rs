use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Deserialize;

use crate::cli::Cli;
use crate::disposition::{Delete, Disposition, Mode, Relocate, ReportOnly};

/// Optional defaults read from `--config <FILE>`.
///
/// ```toml
/// path = "/srv/photos"
/// mode = "backup"
/// backup_path = "/srv/photo-dups"
/// verbose = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub path: Option<PathBuf>,
    pub mode: Option<Mode>,
    pub backup_path: Option<PathBuf>,
    pub verbose: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: '{}'", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: '{}'", path.display()))
    }
}

/// Validated run settings. Built once in `main` and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub root: PathBuf,
    pub mode: Mode,
    /// Present exactly when `mode` is [`Mode::Backup`].
    pub backup_dir: Option<PathBuf>,
    pub verbose: bool,
}

impl Config {
    /// Layers the command line over the optional config file and checks that
    /// the scan root and backup directory exist.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let config = Self::merge(cli, file)?;
        config.check_paths()
    }

    /// Command-line values win over file values.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let Some(mode) = cli.mode.or(file.mode) else {
            bail!("mode is missing");
        };
        let Some(root) = cli.path.clone().or(file.path) else {
            bail!("path is missing");
        };
        let backup_dir = match mode {
            Mode::Backup => match cli.backup_path.clone().or(file.backup_path) {
                Some(dir) => Some(dir),
                None => bail!("mode=backup, backup path is required"),
            },
            Mode::Debug | Mode::Delete => None,
        };
        Ok(Self {
            root,
            mode,
            backup_dir,
            verbose: cli.verbose || file.verbose.unwrap_or(false),
        })
    }

    fn check_paths(mut self) -> Result<Self> {
        // Absolute paths make report lines unambiguous.
        self.root = self
            .root
            .canonicalize()
            .with_context(|| format!("Failed to resolve path: {}", self.root.display()))?;
        if !self.root.is_dir() {
            bail!("Path is not a directory: {}", self.root.display());
        }
        if let Some(dir) = &self.backup_dir {
            if !dir.is_dir() {
                bail!("Backup path is not a directory: {}", dir.display());
            }
        }
        Ok(self)
    }

    /// The disposition matching `mode`.
    pub fn disposition(&self) -> Box<dyn Disposition> {
        debug!("Using {:?} disposition", self.mode);
        match (self.mode, &self.backup_dir) {
            (Mode::Backup, Some(dir)) => Box::new(Relocate::new(dir)),
            (Mode::Delete, _) => Box::new(Delete),
            // `merge` never yields backup mode without a directory.
            (Mode::Debug, _) | (Mode::Backup, None) => Box::new(ReportOnly),
        }
    }
}
