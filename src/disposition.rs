//! What happens to each member of a duplicate set.
//!
//! The resolver only decides which file is kept; a [`Disposition`] carries
//! out the decision. Three variants exist, one per [`Mode`]:
//! - [`ReportOnly`] leaves the tree untouched
//! - [`Delete`] removes duplicates from disk
//! - [`Relocate`] moves duplicates into a backup directory

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::{debug, warn};
use serde::Deserialize;

use crate::utils::FileRecord;

/// Disposition mode selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Show duplicates only
    Debug,
    /// Delete duplicate files
    Delete,
    /// Move duplicate files into the backup path
    Backup,
}

/// Report marker for one line of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Reported,
    Deleted,
    Moved,
    Kept,
}

impl Marker {
    pub fn as_char(self) -> char {
        match self {
            Self::Reported => '-',
            Self::Deleted => 'X',
            Self::Moved => 'M',
            Self::Kept => 'O',
        }
    }
}

/// Result of disposing of a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Kept,
    Reported,
    Deleted,
    Moved(PathBuf),
    /// The action failed and the file was left where it was.
    Failed(Marker, String),
}

impl Outcome {
    pub fn marker(&self) -> Marker {
        match self {
            Self::Kept => Marker::Kept,
            Self::Reported => Marker::Reported,
            Self::Deleted => Marker::Deleted,
            Self::Moved(_) => Marker::Moved,
            Self::Failed(marker, _) => *marker,
        }
    }

    /// Text for the trailing `[...]` of a report line. Kept files have none.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Kept => None,
            Self::Reported => Some("debug only"),
            Self::Deleted => Some("Deleted"),
            Self::Moved(_) => Some("Backup"),
            Self::Failed(_, message) => Some(message.as_str()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(..))
    }
}

pub trait Disposition {
    /// Called once for every non-kept member of a duplicate set.
    fn on_duplicate(&mut self, record: &FileRecord) -> Outcome;

    /// Called once per duplicate set, after all of its duplicates.
    fn on_keep(&mut self, record: &FileRecord) -> Outcome {
        debug!("Keeping '{}'", record.path.display());
        Outcome::Kept
    }
}

#[derive(Debug, Default)]
pub struct ReportOnly;

impl Disposition for ReportOnly {
    fn on_duplicate(&mut self, _record: &FileRecord) -> Outcome {
        Outcome::Reported
    }
}

#[derive(Debug, Default)]
pub struct Delete;

impl Disposition for Delete {
    fn on_duplicate(&mut self, record: &FileRecord) -> Outcome {
        match fs::remove_file(&record.path) {
            Ok(()) => {
                debug!("Deleted '{}'", record.path.display());
                Outcome::Deleted
            }
            Err(e) => {
                warn!("Failed to delete '{}': {}", record.path.display(), e);
                Outcome::Failed(Marker::Deleted, e.to_string())
            }
        }
    }
}

/// Moves duplicates into `target`, keeping their file name. An existing file
/// of the same name in `target` is overwritten.
#[derive(Debug)]
pub struct Relocate {
    target: PathBuf,
}

impl Relocate {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    fn destination(&self, path: &Path) -> Option<PathBuf> {
        path.file_name().map(|name| self.target.join(name))
    }
}

impl Disposition for Relocate {
    fn on_duplicate(&mut self, record: &FileRecord) -> Outcome {
        let Some(destination) = self.destination(&record.path) else {
            return Outcome::Failed(
                Marker::Moved,
                format!("no file name in '{}'", record.path.display()),
            );
        };
        match fs::rename(&record.path, &destination) {
            Ok(()) => {
                debug!(
                    "Moved '{}' to '{}'",
                    record.path.display(),
                    destination.display()
                );
                Outcome::Moved(destination)
            }
            Err(e) => {
                warn!(
                    "Failed to move '{}' to '{}': {}",
                    record.path.display(),
                    destination.display(),
                    e
                );
                Outcome::Failed(Marker::Moved, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use tempfile::tempdir;

    fn record(path: &Path) -> FileRecord {
        FileRecord::new(path, 5, SystemTime::now())
    }

    #[test]
    fn test_report_only_leaves_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.txt");
        fs::write(&path, b"hello").unwrap();

        let outcome = ReportOnly.on_duplicate(&record(&path));

        assert_eq!(outcome, Outcome::Reported);
        assert_eq!(outcome.marker().as_char(), '-');
        assert_eq!(outcome.description(), Some("debug only"));
        assert!(path.exists());
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.txt");
        fs::write(&path, b"hello").unwrap();

        let outcome = Delete.on_duplicate(&record(&path));

        assert_eq!(outcome, Outcome::Deleted);
        assert_eq!(outcome.description(), Some("Deleted"));
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_failure_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("already-gone.txt");

        let outcome = Delete.on_duplicate(&record(&path));

        assert!(outcome.is_failure());
        assert_eq!(outcome.marker().as_char(), 'X');
        assert!(outcome.description().is_some());
    }

    #[test]
    fn test_relocate_moves_by_base_name() {
        let dir = tempdir().unwrap();
        let backup = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        let path = nested.join("dup.txt");
        fs::write(&path, b"hello").unwrap();

        let mut relocate = Relocate::new(backup.path());
        let outcome = relocate.on_duplicate(&record(&path));

        let expected = backup.path().join("dup.txt");
        assert_eq!(outcome, Outcome::Moved(expected.clone()));
        assert_eq!(outcome.description(), Some("Backup"));
        assert!(!path.exists());
        assert_eq!(fs::read(expected).unwrap(), b"hello");
    }

    #[test]
    fn test_relocate_overwrites_on_name_collision() {
        let dir = tempdir().unwrap();
        let backup = tempdir().unwrap();
        let path = dir.path().join("dup.txt");
        fs::write(&path, b"new").unwrap();
        fs::write(backup.path().join("dup.txt"), b"old").unwrap();

        let outcome = Relocate::new(backup.path()).on_duplicate(&record(&path));

        assert!(matches!(outcome, Outcome::Moved(_)));
        assert_eq!(fs::read(backup.path().join("dup.txt")).unwrap(), b"new");
    }

    #[test]
    fn test_relocate_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.txt");
        fs::write(&path, b"hello").unwrap();

        let mut relocate = Relocate::new(dir.path().join("no-such-dir"));
        let outcome = relocate.on_duplicate(&record(&path));

        assert!(outcome.is_failure());
        assert_eq!(outcome.marker(), Marker::Moved);
        assert!(path.exists());
    }

    #[test]
    fn test_keep_never_touches_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keep.txt");
        fs::write(&path, b"hello").unwrap();

        assert_eq!(Delete.on_keep(&record(&path)), Outcome::Kept);
        assert_eq!(Outcome::Kept.description(), None);
        assert!(path.exists());
    }
}
