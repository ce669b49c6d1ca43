use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Error};
use indicatif::{HumanBytes, HumanCount, ProgressBar, ProgressStyle};
use log::{debug, error, info};
use walkdir::{DirEntry, WalkDir};

use crate::utils::FileRecord;

/// Every regular file under the scan root, bucketed by exact byte size.
///
/// Buckets keep walk order. When the walk stopped early, `walk_error` holds
/// the reason and the buckets contain what was collected before it.
#[derive(Debug, Default)]
pub struct Inventory {
    groups: BTreeMap<u64, Vec<FileRecord>>,
    walk_error: Option<Error>,
}

impl Inventory {
    pub fn from_records(records: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut inventory = Self::default();
        for record in records {
            inventory.insert(record);
        }
        inventory
    }

    pub fn insert(&mut self, record: FileRecord) {
        self.groups.entry(record.size).or_default().push(record);
    }

    pub fn groups(&self) -> &BTreeMap<u64, Vec<FileRecord>> {
        &self.groups
    }

    /// Size buckets that could hold duplicates (two or more members).
    pub fn candidate_groups(&self) -> impl Iterator<Item = (u64, &[FileRecord])> {
        self.groups
            .iter()
            .filter(|(_, records)| records.len() > 1)
            .map(|(size, records)| (*size, records.as_slice()))
    }

    pub fn file_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.groups
            .iter()
            .map(|(size, records)| size * records.len() as u64)
            .sum()
    }

    /// The error that cut the walk short, if any.
    pub fn walk_error(&self) -> Option<&Error> {
        self.walk_error.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.walk_error.is_none()
    }
}

/// Walks `root` once and buckets every non-directory entry by size.
///
/// The root itself is skipped and directories are descended into but never
/// recorded. The first error stops the whole walk.
pub fn build(root: &Path) -> Inventory {
    info!("Scanning {}", root.display());

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Scanning files...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    let (inventory, total_dirs) = collect(walk_entries(walker), &pb);
    if let Some(e) = inventory.walk_error() {
        error!("Scan of {} stopped early: {:#}", root.display(), e);
    }
    pb.finish_and_clear();

    info!(
        "Found {} files and {} directories ({})",
        HumanCount(inventory.file_count() as u64),
        HumanCount(total_dirs),
        HumanBytes(inventory.total_bytes())
    );
    inventory
}

/// Turns walk entries into records; directories become `Ok(None)`.
fn walk_entries(walker: WalkDir) -> impl Iterator<Item = anyhow::Result<Option<FileRecord>>> {
    walker.into_iter().map(|entry| -> anyhow::Result<Option<FileRecord>> {
        let entry = entry.context("Failed to read directory entry")?;
        if entry.file_type().is_dir() {
            Ok(None)
        } else {
            to_record(&entry).map(Some)
        }
    })
}

/// Buckets walk results until the first error. `Ok(None)` marks a directory.
///
/// Returns the inventory and the number of directories seen.
fn collect<I>(entries: I, pb: &ProgressBar) -> (Inventory, u64)
where
    I: IntoIterator<Item = anyhow::Result<Option<FileRecord>>>,
{
    let mut inventory = Inventory::default();
    let mut total_dirs = 0u64;

    for entry in entries {
        match entry {
            Ok(Some(record)) => {
                debug!("Found file: '{}' ({} bytes)", record.path.display(), record.size);
                inventory.insert(record);
                pb.set_message(format!(
                    "Scanning files... {} found",
                    HumanCount(inventory.file_count() as u64)
                ));
            }
            Ok(None) => total_dirs += 1,
            Err(e) => {
                inventory.walk_error = Some(e);
                break;
            }
        }
    }
    (inventory, total_dirs)
}

fn to_record(entry: &DirEntry) -> anyhow::Result<FileRecord> {
    let path = entry.path();
    let metadata = entry
        .metadata()
        .with_context(|| format!("Failed to read metadata for: '{}'", path.display()))?;
    let modified = metadata
        .modified()
        .with_context(|| format!("Failed to read modification time for: '{}'", path.display()))?;
    Ok(FileRecord::new(path, metadata.len(), modified))
}
