use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{HumanBytes, HumanCount};
use log::{debug, info, warn};

use crate::digest;
use crate::disposition::Disposition;
use crate::inventory::Inventory;
use crate::report::Report;
use crate::utils::FileRecord;

/// Totals for one resolver run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Digest groups with two or more members.
    pub duplicate_sets: usize,
    /// Files handed to `on_duplicate`.
    pub duplicates: usize,
    /// Bytes held by those files.
    pub duplicate_bytes: u64,
    /// Duplicates whose disposition failed.
    pub failures: usize,
    /// Files left out because their content could not be hashed.
    pub unreadable: usize,
}

/// Finds every duplicate set in `inventory` and hands its members to
/// `disposition`, writing one report line per file.
pub fn resolve<W: Write>(
    inventory: &Inventory,
    disposition: &mut dyn Disposition,
    report: &mut Report<W>,
) -> Result<Summary> {
    resolve_with(inventory, disposition, report, digest::file_digest)
}

/// Like [`resolve`], with the content digest supplied by `digest_fn`.
pub fn resolve_with<W, F>(
    inventory: &Inventory,
    disposition: &mut dyn Disposition,
    report: &mut Report<W>,
    mut digest_fn: F,
) -> Result<Summary>
where
    W: Write,
    F: FnMut(&Path) -> Result<String>,
{
    let mut summary = Summary::default();

    for (size, records) in inventory.candidate_groups() {
        debug!("Hashing {} files of {} bytes", records.len(), size);
        let digest_groups = group_by_digest(records, &mut digest_fn, &mut summary);

        for (digest, set) in &digest_groups {
            // Same size, different content.
            if set.len() < 2 {
                continue;
            }
            dispatch_set(digest, set, disposition, report, &mut summary)
                .context("Failed to write report")?;
        }
    }

    info!(
        "Resolved {} duplicate sets: {} duplicate files ({})",
        HumanCount(summary.duplicate_sets as u64),
        HumanCount(summary.duplicates as u64),
        HumanBytes(summary.duplicate_bytes)
    );
    Ok(summary)
}

/// Sub-partitions one size bucket by content digest. Files that cannot be
/// hashed are dropped from the run and only counted.
fn group_by_digest<'a, F>(
    records: &'a [FileRecord],
    digest_fn: &mut F,
    summary: &mut Summary,
) -> BTreeMap<String, Vec<&'a FileRecord>>
where
    F: FnMut(&Path) -> Result<String>,
{
    let mut groups: BTreeMap<String, Vec<&FileRecord>> = BTreeMap::new();
    for record in records {
        match digest_fn(&record.path) {
            Ok(digest) => groups.entry(digest).or_default().push(record),
            Err(e) => {
                warn!("Skipping '{}': {:#}", record.path.display(), e);
                summary.unreadable += 1;
            }
        }
    }
    groups
}

/// Index of the oldest record. On equal times the earliest in walk order wins.
fn select_keep(set: &[&FileRecord]) -> Option<usize> {
    set.iter()
        .enumerate()
        .min_by_key(|(_, record)| record.modified)
        .map(|(index, _)| index)
}

fn dispatch_set<W: Write>(
    digest: &str,
    set: &[&FileRecord],
    disposition: &mut dyn Disposition,
    report: &mut Report<W>,
    summary: &mut Summary,
) -> std::io::Result<()> {
    let Some(keep) = select_keep(set) else {
        return Ok(());
    };

    report.group_start(digest)?;
    summary.duplicate_sets += 1;

    for (_, record) in set.iter().enumerate().filter(|(index, _)| *index != keep) {
        let outcome = disposition.on_duplicate(record);
        summary.duplicates += 1;
        summary.duplicate_bytes += record.size;
        if outcome.is_failure() {
            summary.failures += 1;
        }
        report.line(record, &outcome)?;
    }

    let kept = set[keep];
    let outcome = disposition.on_keep(kept);
    report.line(kept, &outcome)?;
    report.group_end()
}
