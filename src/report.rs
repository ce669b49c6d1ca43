use std::io::{self, Write};

use colored::Colorize;
use indicatif::{HumanBytes, HumanCount};

use crate::disposition::Outcome;
use crate::resolver::Summary;
use crate::utils::{FileRecord, format_mtime};

/// Writes the per-file report lines for a run.
///
/// Each duplicate set is framed by a `digest <hex>` header and a blank line.
pub struct Report<W: Write> {
    out: W,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn group_start(&mut self, digest: &str) -> io::Result<()> {
        writeln!(self.out, "digest {digest}")
    }

    pub fn line(&mut self, record: &FileRecord, outcome: &Outcome) -> io::Result<()> {
        write!(
            self.out,
            "[{}][{}] {}",
            outcome.marker().as_char(),
            format_mtime(record.modified),
            record.path.display()
        )?;
        match outcome.description() {
            Some(description) => writeln!(self.out, " [{description}]"),
            None => writeln!(self.out),
        }
    }

    pub fn group_end(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn summary(&mut self, summary: &Summary) -> io::Result<()> {
        if summary.duplicate_sets == 0 {
            writeln!(self.out, "{}", "No duplicate files found!".green())?;
        } else {
            let message = format!(
                "Found {} duplicate files in {} sets holding {}",
                HumanCount(summary.duplicates as u64),
                HumanCount(summary.duplicate_sets as u64),
                HumanBytes(summary.duplicate_bytes)
            );
            writeln!(self.out, "{}", message.yellow())?;
        }
        if summary.failures > 0 {
            let message = format!("{} duplicate files could not be processed", summary.failures);
            writeln!(self.out, "{}", message.red())?;
        }
        if summary.unreadable > 0 {
            let message = format!("{} files could not be read and were skipped", summary.unreadable);
            writeln!(self.out, "{}", message.red())?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
