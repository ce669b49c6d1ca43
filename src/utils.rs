use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const MTIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory]:[offset_minute]"
);

/// A regular file seen during the inventory walk.
///
/// Records are created once by [`crate::inventory::build`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            size,
            modified,
        }
    }
}

/// Renders a modification time in the local offset, falling back to UTC when
/// the local offset cannot be determined.
pub fn format_mtime(modified: SystemTime) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    format_mtime_with_offset(modified, offset)
}

pub fn format_mtime_with_offset(modified: SystemTime, offset: UtcOffset) -> String {
    to_datetime(modified)
        .and_then(|datetime| datetime.checked_to_offset(offset))
        .and_then(|datetime| datetime.format(MTIME_FORMAT).ok())
        .unwrap_or_else(|| format!("@{}", unix_secs(modified)))
}

/// `None` when the time lies outside the calendar range `time` supports.
fn to_datetime(modified: SystemTime) -> Option<OffsetDateTime> {
    match modified.duration_since(UNIX_EPOCH) {
        Ok(after) => OffsetDateTime::UNIX_EPOCH.checked_add(after.try_into().ok()?),
        Err(before) => OffsetDateTime::UNIX_EPOCH.checked_sub(before.duration().try_into().ok()?),
    }
}

fn unix_secs(modified: SystemTime) -> i128 {
    match modified.duration_since(UNIX_EPOCH) {
        Ok(after) => i128::from(after.as_secs()),
        Err(before) => -i128::from(before.duration().as_secs()),
    }
}

pub fn format_human_elapsed(elapsed: Duration) -> String {
    let elapsed_secs = elapsed.as_secs();
    let elapsed_subsec_millis = elapsed.subsec_millis();
    if elapsed_secs >= 3600 {
        // Format as h:mm:ss
        let hours = elapsed_secs / 3600;
        let minutes = (elapsed_secs % 3600) / 60;
        let seconds = elapsed_secs % 60;
        format!("{hours}:{minutes:02}:{seconds:02}.{elapsed_subsec_millis:03} (h:mm:ss.mmm)")
    } else if elapsed_secs >= 60 {
        // Format as m:ss
        let minutes = elapsed_secs / 60;
        let seconds = elapsed_secs % 60;
        format!("{minutes}:{seconds:02}.{elapsed_subsec_millis:03} (m:ss.mmm)")
    } else {
        format!("{}.{:03} seconds", elapsed_secs, elapsed_subsec_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mtime_utc() {
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(
            format_mtime_with_offset(t, UtcOffset::UTC),
            "2023-11-14 22:13:20 +00:00"
        );
    }

    #[test]
    fn test_format_mtime_with_offset() {
        let offset = UtcOffset::from_hms(-5, 0, 0).unwrap();
        assert_eq!(
            format_mtime_with_offset(UNIX_EPOCH, offset),
            "1969-12-31 19:00:00 -05:00"
        );
    }

    #[test]
    fn test_format_mtime_beyond_calendar_range() {
        let far_future = UNIX_EPOCH + Duration::from_secs(300_000_000_000);
        assert_eq!(
            format_mtime_with_offset(far_future, UtcOffset::UTC),
            "@300000000000"
        );
        assert_eq!(format_mtime(far_future), "@300000000000");
    }

    #[test]
    fn test_format_mtime_before_epoch() {
        let t = UNIX_EPOCH - Duration::from_secs(86_400);
        assert_eq!(
            format_mtime_with_offset(t, UtcOffset::UTC),
            "1969-12-31 00:00:00 +00:00"
        );
    }

    #[test]
    fn test_format_mtime_offset_past_calendar_edge() {
        // 9999-12-31 23:00:00 UTC is in range, but +02:00 pushes it past the end.
        let t = UNIX_EPOCH + Duration::from_secs(253_402_297_200);
        assert_eq!(
            format_mtime_with_offset(t, UtcOffset::UTC),
            "9999-12-31 23:00:00 +00:00"
        );
        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();
        assert_eq!(format_mtime_with_offset(t, offset), "@253402297200");
    }

    #[test]
    fn test_format_human_elapsed() {
        assert_eq!(
            format_human_elapsed(Duration::from_millis(1_250)),
            "1.250 seconds"
        );
        assert_eq!(
            format_human_elapsed(Duration::from_millis(61_005)),
            "1:01.005 (m:ss.mmm)"
        );
        assert_eq!(
            format_human_elapsed(Duration::from_secs(3_725)),
            "1:02:05.000 (h:mm:ss.mmm)"
        );
    }
}
