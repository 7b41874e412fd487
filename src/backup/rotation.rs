// ABOUTME: Retention planning over remote backup records
// ABOUTME: Keeps the newest archives, reserving one slot for the upload that follows

use chrono::{DateTime, Utc};

use crate::backup::archive::parse_archive_name;
use crate::drive::DriveFile;

/// A remote archive that matched the backup naming convention.
#[derive(Debug, Clone)]
pub struct RemoteArchive {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Filters a folder listing down to the files rotation is allowed to touch.
/// Anything that doesn't parse as a backup archive name is left alone.
pub fn remote_archives(files: Vec<DriveFile>) -> Vec<RemoteArchive> {
    files
        .into_iter()
        .filter(|file| parse_archive_name(&file.name).is_some())
        .map(|file| RemoteArchive {
            id: file.id,
            name: file.name,
            created_at: file.created_time,
        })
        .collect()
}

/// Rotation runs before the new archive is uploaded, so it keeps the
/// `retention - 1` newest archives and marks the rest for deletion; after the
/// upload the folder holds at most `retention` archives. With `n` archives
/// present this deletes `max(0, n + 1 - retention)` of them, oldest first.
pub fn plan_rotation(mut archives: Vec<RemoteArchive>, retention: u32) -> Vec<RemoteArchive> {
    debug_assert!(retention >= 1);

    // Newest first; the listing claims this order already but is not trusted.
    archives.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let keep = retention.saturating_sub(1) as usize;
    if archives.len() <= keep {
        return Vec::new();
    }

    let mut excess = archives.split_off(keep);
    // Delete oldest first so an interrupted rotation has removed the least
    // valuable archives.
    excess.reverse();
    excess
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn archive(id: &str, day: u32) -> RemoteArchive {
        RemoteArchive {
            id: id.to_string(),
            name: format!("db_backup_2026-08-{:02}T00-00-00-000Z.zip", day),
            created_at: Utc.with_ymd_and_hms(2026, 8, day, 0, 0, 0).unwrap(),
        }
    }

    fn drive_file(id: &str, name: &str, day: u32) -> DriveFile {
        DriveFile {
            id: id.to_string(),
            name: name.to_string(),
            created_time: Utc.with_ymd_and_hms(2026, 8, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_foreign_files_are_never_rotated() {
        let files = vec![
            drive_file("a", "db_backup_2026-08-01T00-00-00-000Z.zip", 1),
            drive_file("b", "quarterly-report.pdf", 2),
            drive_file("c", "db_backup_manual-copy.zip", 3),
        ];
        let archives = remote_archives(files);
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].id, "a");
    }

    #[test]
    fn test_under_limit_deletes_nothing() {
        let archives = vec![archive("a", 1), archive("b", 2), archive("c", 3)];
        assert!(plan_rotation(archives, 7).is_empty());
    }

    #[test]
    fn test_exactly_at_reserve_boundary_deletes_nothing() {
        // 6 present, limit 7: all six fit alongside the upcoming upload.
        let archives = (1..=6).map(|d| archive(&format!("a{}", d), d)).collect();
        assert!(plan_rotation(archives, 7).is_empty());
    }

    #[test]
    fn test_eight_present_limit_seven_deletes_two_oldest() {
        let archives: Vec<_> = (1..=8).map(|d| archive(&format!("a{}", d), d)).collect();
        let deleted = plan_rotation(archives, 7);
        assert_eq!(deleted.len(), 2);
        assert_eq!(deleted[0].id, "a1");
        assert_eq!(deleted[1].id, "a2");
    }

    #[test]
    fn test_limit_one_deletes_everything_present() {
        let archives: Vec<_> = (1..=3).map(|d| archive(&format!("a{}", d), d)).collect();
        let deleted = plan_rotation(archives, 1);
        assert_eq!(deleted.len(), 3);
        // Oldest first.
        assert_eq!(deleted[0].id, "a1");
        assert_eq!(deleted[2].id, "a3");
    }

    #[test]
    fn test_unsorted_listing_is_ordered_locally() {
        let archives = vec![archive("mid", 15), archive("new", 20), archive("old", 10)];
        let deleted = plan_rotation(archives, 2);
        assert_eq!(deleted.len(), 2);
        assert_eq!(deleted[0].id, "old");
        assert_eq!(deleted[1].id, "mid");
    }

    #[test]
    fn test_empty_listing() {
        assert!(plan_rotation(Vec::new(), 1).is_empty());
    }
}
