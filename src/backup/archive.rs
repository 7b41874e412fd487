// ABOUTME: Archive naming and zip creation for finalized backups
// ABOUTME: Bundles the per-table export files into one Deflate-compressed container

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

const BUFFER_SIZE: usize = 8 * 1024;
const ARCHIVE_PREFIX: &str = "db_backup_";
const ARCHIVE_SUFFIX: &str = ".zip";

// ISO-8601 with `:` and `.` replaced so the name is filesystem-safe, and with
// millisecond resolution so two runs in the same second get distinct names.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

/// Archive name for a run that started at `now`, e.g.
/// `db_backup_2026-08-30T12-34-56-789Z.zip`. Lexicographic order matches
/// chronological order.
pub fn archive_name(now: DateTime<Utc>) -> String {
    format!(
        "{}{}{}",
        ARCHIVE_PREFIX,
        now.format(TIMESTAMP_FORMAT),
        ARCHIVE_SUFFIX
    )
}

/// Parses the run timestamp back out of an archive name. Returns `None` for
/// anything that doesn't follow the backup naming convention, so unrelated
/// files sharing the remote folder are never treated as rotatable backups.
pub fn parse_archive_name(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(ARCHIVE_SUFFIX)?;
    let stamp = stem.strip_prefix(ARCHIVE_PREFIX)?;
    let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Zips every file in `export_dir` (flat, no subdirectories are produced by
/// the export step) into `archive_path` and closes the container. The archive
/// is fully flushed before this returns, so upload can rely on it.
pub fn create_zip(export_dir: &Path, archive_path: &Path) -> Result<()> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create archive {}", archive_path.display()))?;
    let mut zip = zip::ZipWriter::new(file);

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let mut entries: Vec<_> = std::fs::read_dir(export_dir)
        .with_context(|| format!("Failed to read export directory {}", export_dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| anyhow::anyhow!("Non-UTF-8 export file name: {}", path.display()))?;
        add_file(&mut zip, &path, &name, options)?;
    }

    zip.finish()
        .with_context(|| format!("Failed to finalize archive {}", archive_path.display()))?;
    Ok(())
}

fn add_file<W: Write + std::io::Seek>(
    zip: &mut zip::ZipWriter<W>,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; BUFFER_SIZE];

    zip.start_file(name, options)?;
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        zip.write_all(&buffer[..bytes_read])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};
    use tempfile::TempDir;

    #[test]
    fn test_archive_name_round_trips() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 34, 56).unwrap()
            + chrono::Duration::milliseconds(789);
        let name = archive_name(now);
        assert_eq!(name, "db_backup_2026-08-30T12-34-56-789Z.zip");

        let parsed = parse_archive_name(&name).unwrap();
        assert_eq!(parsed, now);
        assert_eq!(parsed.year(), 2026);
        assert_eq!(parsed.nanosecond(), 789_000_000);
    }

    #[test]
    fn test_archive_names_sort_with_time() {
        let earlier = Utc.with_ymd_and_hms(2026, 8, 30, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 8, 31, 0, 0, 0).unwrap();
        assert!(archive_name(earlier) < archive_name(later));
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert!(parse_archive_name("notes.txt").is_none());
        assert!(parse_archive_name("db_backup_garbage.zip").is_none());
        assert!(parse_archive_name("db_backup_2026-08-30T12-34-56-789Z.tar").is_none());
        assert!(parse_archive_name("backup_2026-08-30T12-34-56-789Z.zip").is_none());
    }

    #[test]
    fn test_create_zip_bundles_export_files() {
        let export_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        std::fs::write(export_dir.path().join("vehicles.csv"), b"id,plate\n1,ABC-123\n")
            .unwrap();
        std::fs::write(export_dir.path().join("work_orders.csv"), b"id\n7\n").unwrap();
        std::fs::write(export_dir.path().join("profiles.csv"), b"").unwrap();

        let archive_path = out_dir.path().join("db_backup_test.zip");
        create_zip(export_dir.path(), &archive_path).unwrap();

        let file = File::open(&archive_path).unwrap();
        let mut zip = zip::ZipArchive::new(file).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"vehicles.csv".to_string()));
        assert!(names.contains(&"work_orders.csv".to_string()));
        assert!(names.contains(&"profiles.csv".to_string()));

        let mut contents = String::new();
        zip.by_name("vehicles.csv")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "id,plate\n1,ABC-123\n");
    }

    #[test]
    fn test_create_zip_of_empty_dir_is_valid() {
        let export_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        let archive_path = out_dir.path().join("db_backup_empty.zip");
        create_zip(export_dir.path(), &archive_path).unwrap();

        let file = File::open(&archive_path).unwrap();
        let zip = zip::ZipArchive::new(file).unwrap();
        assert_eq!(zip.len(), 0);
    }
}
