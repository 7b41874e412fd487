// ABOUTME: Backup orchestrator: discover, export, archive, rotate, upload, clean up
// ABOUTME: Sequential single-writer pipeline; per-table failures are isolated, archive and upload failures are fatal

pub mod archive;
pub mod export;
pub mod rotation;

use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::drive::DriveClient;
use crate::error::BackupError;
use crate::source::SourceClient;

/// One table's completed export.
#[derive(Debug, Clone)]
pub struct TableExport {
    pub table: String,
    pub rows: usize,
    pub path: PathBuf,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct BackupReport {
    pub exported: Vec<TableExport>,
    pub skipped: Vec<String>,
    pub archive_path: PathBuf,
    pub remote_id: String,
    pub remote_name: String,
    pub rotated_out: usize,
}

/// Runs one backup end to end. The sequencing contract: discovery failure
/// aborts before anything is written or any storage call is made; per-table
/// fetch failures skip that table only; archive and upload failures are
/// fatal; rotation and local cleanup are best-effort.
pub async fn run(
    config: &Config,
    source: &SourceClient,
    drive: &mut DriveClient,
) -> Result<BackupReport, BackupError> {
    let tables = discover_tables(config, source).await?;
    info!(count = tables.len(), "Starting database backup");

    let name = archive::archive_name(Utc::now());
    let stem = name.trim_end_matches(".zip");
    let export_dir = config.work_dir.join(stem);
    let archive_path = config.work_dir.join(&name);

    std::fs::create_dir_all(&export_dir)
        .map_err(|e| BackupError::Archive(format!("cannot create export directory: {}", e)))?;

    let mut exported = Vec::new();
    let mut skipped = Vec::new();
    for table in &tables {
        if !is_plain_table_name(table) {
            warn!(table, "Skipping table with unsafe name");
            skipped.push(table.clone());
            continue;
        }

        let rows = match source.fetch_rows(table).await {
            Ok(rows) => rows,
            Err(e) => {
                let err = BackupError::Fetch(e.to_string());
                warn!(table, error = %err, "Skipping table");
                skipped.push(table.clone());
                continue;
            }
        };

        let path = export_dir.join(format!("{}.{}", table, config.format.extension()));
        export::write_rows(&path, &rows, config.format)
            .map_err(|e| BackupError::Archive(e.to_string()))?;

        if rows.is_empty() {
            info!(table, "Exported empty table (zero-row marker written)");
        } else {
            info!(table, rows = rows.len(), "Exported table");
        }
        exported.push(TableExport {
            table: table.clone(),
            rows: rows.len(),
            path,
        });
    }

    archive::create_zip(&export_dir, &archive_path)
        .map_err(|e| BackupError::Archive(e.to_string()))?;
    info!(archive = %archive_path.display(), "Backup archive finalized");

    if let Err(e) = std::fs::remove_dir_all(&export_dir) {
        warn!(dir = %export_dir.display(), error = %e, "Failed to remove export directory");
    }

    let rotated_out = rotate(config, drive).await;

    let uploaded = drive
        .upload_archive(&archive_path, &name, &config.drive_folder_id)
        .await
        .map_err(|e| BackupError::Upload(e.to_string()))?;
    info!(
        remote_id = %uploaded.id,
        name = %uploaded.name,
        "Backup uploaded to Drive"
    );

    if config.keep_local {
        info!(archive = %archive_path.display(), "Keeping local archive");
    } else if let Err(e) = std::fs::remove_file(&archive_path) {
        warn!(archive = %archive_path.display(), error = %e, "Failed to remove local archive");
    }

    Ok(BackupReport {
        exported,
        skipped,
        archive_path,
        remote_id: uploaded.id,
        remote_name: uploaded.name,
        rotated_out,
    })
}

async fn discover_tables(
    config: &Config,
    source: &SourceClient,
) -> Result<Vec<String>, BackupError> {
    let tables = match &config.tables {
        Some(tables) => tables.clone(),
        None => source
            .list_tables()
            .await
            .map_err(|e| BackupError::Discovery(e.to_string()))?,
    };

    if tables.is_empty() {
        // A run that would archive nothing is an operational fault, not a
        // success.
        return Err(BackupError::Discovery(
            "source reported no tables to back up".to_string(),
        ));
    }

    Ok(tables)
}

/// Prunes the remote folder down to `retention - 1` archives so the upload
/// that follows lands inside the limit. Every failure here is logged and
/// tolerated: if credentials are truly broken the upload will fail fatally
/// right after.
async fn rotate(config: &Config, drive: &mut DriveClient) -> usize {
    let files = match drive.list_folder(&config.drive_folder_id).await {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "Skipping rotation: cannot list the backup folder");
            return 0;
        }
    };

    let excess = rotation::plan_rotation(rotation::remote_archives(files), config.retention);
    let mut deleted = 0;
    for stale in excess {
        match drive.delete_file(&stale.id).await {
            Ok(()) => {
                info!(name = %stale.name, "Deleted old backup");
                deleted += 1;
            }
            Err(e) => {
                let err = BackupError::Delete(e.to_string());
                warn!(name = %stale.name, error = %err, "Failed to delete old backup");
            }
        }
    }

    deleted
}

/// Table names come from configuration or the discovery RPC; anything that is
/// not a plain identifier could escape the export directory when joined as a
/// path, so it is refused outright.
fn is_plain_table_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
