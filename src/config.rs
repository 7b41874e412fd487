// ABOUTME: Immutable run configuration parsed once at process entry
// ABOUTME: Every knob has a CLI flag and an environment-variable fallback

use std::path::PathBuf;

use clap::Parser;

use crate::backup::export::ExportFormat;

#[derive(Parser, Debug, Clone)]
#[command(name = "fleet-backup", version)]
#[command(about = "Exports Supabase tables, zips them, and uploads the archive to Google Drive")]
pub struct Config {
    /// Supabase project URL, e.g. https://xyzcompany.supabase.co
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: String,

    /// Supabase service role key (authorizes full-table reads)
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub service_role_key: String,

    /// Google OAuth2 client ID
    #[arg(long, env = "GDRIVE_CLIENT_ID")]
    pub drive_client_id: String,

    /// Google OAuth2 client secret
    #[arg(long, env = "GDRIVE_CLIENT_SECRET", hide_env_values = true)]
    pub drive_client_secret: String,

    /// Google OAuth2 refresh token for the backup account
    #[arg(long, env = "GDRIVE_REFRESH_TOKEN", hide_env_values = true)]
    pub drive_refresh_token: String,

    /// Drive folder ID that holds the backup archives
    #[arg(long, env = "GDRIVE_FOLDER_ID")]
    pub drive_folder_id: String,

    /// Maximum number of archives to keep in the Drive folder, counting the
    /// one this run uploads
    #[arg(long, env = "BACKUP_RETENTION", default_value_t = 7,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub retention: u32,

    /// Comma-separated list of tables to export; when omitted, tables are
    /// discovered via the get_all_tables RPC
    #[arg(long, env = "BACKUP_TABLES", value_delimiter = ',')]
    pub tables: Option<Vec<String>>,

    /// Per-table serialization format
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Directory where the export directory and archive are staged
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    /// Keep the local archive after a successful upload
    #[arg(long)]
    pub keep_local: bool,
}
