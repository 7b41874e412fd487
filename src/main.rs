// ABOUTME: Entrypoint: config parsing, logging setup, client wiring, exit code
// ABOUTME: Exit 0 on success, 1 on any fatal pipeline failure

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fleet_backup::backup;
use fleet_backup::config::Config;
use fleet_backup::drive::{DriveClient, DriveCredentials};
use fleet_backup::source::SourceClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    let source = match SourceClient::new(&config.supabase_url, &config.service_role_key) {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "Failed to set up the Supabase client");
            std::process::exit(1);
        }
    };
    let mut drive = match DriveClient::new(DriveCredentials {
        client_id: config.drive_client_id.clone(),
        client_secret: config.drive_client_secret.clone(),
        refresh_token: config.drive_refresh_token.clone(),
    }) {
        Ok(drive) => drive,
        Err(e) => {
            error!(error = %e, "Failed to set up the Drive client");
            std::process::exit(1);
        }
    };

    match backup::run(&config, &source, &mut drive).await {
        Ok(report) => {
            let rows: usize = report.exported.iter().map(|t| t.rows).sum();
            info!(
                tables = report.exported.len(),
                skipped = report.skipped.len(),
                rows,
                rotated_out = report.rotated_out,
                remote_id = %report.remote_id,
                "Backup complete"
            );
        }
        Err(e) => {
            error!(error = %e, "Backup failed");
            std::process::exit(1);
        }
    }
}
