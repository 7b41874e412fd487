// ABOUTME: HTTP client for Google Drive v3 remote storage
// ABOUTME: Refresh-token auth plus the three operations the backup needs: list, delete, upload

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

use super::models::{DriveFile, FileList, TokenResponse, UploadedFile};

const REQUEST_TIMEOUT_SECS: u64 = 300;
const MULTIPART_BOUNDARY: &str = "fleet_backup_19a4c3";

#[derive(Debug, Clone)]
pub struct DriveCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct DriveEndpoints {
    pub api_base: String,
    pub upload_base: String,
    pub token_url: String,
}

impl Default for DriveEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com".to_string(),
            upload_base: "https://www.googleapis.com".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
        }
    }
}

pub struct DriveClient {
    client: Client,
    credentials: DriveCredentials,
    endpoints: DriveEndpoints,
    access_token: Option<String>,
}

impl DriveClient {
    pub fn new(credentials: DriveCredentials) -> Result<Self> {
        Self::with_endpoints(credentials, DriveEndpoints::default())
    }

    /// Constructor with explicit endpoints, used by tests to point the client
    /// at a mock server.
    pub fn with_endpoints(
        credentials: DriveCredentials,
        endpoints: DriveEndpoints,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            credentials,
            endpoints,
            access_token: None,
        })
    }

    /// Exchanges the refresh token for an access token on first use and caches
    /// it for the rest of the run. A backup run is short enough that the token
    /// never needs renewing mid-run.
    async fn access_token(&mut self) -> Result<String> {
        if let Some(token) = &self.access_token {
            return Ok(token.clone());
        }

        let response = self
            .client
            .post(&self.endpoints.token_url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("Failed to reach the Google OAuth2 token endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "OAuth2 token exchange failed with status {}: {}. Check GDRIVE_CLIENT_ID, GDRIVE_CLIENT_SECRET and GDRIVE_REFRESH_TOKEN",
                status,
                body
            );
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse OAuth2 token response")?;

        tracing::debug!(expires_in = token.expires_in, "Obtained Drive access token");
        self.access_token = Some(token.access_token.clone());
        Ok(token.access_token)
    }

    /// Lists every non-trashed file in the backup folder, newest first.
    pub async fn list_folder(&mut self, folder_id: &str) -> Result<Vec<DriveFile>> {
        let token = self.access_token().await?;
        let url = format!("{}/drive/v3/files", self.endpoints.api_base);
        let query = format!("'{}' in parents and trashed = false", folder_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name, createdTime)"),
                ("orderBy", "createdTime desc"),
                ("pageSize", "1000"),
            ])
            .send()
            .await
            .context("Failed to list the Drive backup folder")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Listing the Drive folder failed with status {}: {}", status, body);
        }

        let list: FileList = response
            .json()
            .await
            .context("Failed to parse Drive file list")?;

        Ok(list.files)
    }

    pub async fn delete_file(&mut self, file_id: &str) -> Result<()> {
        let token = self.access_token().await?;
        let url = format!("{}/drive/v3/files/{}", self.endpoints.api_base, file_id);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&token)
            .send()
            .await
            .with_context(|| format!("Failed to delete Drive file {}", file_id))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Deleting Drive file {} failed with status {}: {}",
                file_id,
                status,
                body
            );
        }

        Ok(())
    }

    /// Uploads the local archive into the backup folder with a multipart
    /// request carrying the file metadata and the zip content in one body.
    pub async fn upload_archive(
        &mut self,
        local_path: &Path,
        name: &str,
        folder_id: &str,
    ) -> Result<UploadedFile> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/upload/drive/v3/files?uploadType=multipart&fields=id,name",
            self.endpoints.upload_base
        );

        let content = tokio::fs::read(local_path)
            .await
            .with_context(|| format!("Failed to read local archive {}", local_path.display()))?;

        let metadata = serde_json::json!({
            "name": name,
            "parents": [folder_id],
        });
        let body = multipart_related(&metadata, &content)?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(body)
            .send()
            .await
            .context("Failed to upload the archive to Drive")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Archive upload failed with status {}: {}", status, body);
        }

        let uploaded: UploadedFile = response
            .json()
            .await
            .context("Failed to parse Drive upload response")?;

        Ok(uploaded)
    }
}

/// Builds a `multipart/related` body: a JSON metadata part followed by the
/// raw zip content part, as the Drive multipart upload endpoint expects.
fn multipart_related(metadata: &serde_json::Value, content: &[u8]) -> Result<Vec<u8>> {
    let metadata_json = serde_json::to_string(metadata)?;
    let mut body = Vec::with_capacity(content.len() + metadata_json.len() + 256);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n--{b}\r\nContent-Type: application/zip\r\n\r\n",
            b = MULTIPART_BOUNDARY,
            m = metadata_json
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    Ok(body)
}
