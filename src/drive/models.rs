// ABOUTME: Typed response shapes for the Google Drive v3 and OAuth2 token APIs
// ABOUTME: One explicit result type per remote operation, no untyped bags of fields

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response from the OAuth2 token endpoint when exchanging a refresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// One file entry as returned by `files.list`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub created_time: DateTime<Utc>,
}

/// Envelope around `files.list` results.
#[derive(Debug, Clone, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

/// Response from `files.create` after a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
}
