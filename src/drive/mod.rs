// ABOUTME: Google Drive remote-storage module
// ABOUTME: Lists, deletes, and uploads backup archives in one Drive folder

pub mod client;
pub mod models;

pub use client::{DriveClient, DriveCredentials, DriveEndpoints};
pub use models::DriveFile;
