// ABOUTME: Library surface of the backup tool
// ABOUTME: Exposed so integration tests can drive a full run against mock servers

pub mod backup;
pub mod config;
pub mod drive;
pub mod error;
pub mod source;
