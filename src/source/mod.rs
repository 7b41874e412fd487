// ABOUTME: Supabase data-source module
// ABOUTME: Read-only PostgREST access for table discovery and full-table fetches

pub mod client;
pub mod models;

pub use client::SourceClient;
pub use models::Row;
