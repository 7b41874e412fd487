// ABOUTME: Data shapes returned by the Supabase PostgREST API
// ABOUTME: Rows stay schemaless; the export step decides how fields serialize

use serde::Deserialize;

/// One table row as PostgREST returns it: an object whose keys are column
/// names. Key order is preserved by serde_json's map implementation.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Error body PostgREST attaches to non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}
