// ABOUTME: HTTP client for the Supabase PostgREST API
// ABOUTME: Handles table discovery via RPC and unpaginated full-table reads

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::models::{ApiError, Row};

const FETCH_TIMEOUT_SECS: u64 = 120;

pub struct SourceClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SourceClient {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        })
    }

    /// Discovers all exportable tables via the `get_all_tables` RPC.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let url = format!("{}/rest/v1/rpc/get_all_tables", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({}))
            .send()
            .await
            .context("Failed to reach Supabase for table discovery. Check SUPABASE_URL and network connectivity")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Table discovery failed with status {}: {}",
                status,
                Self::error_message(&body)
            );
        }

        let tables: Vec<String> = response
            .json()
            .await
            .context("Failed to parse table list from get_all_tables RPC")?;

        Ok(tables)
    }

    /// Fetches every row of one table with a single unpaginated select.
    /// The whole result set is materialized in memory before serialization.
    pub async fn fetch_rows(&self, table: &str) -> Result<Vec<Row>> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);

        let response = self
            .client
            .get(&url)
            .query(&[("select", "*")])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .with_context(|| format!("Failed to fetch rows for table {}", table))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Fetching {} failed with status {}: {}",
                table,
                status,
                Self::error_message(&body)
            );
        }

        let rows: Vec<Row> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse rows for table {}", table))?;

        Ok(rows)
    }

    /// PostgREST error bodies carry a structured message; fall back to the raw
    /// body when the shape doesn't match.
    fn error_message(body: &str) -> String {
        match serde_json::from_str::<ApiError>(body) {
            Ok(err) => err.message,
            Err(_) => body.to_string(),
        }
    }
}
