//! Input loading: local files or documents served over HTTP.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};

/// GETs `url` and returns the response body, failing on non-2xx statuses.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads an input document from a local path or fetches it when `source`
/// is an `http(s)://` URL.
#[tracing::instrument(skip_all, fields(input = %source))]
pub async fn load_source(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        let client = BasicClient::new();
        fetch_bytes(&client, source)
            .await
            .with_context(|| format!("fetching {}", source))?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("reading {}", source))?
    };
    tracing::debug!(bytes = bytes.len(), "Input loaded");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[tokio::test]
    async fn test_load_source_reads_local_file() {
        let path = format!("{}/poutine_index_load_source.json", env::temp_dir().display());
        fs::write(&path, b"{\"prices\": []}").unwrap();

        let bytes = load_source(&path).await.unwrap();
        assert_eq!(bytes, b"{\"prices\": []}");

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_source_missing_file() {
        let err = load_source("/nonexistent/prices_raw.json").await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prices_raw.json"));
    }
}
