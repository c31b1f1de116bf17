//! Corpus sources: where a host page gets its article collection from.
//!
//! Two shapes exist in the wild: a plain JSON array of records, and a
//! `{"items": [...]}` wrapper around one. Both are accepted from either
//! source.

use std::path::PathBuf;

use async_trait::async_trait;
use nw_core::{RawArticle, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    List(Vec<RawArticle>),
    Wrapped { items: Vec<RawArticle> },
}

impl Payload {
    fn into_records(self) -> Vec<RawArticle> {
        match self {
            Payload::List(records) => records,
            Payload::Wrapped { items } => items,
        }
    }
}

#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawArticle>>;

    /// Human-readable location, for logs and error messages.
    fn describe(&self) -> String;
}

/// A static JSON document on disk (the `data/articles.json` case).
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ArticleSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<RawArticle>> {
        debug!("Reading article fixture from {}", self.path.display());
        let bytes = tokio::fs::read(&self.path).await?;
        let payload: Payload = serde_json::from_slice(&bytes)?;
        Ok(payload.into_records())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A REST endpoint returning article records as JSON.
pub struct HttpSource {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ArticleSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<RawArticle>> {
        debug!("Fetching articles from {}", self.endpoint);
        let payload: Payload = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(payload.into_records())
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn file_source_reads_a_bare_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "1", "title": "one"}}, {{"id": 2, "title": "two"}}]"#
        )
        .unwrap();

        let source = JsonFileSource::new(file.path());
        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn file_source_reads_an_items_wrapper() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"items": [{{"id": "1", "title": "one"}}]}}"#).unwrap();

        let source = JsonFileSource::new(file.path());
        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id_str().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let source = JsonFileSource::new("/nonexistent/articles.json");
        assert!(source.fetch().await.is_err());
    }
}
