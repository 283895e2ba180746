//! Provision-body sources.
//!
//! The quiz core only ever needs the citation identifier; bodies are for
//! the display layer. Two sources are provided: a directory of per-law JSON
//! documents, and a remote article service.
//!
//! File layout for [`FileBodyProvider`]: one `<law name>.json` per law,
//! mapping the canonical article number (`"199"`, `"413-2"`) to the
//! provision text.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use jobun_core::error::StoreError;
use jobun_core::model::Citation;
use jobun_core::traits::CitationBodyProvider;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Looks provisions up in a local directory of per-law JSON documents.
pub struct FileBodyProvider {
    dir: PathBuf,
}

impl FileBodyProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl CitationBodyProvider for FileBodyProvider {
    fn name(&self) -> &str {
        "file store"
    }

    async fn lookup_body(&self, citation: &Citation) -> Result<String, StoreError> {
        let path = self.dir.join(format!("{}.json", citation.law_name));
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::BodyNotFound(citation.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let articles: HashMap<String, String> = serde_json::from_str(&content)?;
        articles
            .get(&citation.article_number)
            .cloned()
            .ok_or_else(|| StoreError::BodyNotFound(citation.to_string()))
    }
}

/// Fetches provisions from a remote article service.
pub struct HttpBodyProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBodyProvider {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[derive(Deserialize)]
struct ArticleResponse {
    body: String,
}

#[async_trait]
impl CitationBodyProvider for HttpBodyProvider {
    fn name(&self) -> &str {
        "article service"
    }

    #[instrument(skip(self, citation), fields(citation = %citation))]
    async fn lookup_body(&self, citation: &Citation) -> Result<String, StoreError> {
        let response = self
            .client
            .get(format!("{}/articles", self.base_url))
            .query(&[
                ("law", citation.law_name.as_str()),
                ("article", citation.article_number.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StoreError::Network(format!(
                        "article service timed out after {DEFAULT_TIMEOUT_SECS}s"
                    ))
                } else if e.is_connect() {
                    StoreError::Network(format!(
                        "article service not reachable at {}",
                        self.base_url
                    ))
                } else {
                    StoreError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(StoreError::BodyNotFound(citation.to_string()));
        }
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Service { status, message });
        }

        let payload: ArticleResponse = response.json().await.map_err(|e| StoreError::Service {
            status: 0,
            message: format!("failed to parse article response: {e}"),
        })?;
        Ok(payload.body)
    }
}
