//! HTTP category source
//!
//! Fetches the categories list with `reqwest` for native runs.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{decode_categories, CategoryRecord, CategorySource, RefreshError};

/// Unauthenticated `GET` against the categories endpoint
#[derive(Debug, Clone)]
pub struct HttpCategorySource {
    client: Client,
    url: String,
}

impl HttpCategorySource {
    /// Source for an absolute endpoint URL
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RefreshError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RefreshError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl CategorySource for HttpCategorySource {
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, RefreshError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RefreshError::Network(format!("Request timed out: {}", e))
                } else {
                    RefreshError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        let records = decode_categories(&body)?;
        tracing::debug!("Fetched {} categories from {}", records.len(), self.url);
        Ok(records)
    }
}
