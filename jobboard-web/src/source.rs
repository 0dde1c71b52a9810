//! Categories fetched with `gloo-net`

use async_trait::async_trait;
use gloo_net::http::Request;
use jobboard::categories::{decode_categories, CategoryRecord, CategorySource, RefreshError};

/// `GET` against the categories endpoint, relative to the page origin
/// unless the URL is absolute
#[derive(Debug, Clone)]
pub struct FetchCategorySource {
    url: String,
}

impl FetchCategorySource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait(?Send)]
impl CategorySource for FetchCategorySource {
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, RefreshError> {
        let response = Request::get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(RefreshError::Status(response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        decode_categories(&body)
    }
}
