//! Category Refresher
//!
//! Keeps the "N jobs available" labels of category cards current by polling
//! the categories endpoint. A cycle fetches the full list and patches every
//! card whose `data-category-id` matches a record. Failed cycles are logged
//! and skipped; polling never stops and never backs off.
//!
//! Cycles are independent: a slow response may resolve after a newer one,
//! in which case the last response processed wins.

#[cfg(not(target_arch = "wasm32"))]
mod http;

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpCategorySource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

use crate::document::{Document, Element, Selector};
use crate::scheduler::{Scheduler, TaskHandle};

/// Endpoint path, relative to the site root
pub const CATEGORIES_PATH: &str = "/api/categories/";

/// Default delay between cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

pub const CONTAINER_CLASS: &str = "category-card-container";
pub const CATEGORY_ID_ATTR: &str = "data-category-id";
pub const JOB_COUNT_CLASS: &str = "category-job-count";

/// Category identifier as sent by the API (any JSON number or a string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryId {
    Number(serde_json::Number),
    Text(String),
}

impl From<i64> for CategoryId {
    fn from(id: i64) -> Self {
        CategoryId::Number(id.into())
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        CategoryId::Text(id.to_string())
    }
}

/// Renders like a JS template literal: integral floats drop the `.0`
impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryId::Number(n) if n.is_f64() => match n.as_f64() {
                Some(v) if v.fract() == 0.0 && v.abs() < 1e21 => write!(f, "{:.0}", v),
                Some(v) => write!(f, "{}", v),
                None => write!(f, "{}", n),
            },
            CategoryId::Number(n) => write!(f, "{}", n),
            CategoryId::Text(s) => f.write_str(s),
        }
    }
}

/// One entry of the categories payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub job_count: u64,
}

/// Label shown under a category card
pub fn job_count_label(job_count: u64) -> String {
    format!("{} jobs available", job_count)
}

/// Why a refresh cycle was skipped
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The endpoint answered with a non-2xx status
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The body was not a list of category records
    #[error("Malformed categories payload: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for RefreshError {
    fn from(err: serde_json::Error) -> Self {
        RefreshError::Decode(err.to_string())
    }
}

/// Decode a categories response body
pub fn decode_categories(body: &str) -> Result<Vec<CategoryRecord>, RefreshError> {
    Ok(serde_json::from_str(body)?)
}

/// Supplies the current category list
#[async_trait(?Send)]
pub trait CategorySource {
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, RefreshError>;
}

/// Outcome of patching one category list into the page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Labels rewritten
    pub updated: usize,
    /// Records with no matching card (or card without a label)
    pub unmatched: usize,
}

/// Selector of the card container for `id`
pub fn container_selector(id: &CategoryId) -> Selector {
    Selector::class(CONTAINER_CLASS).with_attr_value(CATEGORY_ID_ATTR, id.to_string())
}

/// Write each record's job count into its card
pub fn apply_categories<D: Document>(doc: &D, records: &[CategoryRecord]) -> ApplySummary {
    let mut summary = ApplySummary::default();
    let label = Selector::class(JOB_COUNT_CLASS);

    for record in records {
        let target = doc
            .query(&container_selector(&record.id))
            .and_then(|container| container.query(&label));
        match target {
            Some(count) => {
                count.set_text(&job_count_label(record.job_count));
                summary.updated += 1;
            }
            None => summary.unmatched += 1,
        }
    }

    summary
}

/// Whether the page has any category card to keep current
pub fn has_category_cards<D: Document>(doc: &D) -> bool {
    doc.query(&Selector::class(CONTAINER_CLASS)).is_some()
}

/// Periodic fetch-and-patch loop over one page
pub struct CategoryRefresher<D: Document> {
    doc: D,
    source: Rc<dyn CategorySource>,
    interval: Duration,
}

impl<D: Document> CategoryRefresher<D> {
    pub fn new(doc: D, source: Rc<dyn CategorySource>, interval: Duration) -> Self {
        Self {
            doc,
            source,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one cycle. On error the page is left untouched.
    pub async fn refresh(&self) -> Result<ApplySummary, RefreshError> {
        let records = self.source.fetch_categories().await?;
        Ok(apply_categories(&self.doc, &records))
    }

    /// Fetch now, then every interval, until the handle is cancelled.
    ///
    /// Returns `None` without fetching when the page has no category cards.
    pub fn start<S>(self, scheduler: &S) -> Option<TaskHandle>
    where
        S: Scheduler + Clone + 'static,
    {
        if !has_category_cards(&self.doc) {
            tracing::debug!("No category cards on page, refresher not started");
            return None;
        }

        let this = Rc::new(self);
        tracing::info!(
            "Refreshing category counts every {}ms",
            this.interval.as_millis()
        );

        scheduler.spawn(Box::pin(run_cycle(Rc::clone(&this))));

        let spawner = scheduler.clone();
        let period = this.interval;
        let handle = scheduler.interval(
            period,
            Box::new(move || spawner.spawn(Box::pin(run_cycle(Rc::clone(&this))))),
        );
        Some(handle)
    }
}

async fn run_cycle<D: Document>(refresher: Rc<CategoryRefresher<D>>) {
    match refresher.refresh().await {
        Ok(summary) => tracing::info!(
            "Category counts refreshed: {} updated, {} unmatched",
            summary.updated,
            summary.unmatched
        ),
        Err(e) => tracing::error!("Error fetching categories: {}", e),
    }
}
