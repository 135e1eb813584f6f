//! Dataset loading behind an injectable capability: production fetches over
//! HTTP, tests substitute a fixed in-memory table.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::error::NetworkError;
use crate::logging::{json_log, obj, v_num, v_str, Domain};
use crate::table::{analyze_csv, MetricTable, GAP_REQUIRED, NOISE_REQUIRED};

/// Identifier of the decomposition dataset.
pub const GAP_DATASET: &str = "gap_decomposition";
/// Identifier of the noise-sweep dataset.
pub const NOISE_DATASET: &str = "noise_sweep";

fn required_columns(dataset: &str) -> &'static [&'static str] {
    match dataset {
        GAP_DATASET => &GAP_REQUIRED,
        NOISE_DATASET => &NOISE_REQUIRED,
        _ => &[],
    }
}

/// The loader contract: one dataset id in, a table or a `NetworkError` out.
/// No retry, no backoff; the caller decides what a failure means for the view.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch(&self, dataset: &str) -> Result<MetricTable, NetworkError>;
}

/// HTTP source with a page-local memo cache: each dataset is fetched at most
/// once per process, interactions after that hit the cache.
pub struct HttpSource {
    client: Client,
    urls: HashMap<String, String>,
    cache: Arc<Mutex<HashMap<String, MetricTable>>>,
}

impl HttpSource {
    pub fn new(cfg: &Config) -> Self {
        let mut urls = HashMap::new();
        urls.insert(GAP_DATASET.to_string(), cfg.gap_url.clone());
        urls.insert(NOISE_DATASET.to_string(), cfg.noise_url.clone());
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(cfg.http_timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
            urls,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn fetch_fresh(&self, dataset: &str, url: &str) -> Result<MetricTable, NetworkError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NetworkError::new(dataset, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NetworkError::new(
                dataset,
                format!("http status {}", resp.status()),
            ));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| NetworkError::new(dataset, e.to_string()))?;

        let report = analyze_csv(&body)
            .map_err(|e| NetworkError::new(dataset, format!("unreadable payload: {}", e)))?;
        json_log(
            Domain::Fetch,
            "dataset_quality",
            obj(&[
                ("dataset", v_str(dataset)),
                ("rows", v_num(report.rows as f64)),
                ("bad_rows", v_num(report.bad_rows as f64)),
                ("hash", v_str(&report.hash_sha256)),
            ]),
        );

        let table = MetricTable::parse_csv(&body)
            .map_err(|e| NetworkError::new(dataset, format!("malformed csv: {}", e)))?;

        let missing = table.missing_columns(required_columns(dataset));
        if !missing.is_empty() {
            return Err(NetworkError::new(
                dataset,
                format!("malformed dataset, missing columns: {}", missing.join(", ")),
            ));
        }

        Ok(table)
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    async fn fetch(&self, dataset: &str) -> Result<MetricTable, NetworkError> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(table) = cache.get(dataset) {
                json_log(
                    Domain::Fetch,
                    "cache_hit",
                    obj(&[("dataset", v_str(dataset))]),
                );
                return Ok(table.clone());
            }
        }

        let url = self
            .urls
            .get(dataset)
            .ok_or_else(|| NetworkError::new(dataset, "unknown dataset id"))?
            .clone();

        let table = self.fetch_fresh(dataset, &url).await?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(dataset.to_string(), table.clone());
        }
        Ok(table)
    }
}

/// Fixed tables keyed by dataset id. The test double for the loader, also
/// usable for offline rendering from local snapshots.
#[derive(Default)]
pub struct FixedSource {
    tables: HashMap<String, MetricTable>,
}

impl FixedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, dataset: &str, table: MetricTable) -> Self {
        self.tables.insert(dataset.to_string(), table);
        self
    }
}

#[async_trait]
impl DatasetSource for FixedSource {
    async fn fetch(&self, dataset: &str) -> Result<MetricTable, NetworkError> {
        self.tables
            .get(dataset)
            .cloned()
            .ok_or_else(|| NetworkError::new(dataset, "no fixture registered"))
    }
}
