use std::fmt;

/// The one user-facing failure: a dataset could not be fetched, or the payload
/// that came back is not usable. Everything else in the pipeline is internal
/// plumbing and travels as `anyhow::Error`.
#[derive(Debug, Clone)]
pub struct NetworkError {
    pub dataset: String,
    pub reason: String,
}

impl NetworkError {
    pub fn new(dataset: &str, reason: impl Into<String>) -> Self {
        Self {
            dataset: dataset.to_string(),
            reason: reason.into(),
        }
    }

    /// Banner text shown in place of the chart when a view fails.
    pub fn user_message(&self) -> String {
        format!(
            "**This demo requires internet access.**\n\nConnection error: {}",
            self.reason
        )
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dataset '{}' unavailable: {}", self.dataset, self.reason)
    }
}

impl std::error::Error for NetworkError {}
