//! Location service client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use s11_core::result::AppResult;

/// Last known location as reported by the location service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    /// `[latitude, longitude]`.
    pub coordinates: [f64; 2],
    /// `"YYYY-MM-DD hh:mm:ss"`.
    pub timestamp: String,
}

impl LocationReport {
    /// The date part of the timestamp, used as the marker label.
    pub fn date_label(&self) -> &str {
        self.timestamp.split(' ').next().unwrap_or_default()
    }
}

/// Source of the traveller's current location.
#[async_trait]
pub trait LocationService: Send + Sync {
    /// Fetches the last known location.
    async fn current_location(&self) -> AppResult<LocationReport>;
}

/// Location service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLocationService {
    client: reqwest::Client,
    url: String,
}

impl HttpLocationService {
    /// Creates a client for the given endpoint.
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl LocationService for HttpLocationService {
    async fn current_location(&self) -> AppResult<LocationReport> {
        debug!(url = %self.url, "Fetching current location");
        let report = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<LocationReport>()
            .await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_parses_service_payload() {
        let report: LocationReport = serde_json::from_str(
            r#"{"coordinates": [13.7563, 100.5018], "timestamp": "2017-03-01 18:42:07"}"#,
        )
        .expect("parse");
        assert_eq!(report.coordinates, [13.7563, 100.5018]);
        assert_eq!(report.date_label(), "2017-03-01");
    }

    #[test]
    fn test_date_label_without_time() {
        let report = LocationReport {
            coordinates: [0.0, 0.0],
            timestamp: "2017-03-01".to_string(),
        };
        assert_eq!(report.date_label(), "2017-03-01");
    }
}
