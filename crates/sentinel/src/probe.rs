//! HTTP probes for the deployed classifier API.
//!
//! Two probes run after a resource reaches Ready: a health check against
//! the service's `/health` endpoint, and one functional probe that posts
//! a small base64 image to `/predict-base64` and expects a prediction
//! back. Both report booleans; transport errors are failures, not
//! exceptions.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, warn};

/// Default timeout for a single probe request.
const PROBE_TIMEOUT_SECS: u64 = 10;

/// Default health endpoint path on the deployed API.
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// Prediction endpoint path on the deployed API.
pub const PREDICT_PATH: &str = "/predict-base64";

/// A 1x1 PNG, base64-encoded. Enough to exercise the full decode,
/// preprocess, and inference path without shipping a fixture file.
const SAMPLE_IMAGE_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

fn probe_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")
}

/// Health probe: GET against an endpoint, success on any 2xx status.
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    /// Create a probe for the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: probe_client()?,
            url: url.into(),
        })
    }

    /// The URL this probe targets.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run the probe once.
    pub async fn check(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!(url = %self.url, status = %status, "Health probe response");
                status.is_success()
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "Health probe request failed");
                false
            }
        }
    }
}

/// Functional probe: POST a sample image, expect a prediction back.
pub struct PredictionProbe {
    client: Client,
    url: String,
}

impl PredictionProbe {
    /// Create a probe for the API at `base_url` (scheme + host).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: probe_client()?,
            url: format!("{}{}", base_url.trim_end_matches('/'), PREDICT_PATH),
        })
    }

    /// Run the probe once. Success requires a 2xx status and a JSON body
    /// carrying a `prediction` field.
    pub async fn check(&self) -> bool {
        let body = serde_json::json!({ "image": SAMPLE_IMAGE_B64 });

        let response = match self.client.post(&self.url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %self.url, error = %e, "Prediction probe request failed");
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = %status, "Prediction probe rejected");
            return false;
        }

        match response.json::<serde_json::Value>().await {
            Ok(json) => {
                let has_prediction = json.get("prediction").is_some();
                debug!(url = %self.url, has_prediction, "Prediction probe response");
                has_prediction
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "Prediction probe returned non-JSON body");
                false
            }
        }
    }
}
