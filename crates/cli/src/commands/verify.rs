//! `sentinel verify` - run the probe suite against a deployed endpoint.

use anyhow::{bail, Result};
use clap::Args;
use sentinel::{verify, HttpProbe, PredictionProbe};

use crate::settings::endpoint_url;
use crate::ui;

/// Run the verification probes against a deployed endpoint.
#[derive(Args)]
pub struct VerifyCommand {
    /// Endpoint hostname or URL (scheme optional).
    endpoint: String,

    /// Health endpoint path.
    #[arg(long, default_value = sentinel::probe::DEFAULT_HEALTH_PATH)]
    path: String,

    /// Also run the functional prediction probe.
    #[arg(long)]
    predict: bool,
}

impl VerifyCommand {
    pub async fn run(&self) -> Result<()> {
        let base = endpoint_url(&self.endpoint);
        ui::print_section(&format!("Verifying {base}"));

        let passed = run_probes(&base, &self.path, self.predict).await?;
        if !passed {
            bail!("Verification failed for {base}");
        }

        ui::print_success("All probes passed");
        Ok(())
    }
}

/// Run the health probe, then optionally the prediction probe. Each
/// probe gets the full retry budget; both must pass.
pub async fn run_probes(base: &str, health_path: &str, predict: bool) -> Result<bool> {
    let health = HttpProbe::new(format!("{base}{health_path}"))?;
    ui::print_info(&format!("Health probe: GET {}", health.url()));

    if verify(|| health.check()).await {
        ui::print_success("Health probe passed");
    } else {
        ui::print_error("Health probe failed");
        return Ok(false);
    }

    if predict {
        let prediction = PredictionProbe::new(base)?;
        ui::print_info(&format!("Prediction probe: POST {base}{}", sentinel::probe::PREDICT_PATH));

        if verify(|| prediction.check()).await {
            ui::print_success("Prediction probe passed");
        } else {
            ui::print_error("Prediction probe failed");
            return Ok(false);
        }
    }

    Ok(true)
}
