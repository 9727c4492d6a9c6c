//! `sentinel deploy` - the full deploy, poll-until-ready, verify pipeline.
//!
//! Sequences the waits the deploy scripts perform one after another:
//! preflight, optional node group wait, manifest apply, rollout wait,
//! load balancer wait, then the HTTP probe suite against the published
//! hostname.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use sentinel::ResourceKind;
use tracing::info;

use crate::commands::{preflight, verify, wait};
use crate::settings::{endpoint_url, WatchOpts};
use crate::ui;

const TOTAL_STEPS: u8 = 6;

/// Run the full deploy-wait-verify pipeline.
#[derive(Args)]
pub struct DeployCommand {
    /// Application name; used for the Deployment and (by default) the
    /// Service.
    name: String,

    /// Kubernetes namespace.
    #[arg(short, long, default_value = "default")]
    namespace: String,

    /// Service name, when it differs from the application name.
    #[arg(long)]
    service: Option<String>,

    /// Node group to wait for before deploying (cluster/nodegroup).
    #[arg(long)]
    nodegroup: Option<String>,

    /// Manifest file or directory to apply with kubectl.
    #[arg(long, value_name = "PATH")]
    manifests: Option<PathBuf>,

    /// Skip the HTTP probes after the rollout.
    #[arg(long)]
    skip_verify: bool,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,

    #[command(flatten)]
    opts: WatchOpts,
}

impl DeployCommand {
    pub async fn run(&self) -> Result<()> {
        ui::print_section(&format!("Deploying {}/{}", self.namespace, self.name));

        if !self.yes {
            let proceed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!(
                    "Deploy {} to namespace {}?",
                    self.name, self.namespace
                ))
                .default(true)
                .interact()?;

            if !proceed {
                ui::print_warning("Deployment cancelled");
                return Ok(());
            }
        }

        // Step 1: preflight
        ui::print_progress_step(1, TOTAL_STEPS, "Checking prerequisites");
        preflight::ensure_ready()?;

        // Step 2: node group (when the cluster is still coming up)
        ui::print_progress_step(2, TOTAL_STEPS, "Waiting for node group");
        if let Some(nodegroup) = &self.nodegroup {
            let outcome = self
                .wait_for(ResourceKind::NodeGroup, nodegroup)
                .await?;
            if !outcome.is_ready() {
                bail!("Node group {} {}", nodegroup, outcome.state);
            }
        } else {
            ui::print_info("No node group specified, skipping");
        }

        // Step 3: apply manifests
        ui::print_progress_step(3, TOTAL_STEPS, "Applying manifests");
        if let Some(manifests) = &self.manifests {
            self.kubectl_apply(manifests).await?;
        } else {
            ui::print_info("No manifests specified, skipping");
        }

        // Step 4: rollout
        ui::print_progress_step(4, TOTAL_STEPS, "Waiting for rollout");
        let rollout = self
            .wait_for(ResourceKind::DeploymentRollout, &self.name)
            .await?;
        if !rollout.is_ready() {
            bail!("Rollout of {} {}", self.name, rollout.state);
        }

        // Step 5: load balancer hostname
        ui::print_progress_step(5, TOTAL_STEPS, "Waiting for load balancer hostname");
        let service_name = self.service.clone().unwrap_or_else(|| self.name.clone());
        let service = self
            .wait_for(ResourceKind::LoadBalancerService, &service_name)
            .await?;
        if !service.is_ready() {
            bail!("Service {} {}", service_name, service.state);
        }
        let endpoint = endpoint_url(&service.detail);
        ui::print_info(&format!("Endpoint: {endpoint}"));

        // Step 6: verification probes
        ui::print_progress_step(6, TOTAL_STEPS, "Verifying the deployed API");
        let service = if self.skip_verify {
            ui::print_info("Verification skipped");
            service
        } else {
            let passed =
                verify::run_probes(&endpoint, sentinel::probe::DEFAULT_HEALTH_PATH, true).await?;
            let service = service.with_verification(passed);
            if !passed {
                bail!(
                    "Deployment is up but verification failed - {} never answered the probes",
                    endpoint
                );
            }
            service
        };

        info!(endpoint = %endpoint, polls = service.polls, "Deployment complete");
        self.print_summary(&endpoint);
        Ok(())
    }

    async fn wait_for(&self, kind: ResourceKind, name: &str) -> Result<sentinel::WaitOutcome> {
        let resource = wait::build_resource(kind, name, &self.namespace)?;

        let provider = self.opts.provider_for(kind).await?;
        let waiter = self
            .opts
            .waiter()?
            .with_poll_hook(Box::new(ui::print_poll));

        let outcome = waiter.wait_until_ready(provider.as_ref(), &resource).await?;
        ui::print_wait_summary(&outcome);
        Ok(outcome)
    }

    /// Apply a manifest file or directory with kubectl.
    async fn kubectl_apply(&self, path: &Path) -> Result<()> {
        let mut cmd = tokio::process::Command::new("kubectl");
        cmd.args(["apply", "-n", &self.namespace, "-f"]).arg(path);
        if let Some(kubeconfig) = &self.opts.kubeconfig {
            cmd.arg("--kubeconfig").arg(kubeconfig);
        }

        let output = cmd
            .output()
            .await
            .context("Failed to run kubectl - is it installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("kubectl apply failed: {}", stderr.trim());
        }

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            ui::print_info(line);
        }
        Ok(())
    }

    fn print_summary(&self, endpoint: &str) {
        ui::print_section("Deployment Complete");
        ui::print_success(&format!("{}/{} is live", self.namespace, self.name));
        ui::print_info(&format!("Health:  GET  {endpoint}/health"));
        ui::print_info(&format!("Predict: POST {endpoint}/predict-base64"));
    }
}
