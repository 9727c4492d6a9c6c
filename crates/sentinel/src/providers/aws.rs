//! AWS-backed status queries via the `aws` CLI.
//!
//! Node group and CloudFormation stack status come from `aws eks
//! describe-nodegroup` and `aws cloudformation describe-stacks`, the same
//! calls the deploy tooling drives by hand. Output is requested as JSON
//! and parsed; the status strings are classified into poll states by the
//! pure functions at the bottom of this module.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::provider::StatusProvider;
use crate::resource::{PollResult, PollState, ResourceKind, WatchedResource};

/// Status provider backed by the `aws` CLI.
pub struct AwsCliProvider {
    region: String,
}

impl AwsCliProvider {
    /// Create a provider querying the given region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    /// Run an `aws` subcommand and parse its JSON output.
    ///
    /// A non-zero exit with a not-found message is surfaced as
    /// `Ok(None)` so callers can classify it as a terminal failure; any
    /// other non-zero exit is an error (the waiter treats it as one
    /// Unknown poll).
    async fn aws_json(&self, args: &[&str]) -> Result<Option<Value>> {
        let output = Command::new("aws")
            .args(args)
            .args(["--region", &self.region, "--output", "json"])
            .output()
            .await
            .context("Failed to run aws - is the AWS CLI installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if is_not_found(stderr) {
                debug!(args = ?args, "Resource not found");
                return Ok(None);
            }
            bail!("aws {} failed: {stderr}", args.join(" "));
        }

        let json = serde_json::from_slice(&output.stdout)
            .context("Failed to parse aws CLI output as JSON")?;
        Ok(Some(json))
    }

    async fn nodegroup_status(&self, resource: &WatchedResource) -> Result<PollResult> {
        let (cluster, nodegroup) = resource.cluster_and_nodegroup()?;

        let json = self
            .aws_json(&[
                "eks",
                "describe-nodegroup",
                "--cluster-name",
                cluster,
                "--nodegroup-name",
                nodegroup,
            ])
            .await?;

        let Some(json) = json else {
            return Ok(PollResult::failed(format!(
                "node group {nodegroup} not found in cluster {cluster}"
            )));
        };

        let status = json
            .get("nodegroup")
            .and_then(|n| n.get("status"))
            .and_then(|s| s.as_str())
            .unwrap_or("UNKNOWN");

        Ok(PollResult::new(classify_nodegroup_status(status), status))
    }

    async fn stack_status(&self, resource: &WatchedResource) -> Result<PollResult> {
        let json = self
            .aws_json(&[
                "cloudformation",
                "describe-stacks",
                "--stack-name",
                &resource.identifier,
            ])
            .await?;

        let Some(json) = json else {
            return Ok(PollResult::failed(format!(
                "stack {} does not exist",
                resource.identifier
            )));
        };

        let status = json
            .get("Stacks")
            .and_then(|s| s.get(0))
            .and_then(|s| s.get("StackStatus"))
            .and_then(|s| s.as_str())
            .unwrap_or("UNKNOWN");

        Ok(PollResult::new(classify_stack_status(status), status))
    }

    /// Toggle CloudFormation termination protection for a stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the CLI invocation fails.
    pub async fn set_termination_protection(&self, stack: &str, enabled: bool) -> Result<()> {
        let flag = if enabled {
            "--enable-termination-protection"
        } else {
            "--no-enable-termination-protection"
        };

        let output = Command::new("aws")
            .args([
                "cloudformation",
                "update-termination-protection",
                "--stack-name",
                stack,
                flag,
                "--region",
                &self.region,
            ])
            .output()
            .await
            .context("Failed to run aws - is the AWS CLI installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Failed to update termination protection for {stack}: {}",
                stderr.trim()
            );
        }

        Ok(())
    }
}

#[async_trait]
impl StatusProvider for AwsCliProvider {
    async fn query_status(&self, resource: &WatchedResource) -> Result<PollResult> {
        match resource.kind {
            ResourceKind::NodeGroup => self.nodegroup_status(resource).await,
            ResourceKind::CloudFormationStack => self.stack_status(resource).await,
            ResourceKind::LoadBalancerService | ResourceKind::DeploymentRollout => {
                bail!("{} is not an AWS-backed resource kind", resource.kind)
            }
        }
    }
}

fn is_not_found(stderr: &str) -> bool {
    stderr.contains("ResourceNotFoundException") || stderr.contains("does not exist")
}

/// Classify an EKS node group status string.
fn classify_nodegroup_status(status: &str) -> PollState {
    match status {
        "ACTIVE" => PollState::Ready,
        "CREATING" | "UPDATING" | "DELETING" => PollState::Pending,
        "CREATE_FAILED" | "DELETE_FAILED" | "DEGRADED" => PollState::Failed,
        _ => PollState::Unknown,
    }
}

/// Classify a CloudFormation stack status string.
///
/// Rollback states count as failures even once stable: the stack settled,
/// but the change it was supposed to apply did not land.
fn classify_stack_status(status: &str) -> PollState {
    if status.contains("ROLLBACK") || status.contains("FAILED") {
        if status.ends_with("_IN_PROGRESS") {
            return PollState::Pending;
        }
        return PollState::Failed;
    }
    if status.ends_with("_COMPLETE") {
        return PollState::Ready;
    }
    if status.ends_with("_IN_PROGRESS") {
        return PollState::Pending;
    }
    PollState::Unknown
}
