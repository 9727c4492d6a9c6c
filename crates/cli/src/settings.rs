//! Shared watch options and provider wiring.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use sentinel::{AwsCliProvider, KubeProvider, ResourceKind, StatusProvider, Waiter};

/// Options shared by every command that watches a resource.
#[derive(Args, Debug, Clone)]
pub struct WatchOpts {
    /// AWS region for aws CLI queries.
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Seconds between status queries.
    #[arg(long, env = "SENTINEL_POLL_INTERVAL", default_value_t = 15)]
    pub interval: u64,

    /// Maximum seconds to wait before giving up.
    #[arg(long, env = "SENTINEL_MAX_WAIT", default_value_t = 900)]
    pub max_wait: u64,

    /// Kubeconfig file for Kubernetes queries (defaults to ambient config).
    #[arg(long, env = "SENTINEL_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,
}

impl WatchOpts {
    /// Build a waiter from the configured interval and deadline.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero interval or a deadline that does not
    /// exceed the interval.
    pub fn waiter(&self) -> Result<Waiter> {
        Waiter::new(
            Duration::from_secs(self.interval),
            Duration::from_secs(self.max_wait),
        )
        .context("Invalid watch configuration")
    }

    /// Build the status provider appropriate for a resource kind.
    ///
    /// # Errors
    ///
    /// Returns an error if a Kubernetes client cannot be constructed.
    pub async fn provider_for(&self, kind: ResourceKind) -> Result<Box<dyn StatusProvider>> {
        match kind {
            ResourceKind::NodeGroup | ResourceKind::CloudFormationStack => {
                Ok(Box::new(AwsCliProvider::new(&self.region)))
            }
            ResourceKind::LoadBalancerService | ResourceKind::DeploymentRollout => {
                let provider = match &self.kubeconfig {
                    Some(path) => KubeProvider::from_kubeconfig(path).await?,
                    None => KubeProvider::try_default().await?,
                };
                Ok(Box::new(provider))
            }
        }
    }
}

/// Turn a bare hostname from a LoadBalancer status into a probe URL.
/// Hostnames from `kubectl get svc` carry no scheme.
pub fn endpoint_url(host_or_url: &str) -> String {
    let trimmed = host_or_url.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_adds_scheme() {
        assert_eq!(
            endpoint_url("abc.elb.us-east-1.amazonaws.com"),
            "http://abc.elb.us-east-1.amazonaws.com"
        );
        assert_eq!(
            endpoint_url("http://abc.elb.us-east-1.amazonaws.com/"),
            "http://abc.elb.us-east-1.amazonaws.com"
        );
        assert_eq!(endpoint_url("https://api.example.com"), "https://api.example.com");
    }
}
