//! Kubernetes-backed status queries.
//!
//! LoadBalancer hostname and Deployment rollout status come straight
//! from the API server via typed objects, the same signals `kubectl get
//! svc -o jsonpath` and `kubectl rollout status` read.

use std::path::Path;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::api::Api;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::provider::StatusProvider;
use crate::resource::{PollResult, ResourceKind, WatchedResource};

/// Status provider backed by the Kubernetes API.
pub struct KubeProvider {
    client: Client,
}

impl KubeProvider {
    /// Create a provider from a kubeconfig file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the kubeconfig cannot be read or the client
    /// cannot be created.
    pub async fn from_kubeconfig(path: &Path) -> Result<Self> {
        let kubeconfig = Kubeconfig::read_from(path)
            .with_context(|| format!("Failed to read kubeconfig from {}", path.display()))?;

        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .context("Failed to create Kubernetes config from kubeconfig")?;

        let client = Client::try_from(config).context("Failed to create Kubernetes client")?;

        Ok(Self { client })
    }

    /// Create a provider from the ambient configuration (`KUBECONFIG`,
    /// `~/.kube/config`, or in-cluster).
    ///
    /// # Errors
    ///
    /// Returns an error if no usable configuration is found.
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default()
            .await
            .context("Failed to create Kubernetes client from ambient config")?;
        Ok(Self { client })
    }

    async fn service_status(&self, resource: &WatchedResource) -> Result<PollResult> {
        let api: Api<Service> =
            Api::namespaced(self.client.clone(), resource.namespace_or_default());

        match api.get(&resource.identifier).await {
            Ok(service) => Ok(service_result(&service)),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(PollResult::failed(format!(
                "service {} not found",
                resource.identifier
            ))),
            Err(e) => Err(e).context("Failed to get Service"),
        }
    }

    async fn rollout_status(&self, resource: &WatchedResource) -> Result<PollResult> {
        let api: Api<Deployment> =
            Api::namespaced(self.client.clone(), resource.namespace_or_default());

        match api.get(&resource.identifier).await {
            Ok(deployment) => Ok(rollout_result(&deployment)),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(PollResult::failed(format!(
                "deployment {} not found",
                resource.identifier
            ))),
            Err(e) => Err(e).context("Failed to get Deployment"),
        }
    }
}

#[async_trait]
impl StatusProvider for KubeProvider {
    async fn query_status(&self, resource: &WatchedResource) -> Result<PollResult> {
        match resource.kind {
            ResourceKind::LoadBalancerService => self.service_status(resource).await,
            ResourceKind::DeploymentRollout => self.rollout_status(resource).await,
            ResourceKind::NodeGroup | ResourceKind::CloudFormationStack => {
                bail!("{} is not a Kubernetes resource kind", resource.kind)
            }
        }
    }
}

/// Readiness of a LoadBalancer Service. Ready once the cloud controller
/// has published an ingress hostname or IP; the detail carries it so
/// callers can probe the endpoint.
fn service_result(service: &Service) -> PollResult {
    let ingress = service
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .and_then(|ingress| ingress.first());

    match ingress.and_then(|i| i.hostname.clone().or_else(|| i.ip.clone())) {
        Some(endpoint) => PollResult::ready(endpoint),
        None => PollResult::pending("load balancer hostname not yet assigned"),
    }
}

/// Readiness of a Deployment rollout, mirroring what `kubectl rollout
/// status` checks: the controller has observed the latest generation,
/// every replica is updated and available, and the Progressing condition
/// has not tripped its deadline.
fn rollout_result(deployment: &Deployment) -> PollResult {
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);

    let Some(status) = deployment.status.as_ref() else {
        return PollResult::pending("no status reported yet");
    };

    if let Some(conditions) = &status.conditions {
        let exceeded = conditions.iter().any(|c| {
            c.type_ == "Progressing" && c.reason.as_deref() == Some("ProgressDeadlineExceeded")
        });
        if exceeded {
            return PollResult::failed("progress deadline exceeded");
        }
    }

    if status.observed_generation < deployment.metadata.generation {
        return PollResult::pending("controller has not observed the latest generation");
    }

    let updated = status.updated_replicas.unwrap_or(0);
    let available = status.available_replicas.unwrap_or(0);

    if updated == desired && available == desired {
        PollResult::ready(format!("{available}/{desired} replicas available"))
    } else {
        PollResult::pending(format!(
            "{updated}/{desired} updated, {available}/{desired} available"
        ))
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::apps::v1::{DeploymentCondition, DeploymentSpec, DeploymentStatus};
    use k8s_openapi::api::core::v1::{LoadBalancerIngress, LoadBalancerStatus, ServiceStatus};
    use kube::api::ObjectMeta;

    use super::*;
    use crate::resource::PollState;

    fn service_with_ingress(hostname: Option<&str>, ip: Option<&str>) -> Service {
        Service {
            status: Some(ServiceStatus {
                load_balancer: Some(LoadBalancerStatus {
                    ingress: Some(vec![LoadBalancerIngress {
                        hostname: hostname.map(String::from),
                        ip: ip.map(String::from),
                        ..Default::default()
                    }]),
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn deployment(
        generation: i64,
        observed: i64,
        desired: i32,
        updated: i32,
        available: i32,
    ) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                generation: Some(generation),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(desired),
                ..Default::default()
            }),
            status: Some(DeploymentStatus {
                observed_generation: Some(observed),
                updated_replicas: Some(updated),
                available_replicas: Some(available),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_service_ready_with_hostname() {
        let svc = service_with_ingress(Some("abc.elb.us-east-1.amazonaws.com"), None);
        let result = service_result(&svc);
        assert_eq!(result.state, PollState::Ready);
        assert_eq!(result.detail, "abc.elb.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_service_ready_with_bare_ip() {
        let svc = service_with_ingress(None, Some("203.0.113.10"));
        let result = service_result(&svc);
        assert_eq!(result.state, PollState::Ready);
        assert_eq!(result.detail, "203.0.113.10");
    }

    #[test]
    fn test_service_pending_without_ingress() {
        let svc = Service::default();
        assert_eq!(service_result(&svc).state, PollState::Pending);
    }

    #[test]
    fn test_rollout_ready_when_replicas_settled() {
        let result = rollout_result(&deployment(2, 2, 2, 2, 2));
        assert_eq!(result.state, PollState::Ready);
        assert_eq!(result.detail, "2/2 replicas available");
    }

    #[test]
    fn test_rollout_pending_while_surging() {
        let result = rollout_result(&deployment(2, 2, 2, 1, 1));
        assert_eq!(result.state, PollState::Pending);
        assert_eq!(result.detail, "1/2 updated, 1/2 available");
    }

    #[test]
    fn test_rollout_pending_until_generation_observed() {
        // Replica counts look settled but describe the previous spec.
        let result = rollout_result(&deployment(3, 2, 2, 2, 2));
        assert_eq!(result.state, PollState::Pending);
    }

    #[test]
    fn test_rollout_failed_past_progress_deadline() {
        let mut dep = deployment(2, 2, 2, 1, 1);
        dep.status.as_mut().unwrap().conditions = Some(vec![DeploymentCondition {
            type_: "Progressing".into(),
            status: "False".into(),
            reason: Some("ProgressDeadlineExceeded".into()),
            ..Default::default()
        }]);
        assert_eq!(rollout_result(&dep).state, PollState::Failed);
    }
}
