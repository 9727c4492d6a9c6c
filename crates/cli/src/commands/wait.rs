//! `sentinel wait` - watch one resource until it reaches a terminal state.

use anyhow::{bail, Result};
use clap::Args;
use sentinel::{ResourceKind, WatchedResource};

use crate::settings::WatchOpts;
use crate::ui;

/// Wait for a resource to become ready.
#[derive(Args)]
pub struct WaitCommand {
    /// Resource kind: nodegroup, service, rollout, or stack.
    kind: String,

    /// Resource name. Node groups use cluster/nodegroup.
    name: String,

    /// Kubernetes namespace for service and rollout watches.
    #[arg(short, long, default_value = "default")]
    namespace: String,

    #[command(flatten)]
    opts: WatchOpts,
}

impl WaitCommand {
    pub async fn run(&self) -> Result<()> {
        let kind: ResourceKind = self.kind.parse()?;
        if !kind.is_namespaced() && self.namespace != "default" {
            ui::print_warning(&format!("--namespace is ignored for {kind} watches"));
        }
        let resource = build_resource(kind, &self.name, &self.namespace)?;

        ui::print_section(&format!("Watching {resource}"));
        ui::print_info(&format!(
            "Polling every {}s, timeout {}s",
            self.opts.interval, self.opts.max_wait
        ));

        let provider = self.opts.provider_for(kind).await?;
        let waiter = self
            .opts
            .waiter()?
            .with_poll_hook(Box::new(ui::print_poll));

        let outcome = waiter.wait_until_ready(provider.as_ref(), &resource).await?;

        println!();
        ui::print_wait_summary(&outcome);

        if !outcome.is_ready() {
            bail!(
                "{} {} after {}s",
                outcome.resource,
                outcome.state,
                outcome.elapsed.as_secs()
            );
        }
        Ok(())
    }
}

/// Build the watched resource from CLI arguments.
pub fn build_resource(kind: ResourceKind, name: &str, namespace: &str) -> Result<WatchedResource> {
    let resource = match kind {
        ResourceKind::NodeGroup => {
            let Some((cluster, nodegroup)) = name.split_once('/') else {
                bail!("Node group name must be cluster/nodegroup, got: {name}");
            };
            WatchedResource::nodegroup(cluster, nodegroup)
        }
        ResourceKind::LoadBalancerService => WatchedResource::service(namespace, name),
        ResourceKind::DeploymentRollout => WatchedResource::rollout(namespace, name),
        ResourceKind::CloudFormationStack => WatchedResource::stack(name),
    };

    resource.validate()?;
    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_nodegroup_requires_cluster_prefix() {
        assert!(build_resource(ResourceKind::NodeGroup, "just-a-name", "default").is_err());

        let resource =
            build_resource(ResourceKind::NodeGroup, "pets-cluster/pets-nodes", "default").unwrap();
        assert_eq!(resource.identifier, "pets-cluster/pets-nodes");
        assert_eq!(resource.namespace, None);
    }

    #[test]
    fn test_build_namespaced_resource() {
        let resource = build_resource(ResourceKind::DeploymentRollout, "pets-api", "ml").unwrap();
        assert_eq!(resource.namespace.as_deref(), Some("ml"));
    }

    #[test]
    fn test_build_rejects_empty_name() {
        assert!(build_resource(ResourceKind::CloudFormationStack, "", "default").is_err());
    }
}
