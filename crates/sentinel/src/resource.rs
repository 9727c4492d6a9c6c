//! Watched resource types and poll outcomes.
//!
//! A [`WatchedResource`] names one deployment-time resource to poll. Each
//! status query produces a [`PollResult`]; a full wait produces a
//! [`WaitOutcome`] once the resource reaches a terminal state or the
//! deadline passes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WatchError;

/// Kind of resource being watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// EKS managed node group (identifier is `cluster/nodegroup`).
    NodeGroup,
    /// Kubernetes Service of type LoadBalancer.
    LoadBalancerService,
    /// Kubernetes Deployment rollout.
    DeploymentRollout,
    /// CloudFormation stack.
    CloudFormationStack,
}

impl ResourceKind {
    /// Whether this kind is scoped to a Kubernetes namespace.
    #[must_use]
    pub fn is_namespaced(self) -> bool {
        matches!(self, Self::LoadBalancerService | Self::DeploymentRollout)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeGroup => write!(f, "nodegroup"),
            Self::LoadBalancerService => write!(f, "service"),
            Self::DeploymentRollout => write!(f, "rollout"),
            Self::CloudFormationStack => write!(f, "stack"),
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nodegroup" => Ok(Self::NodeGroup),
            "service" => Ok(Self::LoadBalancerService),
            "rollout" | "deployment" => Ok(Self::DeploymentRollout),
            "stack" => Ok(Self::CloudFormationStack),
            _ => Err(anyhow::anyhow!(
                "Unknown resource kind: {s}. Supported: nodegroup, service, rollout, stack"
            )),
        }
    }
}

/// One resource to watch until it reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedResource {
    /// Kind of resource.
    pub kind: ResourceKind,
    /// Resource identifier. For node groups this is `cluster/nodegroup`.
    pub identifier: String,
    /// Kubernetes namespace, for namespaced kinds.
    pub namespace: Option<String>,
}

impl WatchedResource {
    /// Watch an EKS managed node group.
    #[must_use]
    pub fn nodegroup(cluster: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::NodeGroup,
            identifier: format!("{}/{}", cluster.into(), name.into()),
            namespace: None,
        }
    }

    /// Watch a LoadBalancer Service for an external hostname.
    #[must_use]
    pub fn service(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::LoadBalancerService,
            identifier: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Watch a Deployment rollout.
    #[must_use]
    pub fn rollout(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::DeploymentRollout,
            identifier: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Watch a CloudFormation stack.
    #[must_use]
    pub fn stack(name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::CloudFormationStack,
            identifier: name.into(),
            namespace: None,
        }
    }

    /// The namespace to query, defaulting to `default` for namespaced kinds.
    #[must_use]
    pub fn namespace_or_default(&self) -> &str {
        self.namespace.as_deref().unwrap_or("default")
    }

    /// Split a node group identifier into `(cluster, nodegroup)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is not of the form
    /// `cluster/nodegroup`.
    pub fn cluster_and_nodegroup(&self) -> anyhow::Result<(&str, &str)> {
        self.identifier
            .split_once('/')
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Node group identifier must be cluster/nodegroup, got: {}",
                    self.identifier
                )
            })
    }

    /// Validate the resource before a watch starts.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::EmptyIdentifier`] if the identifier is empty.
    pub fn validate(&self) -> Result<(), WatchError> {
        if self.identifier.trim().is_empty() {
            return Err(WatchError::EmptyIdentifier);
        }
        Ok(())
    }
}

impl std::fmt::Display for WatchedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.kind, ns, self.identifier),
            None => write!(f, "{} {}", self.kind, self.identifier),
        }
    }
}

/// Observed state from one status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    /// Resource has not reached a terminal state yet.
    Pending,
    /// Resource is ready.
    Ready,
    /// Provider reported an explicit failure state.
    Failed,
    /// The query itself failed; treated as one more pending iteration.
    Unknown,
}

impl std::fmt::Display for PollState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome of a single status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResult {
    /// Observed state.
    pub state: PollState,
    /// Free-text diagnostic. For a Ready LoadBalancer watch this carries
    /// the external hostname.
    pub detail: String,
    /// When the status was observed.
    pub observed_at: DateTime<Utc>,
}

impl PollResult {
    /// Build a result for the given state with a diagnostic.
    #[must_use]
    pub fn new(state: PollState, detail: impl Into<String>) -> Self {
        Self {
            state,
            detail: detail.into(),
            observed_at: Utc::now(),
        }
    }

    /// The resource is ready.
    #[must_use]
    pub fn ready(detail: impl Into<String>) -> Self {
        Self::new(PollState::Ready, detail)
    }

    /// The resource has not reached a terminal state.
    #[must_use]
    pub fn pending(detail: impl Into<String>) -> Self {
        Self::new(PollState::Pending, detail)
    }

    /// The provider reported an explicit failure.
    #[must_use]
    pub fn failed(detail: impl Into<String>) -> Self {
        Self::new(PollState::Failed, detail)
    }

    /// The status query itself failed.
    #[must_use]
    pub fn unknown(detail: impl Into<String>) -> Self {
        Self::new(PollState::Unknown, detail)
    }
}

/// Terminal state of a full wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalState {
    /// A Ready poll result was observed.
    Ready,
    /// The deadline passed with no terminal poll result.
    TimedOut,
    /// A Failed poll result was observed.
    Failed,
}

impl std::fmt::Display for FinalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Final result of a wait-then-verify cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitOutcome {
    /// The resource that was watched.
    pub resource: WatchedResource,
    /// Terminal state reached.
    pub state: FinalState,
    /// Wall-clock time spent polling.
    pub elapsed: Duration,
    /// Number of status queries issued.
    pub polls: u32,
    /// Last observed diagnostic.
    pub detail: String,
    /// Result of post-ready verification. Populated only when `state`
    /// is [`FinalState::Ready`] and a verification step ran.
    pub verified: Option<bool>,
}

impl WaitOutcome {
    /// Whether the resource became ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == FinalState::Ready
    }

    /// Record the verification result. Only meaningful for a Ready
    /// outcome; ignored otherwise so callers can pipeline unconditionally.
    #[must_use]
    pub fn with_verification(mut self, passed: bool) -> Self {
        if self.is_ready() {
            self.verified = Some(passed);
        }
        self
    }

    /// Whether the wait plus any verification succeeded end to end.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.is_ready() && self.verified.unwrap_or(true)
    }
}
