//! Deployment readiness watcher.
//!
//! Polls deployment-time resources (EKS node groups, CloudFormation
//! stacks, LoadBalancer services, Deployment rollouts) at a fixed
//! interval until they reach a terminal state, then verifies the
//! deployed application over HTTP.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use sentinel::{AwsCliProvider, Waiter, WatchedResource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = AwsCliProvider::new("us-east-1");
//!     let waiter = Waiter::new(Duration::from_secs(15), Duration::from_secs(900))?;
//!     let resource = WatchedResource::nodegroup("pets-cluster", "pets-nodes");
//!
//!     let outcome = waiter.wait_until_ready(&provider, &resource).await?;
//!     println!("{}: {} after {:?}", outcome.resource, outcome.state, outcome.elapsed);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod probe;
pub mod provider;
pub mod providers;
pub mod resource;
pub mod verify;
pub mod waiter;

// Re-export commonly used types at the crate root
pub use error::WatchError;
pub use probe::{HttpProbe, PredictionProbe};
pub use provider::StatusProvider;
pub use providers::{AwsCliProvider, KubeProvider};
pub use resource::{FinalState, PollResult, PollState, ResourceKind, WaitOutcome, WatchedResource};
pub use verify::verify;
pub use waiter::Waiter;
