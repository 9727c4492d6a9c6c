//! Status provider implementations.

pub mod aws;
pub mod kube;

pub use aws::AwsCliProvider;
pub use kube::KubeProvider;
