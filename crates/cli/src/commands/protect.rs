//! `sentinel protect` - CloudFormation termination protection toggle.

use anyhow::{bail, Result};
use clap::Args;
use sentinel::AwsCliProvider;

use crate::ui;

/// Toggle CloudFormation termination protection for a stack.
#[derive(Args)]
pub struct ProtectCommand {
    /// Stack name.
    stack: String,

    /// Enable termination protection.
    #[arg(long, conflicts_with = "off")]
    on: bool,

    /// Disable termination protection.
    #[arg(long)]
    off: bool,

    /// AWS region.
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,
}

impl ProtectCommand {
    pub async fn run(&self) -> Result<()> {
        if self.on == self.off {
            bail!("Specify exactly one of --on or --off");
        }

        let provider = AwsCliProvider::new(&self.region);
        provider
            .set_termination_protection(&self.stack, self.on)
            .await?;

        if self.on {
            ui::print_success(&format!("Termination protection enabled for {}", self.stack));
        } else {
            ui::print_warning(&format!(
                "Termination protection disabled for {} - the stack can now be deleted",
                self.stack
            ));
        }
        Ok(())
    }
}
