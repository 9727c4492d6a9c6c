//! `sentinel preflight` - tool and credential checks.

use anyhow::Result;
use clap::Args;
use std::process::Command;

use crate::ui;

/// Check that required tools and credentials are available.
#[derive(Args)]
pub struct PreflightCommand {}

impl PreflightCommand {
    pub fn run(&self) -> Result<()> {
        ui::print_section("Preflight Checks");
        ensure_ready()
    }
}

struct Requirement {
    name: String,
    check: Box<dyn Fn() -> bool>,
    install_instructions: String,
    critical: bool,
}

fn requirements() -> Vec<Requirement> {
    let mut requirements = Vec::new();

    // AWS CLI
    requirements.push(Requirement {
        name: "AWS CLI".to_string(),
        check: Box::new(|| which::which("aws").is_ok()),
        install_instructions: "Install from https://aws.amazon.com/cli/".to_string(),
        critical: true,
    });

    // kubectl
    requirements.push(Requirement {
        name: "kubectl".to_string(),
        check: Box::new(|| {
            Command::new("kubectl")
                .args(["version", "--client"])
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        }),
        install_instructions: "Install from https://kubernetes.io/docs/tasks/tools/".to_string(),
        critical: true,
    });

    // AWS credentials resolve to an identity
    requirements.push(Requirement {
        name: "AWS credentials".to_string(),
        check: Box::new(|| {
            Command::new("aws")
                .args(["sts", "get-caller-identity", "--output", "json"])
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        }),
        install_instructions: "Run `aws configure` or export AWS_PROFILE".to_string(),
        critical: true,
    });

    requirements
}

/// Run every check, print results, and fail if a critical one is unmet.
pub fn ensure_ready() -> Result<()> {
    let mut failures = Vec::new();

    for requirement in requirements() {
        if (requirement.check)() {
            ui::print_check_result(&requirement.name, true, None);
        } else {
            ui::print_check_result(
                &requirement.name,
                false,
                Some(&requirement.install_instructions),
            );
            failures.push(requirement);
        }
    }

    println!();

    if failures.is_empty() {
        ui::print_success("All preflight checks passed");
        return Ok(());
    }

    if failures.iter().any(|f| f.critical) {
        return Err(anyhow::anyhow!(
            "Preflight checks failed. Install the missing tools and try again."
        ));
    }

    ui::print_warning("Some optional checks failed, continuing");
    Ok(())
}
