//! CLI subcommands.

pub mod deploy;
pub mod preflight;
pub mod protect;
pub mod verify;
pub mod wait;
