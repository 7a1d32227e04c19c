pub mod cli;
pub mod commands;
pub mod ec2;
pub mod events;
pub mod report;
pub mod sts;
pub mod vpc;

pub use cli::{Cli, Commands};

/// Default name of the IAM role assumed in the target account
pub const DEFAULT_ASSUME_ROLE_NAME: &str = "OrganizationAccountAccessRole";

/// Default number of concurrent region workers
pub const DEFAULT_MAX_WORKERS: usize = 20;
