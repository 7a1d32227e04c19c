use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args};
use tracing::info;

use crate::{
  commands, ec2,
  events::{self, EventTarget},
  report::RunReport,
  vpc,
};

#[derive(Args, Debug)]
pub struct DeleteDefaultVpcs {
  /// Account number to delete default VPC resources in
  #[arg(long, required_unless_present = "event_file", conflicts_with = "event_file")]
  pub target_account_id: Option<String>,

  /// Path to an EventBridge event document naming the target account
  #[arg(long)]
  pub event_file: Option<PathBuf>,

  /// ARN of the IAM role to assume in the target account
  #[arg(long, conflicts_with = "assume_role_name")]
  pub assume_role_arn: Option<String>,

  /// Name of the IAM role to assume in the target account
  #[arg(long, env = "ASSUME_ROLE_NAME", default_value = crate::DEFAULT_ASSUME_ROLE_NAME)]
  pub assume_role_name: String,

  /// Role session name recorded for the assumed role activity
  #[arg(long, default_value = "vpcctl")]
  pub role_session_name: String,

  /// Log the actions that would be taken instead of deleting; pass `false` to delete
  #[arg(long, env = "DRY_RUN", action = ArgAction::Set, default_value_t = true)]
  pub dry_run: bool,

  /// Regions to process; defaults to the event's region or all regions enabled for the account
  #[arg(long, value_delimiter = ',')]
  pub regions: Vec<String>,

  /// Number of regions processed concurrently
  #[arg(long, env = "MAX_WORKERS", default_value_t = crate::DEFAULT_MAX_WORKERS)]
  pub max_workers: usize,
}

impl DeleteDefaultVpcs {
  /// Delete the default VPC and its dependent resources in every region of the target account
  pub async fn delete(&self) -> Result<()> {
    let target = self.resolve_target()?;
    let account_id = target.account_id.clone();

    let (config, _partition) = commands::assume_target_role(
      &account_id,
      self.assume_role_arn.as_deref(),
      &self.assume_role_name,
      &self.role_session_name,
    )
    .await?;

    let regions = if !self.regions.is_empty() {
      self.regions.clone()
    } else if let Some(regions) = target.regions {
      regions
    } else {
      ec2::get_regions(&ec2::get_default_client(&config)).await?
    };
    info!(
      "Deleting default VPCs across {} region(s) in account {account_id}",
      regions.len()
    );

    let dry_run = self.dry_run;
    let worker_account_id = account_id.clone();
    let failures = commands::run_regions(regions, self.max_workers, &account_id, move |region| {
      let config = config.clone();
      let account_id = worker_account_id.clone();
      async move {
        let client = ec2::get_client(&config, &region);
        vpc::delete_region_default_vpcs(&client, &account_id, &region, dry_run).await
      }
    })
    .await;

    if self.dry_run {
      info!("Dry run listed all default VPC resources that would be deleted");
    }

    let mut report = RunReport::new();
    report.extend(failures);
    report.into_result("Delete default VPCs")
  }

  /// Derive the target account (and optional region scope) from the CLI arguments
  fn resolve_target(&self) -> Result<EventTarget> {
    match (&self.target_account_id, &self.event_file) {
      (Some(account_id), None) => Ok(EventTarget {
        account_id: account_id.clone(),
        regions: None,
      }),
      (None, Some(path)) => {
        let contents =
          fs::read_to_string(path).with_context(|| format!("Failed to read event file {}", path.display()))?;
        events::parse_event(&contents)
      }
      _ => bail!("Provide exactly one of --target-account-id or --event-file"),
    }
  }
}
