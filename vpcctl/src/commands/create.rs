use std::{
  fmt,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
};

use anyhow::Result;
use clap::Args;
use tracing::{debug, info};

use crate::{
  commands, ec2,
  report::{Failure, RunReport},
  vpc::{self, CreateOutcome},
};

#[derive(Args, Debug)]
pub struct CreateDefaultVpcs {
  /// Account to process
  #[arg(long)]
  pub account_id: String,

  /// ARN of the IAM role to assume in the target account
  #[arg(long, conflicts_with = "assume_role_name")]
  pub assume_role_arn: Option<String>,

  /// Name of the IAM role to assume in the target account
  #[arg(long, env = "ASSUME_ROLE_NAME", default_value = crate::DEFAULT_ASSUME_ROLE_NAME)]
  pub assume_role_name: String,

  /// Role session name recorded for the assumed role activity
  #[arg(long, default_value = "vpcctl")]
  pub role_session_name: String,

  /// Log the actions that would be taken without creating anything
  #[arg(long)]
  pub dry_run: bool,

  /// Restrict the run to the partition's representative region
  #[arg(long, conflicts_with = "regions")]
  pub single_region: bool,

  /// Regions to process; defaults to all regions enabled for the account
  #[arg(long, value_delimiter = ',')]
  pub regions: Vec<String>,

  /// Number of regions processed concurrently
  #[arg(long, env = "MAX_WORKERS", default_value_t = crate::DEFAULT_MAX_WORKERS)]
  pub max_workers: usize,
}

impl CreateDefaultVpcs {
  /// Create the default VPC in every region of the target account where one is missing
  pub async fn create(&self) -> Result<()> {
    let (config, partition) = commands::assume_target_role(
      &self.account_id,
      self.assume_role_arn.as_deref(),
      &self.assume_role_name,
      &self.role_session_name,
    )
    .await?;

    let regions = if !self.regions.is_empty() {
      self.regions.clone()
    } else if self.single_region {
      vec![partition_default_region(&partition).to_string()]
    } else {
      ec2::get_regions(&ec2::get_default_client(&config)).await?
    };
    info!(
      "Creating default VPCs across {} region(s) in account {}",
      regions.len(),
      self.account_id
    );

    let account_id = self.account_id.clone();
    let dry_run = self.dry_run;
    let summary = Arc::new(CreateSummary::default());
    let worker_summary = Arc::clone(&summary);
    let failures = commands::run_regions(regions, self.max_workers, &self.account_id, move |region| {
      let config = config.clone();
      let account_id = account_id.clone();
      let summary = Arc::clone(&worker_summary);
      async move {
        let client = ec2::get_client(&config, &region);
        match vpc::ensure_region_default_vpc(&client, &account_id, &region, dry_run).await {
          Ok(outcome) => {
            if let CreateOutcome::Created(vpc_id) = &outcome {
              debug!("Region {region} now carries default VPC {vpc_id}");
            }
            summary.record(&outcome);
            Vec::new()
          }
          Err(err) => vec![Failure::new(&account_id, &region, "create-default-vpc", err)],
        }
      }
    })
    .await;

    info!("Default VPC run for account {}: {summary}", self.account_id);
    if self.dry_run {
      info!("Dry run listed all default VPCs that would be created");
    }

    let mut report = RunReport::new();
    report.extend(failures);
    report.into_result("Create default VPCs")
  }
}

/// Tally of per-region outcomes, shared across the worker pool
#[derive(Debug, Default)]
struct CreateSummary {
  created: AtomicUsize,
  existing: AtomicUsize,
  skipped: AtomicUsize,
}

impl CreateSummary {
  fn record(&self, outcome: &CreateOutcome) {
    match outcome {
      CreateOutcome::Created(_) => self.created.fetch_add(1, Ordering::Relaxed),
      CreateOutcome::AlreadyExists(_) => self.existing.fetch_add(1, Ordering::Relaxed),
      CreateOutcome::DryRun => self.skipped.fetch_add(1, Ordering::Relaxed),
    };
  }
}

impl fmt::Display for CreateSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} created, {} already present, {} skipped by dry-run",
      self.created.load(Ordering::Relaxed),
      self.existing.load(Ordering::Relaxed),
      self.skipped.load(Ordering::Relaxed)
    )
  }
}

/// The representative region used for single-region smoke tests
fn partition_default_region(partition: &str) -> &'static str {
  match partition {
    "aws-us-gov" => "us-gov-west-1",
    "aws-cn" => "cn-north-1",
    _ => "us-east-1",
  }
}

#[cfg(test)]
mod tests {
  use rstest::*;

  use super::*;

  #[rstest]
  #[case("aws", "us-east-1")]
  #[case("aws-us-gov", "us-gov-west-1")]
  #[case("aws-cn", "cn-north-1")]
  #[case("aws-iso", "us-east-1")]
  fn it_selects_the_partition_region(#[case] partition: &str, #[case] expected: &str) {
    assert_eq!(partition_default_region(partition), expected);
  }

  #[test]
  fn summary_tallies_each_outcome() {
    let summary = CreateSummary::default();
    summary.record(&CreateOutcome::Created("vpc-0a1b2c3d".to_string()));
    summary.record(&CreateOutcome::Created("vpc-4e5f6a7b".to_string()));
    summary.record(&CreateOutcome::AlreadyExists("vpc-8c9d0e1f".to_string()));
    summary.record(&CreateOutcome::DryRun);

    assert_eq!(summary.to_string(), "2 created, 1 already present, 1 skipped by dry-run");
  }
}
