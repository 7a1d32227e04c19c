pub mod create;
pub mod delete;

use std::{future::Future, sync::Arc};

use anyhow::{anyhow, Result};
use aws_config::SdkConfig;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info};

use crate::{report::Failure, sts};

/// Resolve the role to assume in the target account and assume it
///
/// When only a role name is supplied, the role ARN is constructed from the
/// partition of the calling principal. Returns the assumed-role configuration
/// and the partition
pub(crate) async fn assume_target_role(
  account_id: &str,
  assume_role_arn: Option<&str>,
  assume_role_name: &str,
  session_name: &str,
) -> Result<(SdkConfig, String)> {
  let base_config = sts::base_config().await;
  let identity = sts::get_caller_identity(&base_config).await?;
  let partition = identity.partition()?.to_string();

  let role_arn = match assume_role_arn {
    Some(arn) => arn.to_string(),
    None => sts::role_arn(&partition, account_id, assume_role_name),
  };
  info!("Assuming role {role_arn}");

  let config = sts::assume_role_config(&role_arn, session_name).await;
  let assumed = sts::get_caller_identity(&config).await?;
  debug!("Assumed identity for account {account_id} is {}", assumed.arn);

  Ok((config, partition))
}

/// Fan region work out across a bounded worker pool and collect the failures
///
/// Workers are admitted by semaphore so at most `max_workers` regions are
/// processed concurrently; a panicked worker is recorded as a failure rather
/// than aborting the run
pub(crate) async fn run_regions<F, Fut>(
  regions: Vec<String>,
  max_workers: usize,
  account_id: &str,
  task: F,
) -> Vec<Failure>
where
  F: Fn(String) -> Fut,
  Fut: Future<Output = Vec<Failure>> + Send + 'static,
{
  let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
  let mut workers = JoinSet::new();

  for region in regions {
    let semaphore = Arc::clone(&semaphore);
    let account_id = account_id.to_string();
    let work = task(region.clone());
    workers.spawn(async move {
      match semaphore.acquire_owned().await {
        Ok(_permit) => work.await,
        Err(_) => vec![Failure::new(
          &account_id,
          &region,
          "region-worker",
          anyhow!("Worker pool closed before the region was processed"),
        )],
      }
    });
  }

  let mut failures = Vec::new();
  while let Some(joined) = workers.join_next().await {
    match joined {
      Ok(worker_failures) => failures.extend(worker_failures),
      Err(err) => failures.push(Failure::new(
        account_id,
        "unknown",
        "region-worker",
        anyhow!("Region worker did not complete: {err}"),
      )),
    }
  }

  failures
}
