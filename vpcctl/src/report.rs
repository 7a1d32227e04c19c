use std::fmt;

use anyhow::{bail, Result};
use tracing::error;

/// A single recorded failure from one region, VPC, or teardown step
///
/// Failures are captured as values rather than propagated so that work in
/// other regions continues; the run is failed once, at the end
#[derive(Debug)]
pub struct Failure {
  pub account_id: String,
  pub region: String,
  pub vpc_id: Option<String>,
  pub operation: String,
  pub source: anyhow::Error,
}

impl Failure {
  pub fn new(account_id: &str, region: &str, operation: &str, source: anyhow::Error) -> Self {
    Self {
      account_id: account_id.to_string(),
      region: region.to_string(),
      vpc_id: None,
      operation: operation.to_string(),
      source,
    }
  }

  pub fn for_vpc(account_id: &str, region: &str, vpc_id: &str, operation: &str, source: anyhow::Error) -> Self {
    Self {
      vpc_id: Some(vpc_id.to_string()),
      ..Self::new(account_id, region, operation, source)
    }
  }
}

impl fmt::Display for Failure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Account: {} Region: {} Operation: {}",
      self.account_id, self.region, self.operation
    )?;
    if let Some(vpc_id) = &self.vpc_id {
      write!(f, " VPC: {vpc_id}")?;
    }
    write!(f, " Error: {:#}", self.source)
  }
}

/// Accumulated failures across an entire run
#[derive(Debug, Default)]
pub struct RunReport {
  failures: Vec<Failure>,
}

impl RunReport {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, failure: Failure) {
    self.failures.push(failure);
  }

  pub fn extend<I: IntoIterator<Item = Failure>>(&mut self, failures: I) {
    self.failures.extend(failures);
  }

  pub fn is_empty(&self) -> bool {
    self.failures.is_empty()
  }

  pub fn len(&self) -> usize {
    self.failures.len()
  }

  /// Log every recorded failure and convert the report into the run's final result
  ///
  /// Returns `Ok(())` when no failures were recorded, otherwise an error whose
  /// message embeds each failure
  pub fn into_result(self, label: &str) -> Result<()> {
    if self.failures.is_empty() {
      return Ok(());
    }

    for failure in &self.failures {
      error!("{failure}");
    }

    let details = self
      .failures
      .iter()
      .map(ToString::to_string)
      .collect::<Vec<_>>()
      .join("\n  ");

    bail!("{label} encountered {} failure(s):\n  {details}", self.failures.len())
  }
}

#[cfg(test)]
mod tests {
  use anyhow::anyhow;

  use super::*;

  #[test]
  fn empty_report_is_ok() {
    let report = RunReport::new();
    assert!(report.is_empty());
    assert!(report.into_result("delete").is_ok());
  }

  #[test]
  fn failure_display_includes_context() {
    let failure = Failure::for_vpc(
      "111111111111",
      "us-east-1",
      "vpc-0a1b2c3d",
      "delete-subnets",
      anyhow!("subnet in use"),
    );
    let rendered = failure.to_string();
    assert!(rendered.contains("Account: 111111111111"));
    assert!(rendered.contains("Region: us-east-1"));
    assert!(rendered.contains("VPC: vpc-0a1b2c3d"));
    assert!(rendered.contains("Operation: delete-subnets"));
    assert!(rendered.contains("subnet in use"));
  }

  #[test]
  fn region_failure_omits_vpc() {
    let failure = Failure::new("111111111111", "eu-west-1", "describe-vpcs", anyhow!("throttled"));
    assert!(!failure.to_string().contains("VPC:"));
  }

  #[test]
  fn report_aggregates_all_failures() {
    let mut report = RunReport::new();
    report.push(Failure::new("111111111111", "us-east-1", "describe-vpcs", anyhow!("a")));
    report.push(Failure::new("111111111111", "us-west-2", "delete-vpc", anyhow!("b")));
    assert_eq!(report.len(), 2);

    let err = report.into_result("delete").unwrap_err();
    let message = format!("{err}");
    assert!(message.contains("2 failure(s)"));
    assert!(message.contains("us-east-1"));
    assert!(message.contains("us-west-2"));
  }
}
