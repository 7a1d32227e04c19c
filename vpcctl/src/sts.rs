use anyhow::{anyhow, Context, Result};
use aws_config::{sts::AssumeRoleProvider, BehaviorVersion, SdkConfig};
use tracing::debug;

/// Identity of the credentials currently in use
#[derive(Debug)]
pub struct CallerIdentity {
  /// The 12-digit AWS account id
  pub account: String,
  /// The ARN of the calling principal
  pub arn: String,
}

impl CallerIdentity {
  /// Return the AWS partition (`aws`, `aws-us-gov`, `aws-cn`) of the calling principal
  pub fn partition(&self) -> Result<&str> {
    partition_from_arn(&self.arn)
  }
}

/// Load the AWS configuration from the ambient environment
///
/// This is the configuration of the principal running the CLI, prior to role assumption
pub async fn base_config() -> SdkConfig {
  aws_config::load_defaults(BehaviorVersion::latest()).await
}

/// Load an AWS configuration whose credentials come from assuming the given role
///
/// The assumed-role credentials chain off the ambient credentials, so the caller
/// must be permitted to assume the role in the target account
pub async fn assume_role_config(role_arn: &str, session_name: &str) -> SdkConfig {
  let provider = AssumeRoleProvider::builder(role_arn)
    .session_name(session_name)
    .build()
    .await;

  aws_config::defaults(BehaviorVersion::latest())
    .credentials_provider(provider)
    .load()
    .await
}

/// Query STS for the identity behind the given configuration
pub async fn get_caller_identity(config: &SdkConfig) -> Result<CallerIdentity> {
  let client = aws_sdk_sts::Client::new(config);
  let identity = client
    .get_caller_identity()
    .send()
    .await
    .context("Failed to get caller identity - check credentials")?;

  let account = identity
    .account()
    .context("No account id returned from GetCallerIdentity")?
    .to_string();
  let arn = identity
    .arn()
    .context("No ARN returned from GetCallerIdentity")?
    .to_string();
  debug!("Caller identity is {arn}");

  Ok(CallerIdentity { account, arn })
}

/// Extract the partition from an ARN
///
/// ARNs take the form `arn:<partition>:<service>:<region>:<account>:<resource>`
pub fn partition_from_arn(arn: &str) -> Result<&str> {
  match arn.split(':').nth(1) {
    Some(partition) if !partition.is_empty() => Ok(partition),
    _ => Err(anyhow!("Unable to extract partition from ARN {arn}")),
  }
}

/// Construct the ARN of an IAM role in the target account
pub fn role_arn(partition: &str, account_id: &str, role_name: &str) -> String {
  format!("arn:{partition}:iam::{account_id}:role/{role_name}")
}

#[cfg(test)]
mod tests {
  use rstest::*;

  use super::*;

  #[rstest]
  #[case("arn:aws:iam::111111111111:role/Admin", "aws")]
  #[case("arn:aws-us-gov:sts::111111111111:assumed-role/Admin/session", "aws-us-gov")]
  #[case("arn:aws-cn:iam::111111111111:user/deployer", "aws-cn")]
  fn it_extracts_the_partition(#[case] arn: &str, #[case] expected: &str) {
    let result = partition_from_arn(arn).unwrap();
    assert_eq!(result, expected);
  }

  #[rstest]
  #[case("not-an-arn")]
  #[case("arn::iam::111111111111:role/Admin")]
  fn it_rejects_malformed_arns(#[case] arn: &str) {
    assert!(partition_from_arn(arn).is_err());
  }

  #[test]
  fn it_constructs_role_arns() {
    let result = role_arn("aws", "111111111111", "OrganizationAccountAccessRole");
    assert_eq!(result, "arn:aws:iam::111111111111:role/OrganizationAccountAccessRole");
  }

  #[test]
  fn identity_partition_matches_arn() {
    let identity = CallerIdentity {
      account: "111111111111".to_string(),
      arn: "arn:aws-us-gov:iam::111111111111:role/Admin".to_string(),
    };
    assert_eq!(identity.partition().unwrap(), "aws-us-gov");
  }
}
