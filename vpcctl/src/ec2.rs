use anyhow::Result;
use aws_config::SdkConfig;
use aws_sdk_ec2::{
  config::{self, retry::RetryConfig},
  types::Filter,
  Client,
};
use aws_types::region::Region;
use tracing::info;

/// Get an EC2 client scoped to the given region
///
/// All clients share the provided (assumed-role) configuration and differ only in region
pub fn get_client(config: &SdkConfig, region: &str) -> Client {
  Client::from_conf(
    config::Builder::from(config)
      .region(Region::new(region.to_string()))
      .retry_config(RetryConfig::standard().with_max_attempts(3))
      .build(),
  )
}

/// Get an EC2 client using the configuration's own region
pub fn get_default_client(config: &SdkConfig) -> Client {
  Client::from_conf(
    config::Builder::from(config)
      .retry_config(RetryConfig::standard().with_max_attempts(3))
      .build(),
  )
}

/// Build the list of regions enabled for the account
pub async fn get_regions(client: &Client) -> Result<Vec<String>> {
  let response = client.describe_regions().send().await?;
  let regions = response
    .regions()
    .iter()
    .filter_map(|region| region.region_name().map(ToString::to_string))
    .collect();

  Ok(regions)
}

/// Get the default VPC id(s) for the region the client is scoped to
///
/// An account carries at most one default VPC per region, but the API reports a list
pub async fn get_default_vpc_ids(client: &Client, account_id: &str, region: &str) -> Result<Vec<String>> {
  info!("Retrieving default VPCs for account {account_id} region {region}");
  let response = client
    .describe_vpcs()
    .filters(Filter::builder().name("isDefault").values("true").build())
    .send()
    .await?;

  let vpc_ids = response
    .vpcs()
    .iter()
    .filter_map(|vpc| vpc.vpc_id().map(ToString::to_string))
    .collect();

  Ok(vpc_ids)
}
