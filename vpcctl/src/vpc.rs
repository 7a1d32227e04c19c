use anyhow::{anyhow, Result};
use aws_sdk_ec2::{
  types::{Filter, NetworkAcl, RouteTable, SecurityGroup, Subnet},
  Client,
};
use tracing::info;

use crate::{ec2, report::Failure};

/// A default VPC targeted for deletion
#[derive(Clone, Debug)]
pub struct VpcTarget {
  pub account_id: String,
  pub region: String,
  pub vpc_id: String,
}

/// Outcome of ensuring a default VPC exists in a region
#[derive(Debug, PartialEq, Eq)]
pub enum CreateOutcome {
  /// A default VPC was created
  Created(String),
  /// The region already carries a default VPC
  AlreadyExists(String),
  /// Creation was skipped because of dry-run
  DryRun,
}

/// Create the default VPC in the region if one does not already exist
pub async fn ensure_region_default_vpc(
  client: &Client,
  account_id: &str,
  region: &str,
  dry_run: bool,
) -> Result<CreateOutcome> {
  let vpc_ids = ec2::get_default_vpc_ids(client, account_id, region).await?;
  if let Some(vpc_id) = vpc_ids.first() {
    info!("Default VPC {vpc_id} already exists in region {region}");
    return Ok(CreateOutcome::AlreadyExists(vpc_id.to_string()));
  }

  if dry_run {
    info!("[dry-run] Would create default VPC in region {region}");
    return Ok(CreateOutcome::DryRun);
  }

  let response = client.create_default_vpc().send().await?;
  let vpc_id = response
    .vpc()
    .and_then(|vpc| vpc.vpc_id())
    .ok_or_else(|| anyhow!("CreateDefaultVpc returned no VPC id for region {region}"))?
    .to_string();
  info!("Created default VPC {vpc_id} in region {region}");

  Ok(CreateOutcome::Created(vpc_id))
}

/// Delete every default VPC in the region the client is scoped to
///
/// A failure to enumerate VPCs is recorded as a single region-level failure;
/// per-VPC teardown failures are recorded individually
pub async fn delete_region_default_vpcs(
  client: &Client,
  account_id: &str,
  region: &str,
  dry_run: bool,
) -> Vec<Failure> {
  let vpc_ids = match ec2::get_default_vpc_ids(client, account_id, region).await {
    Ok(vpc_ids) => vpc_ids,
    Err(err) => return vec![Failure::new(account_id, region, "describe-vpcs", err)],
  };

  if vpc_ids.is_empty() {
    info!("No default VPC in region {region}");
    return Vec::new();
  }

  let mut failures = Vec::new();
  for vpc_id in vpc_ids {
    let target = VpcTarget {
      account_id: account_id.to_string(),
      region: region.to_string(),
      vpc_id,
    };
    failures.extend(delete_vpc_resources(client, &target, dry_run).await);
  }

  failures
}

/// Delete the VPC and its dependent resources - order of operation:
///
/// 1. Internet gateways (detach, then delete)
/// 2. Subnets (default-for-AZ only)
/// 3. Route tables (except the main route table)
/// 4. Network ACLs (except the default ACL)
/// 5. Security groups (except the `default` group)
/// 6. The VPC itself
///
/// Each step records its own failure and the sequence continues, so one stuck
/// resource does not prevent the remaining steps from being attempted
pub async fn delete_vpc_resources(client: &Client, target: &VpcTarget, dry_run: bool) -> Vec<Failure> {
  info!(
    "Deleting default VPC {} in account {} region {}",
    target.vpc_id, target.account_id, target.region
  );

  let mut failures = Vec::new();
  let mut record = |operation: &str, result: Result<()>| {
    if let Err(err) = result {
      failures.push(Failure::for_vpc(
        &target.account_id,
        &target.region,
        &target.vpc_id,
        operation,
        err,
      ));
    }
  };

  record(
    "delete-internet-gateways",
    delete_internet_gateways(client, &target.vpc_id, dry_run).await,
  );
  record("delete-subnets", delete_subnets(client, &target.vpc_id, dry_run).await);
  record(
    "delete-route-tables",
    delete_route_tables(client, &target.vpc_id, dry_run).await,
  );
  record(
    "delete-network-acls",
    delete_network_acls(client, &target.vpc_id, dry_run).await,
  );
  record(
    "delete-security-groups",
    delete_security_groups(client, &target.vpc_id, dry_run).await,
  );
  record("delete-vpc", delete_vpc(client, &target.vpc_id, dry_run).await);

  failures
}

/// Detach and delete the internet gateway(s) attached to the VPC
async fn delete_internet_gateways(client: &Client, vpc_id: &str, dry_run: bool) -> Result<()> {
  let response = client
    .describe_internet_gateways()
    .filters(Filter::builder().name("attachment.vpc-id").values(vpc_id).build())
    .send()
    .await?;

  let igws = response.internet_gateways();
  if igws.is_empty() {
    info!("There are no internet gateways for VPC {vpc_id}");
  }

  for igw in igws {
    let igw_id = igw
      .internet_gateway_id()
      .ok_or_else(|| anyhow!("Internet gateway without an id attached to VPC {vpc_id}"))?;
    if dry_run {
      info!("[dry-run] Would detach and delete internet gateway {igw_id}");
      continue;
    }

    info!("Detaching and deleting internet gateway {igw_id}");
    client
      .detach_internet_gateway()
      .internet_gateway_id(igw_id)
      .vpc_id(vpc_id)
      .send()
      .await?;
    client.delete_internet_gateway().internet_gateway_id(igw_id).send().await?;
  }

  Ok(())
}

/// Delete the default-for-AZ subnets of the VPC
async fn delete_subnets(client: &Client, vpc_id: &str, dry_run: bool) -> Result<()> {
  let response = client
    .describe_subnets()
    .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
    .send()
    .await?;

  let subnet_ids = default_subnet_ids(response.subnets());
  if subnet_ids.is_empty() {
    info!("There are no default subnets for VPC {vpc_id}");
  }

  for subnet_id in subnet_ids {
    if dry_run {
      info!("[dry-run] Would delete subnet {subnet_id}");
      continue;
    }

    info!("Deleting subnet {subnet_id}");
    client.delete_subnet().subnet_id(subnet_id).send().await?;
  }

  Ok(())
}

/// Delete the route tables of the VPC, skipping the main route table
///
/// The main route table cannot be deleted explicitly; it is removed with the VPC
async fn delete_route_tables(client: &Client, vpc_id: &str, dry_run: bool) -> Result<()> {
  let response = client
    .describe_route_tables()
    .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
    .send()
    .await?;

  let route_table_ids = secondary_route_table_ids(response.route_tables());
  if route_table_ids.is_empty() {
    info!("There are no secondary route tables for VPC {vpc_id}");
  }

  for route_table_id in route_table_ids {
    if dry_run {
      info!("[dry-run] Would delete route table {route_table_id}");
      continue;
    }

    info!("Deleting route table {route_table_id}");
    client.delete_route_table().route_table_id(route_table_id).send().await?;
  }

  Ok(())
}

/// Delete the network ACLs of the VPC, skipping the default ACL
async fn delete_network_acls(client: &Client, vpc_id: &str, dry_run: bool) -> Result<()> {
  let response = client
    .describe_network_acls()
    .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
    .send()
    .await?;

  let acl_ids = nondefault_network_acl_ids(response.network_acls());
  if acl_ids.is_empty() {
    info!("There are no non-default network ACLs for VPC {vpc_id}");
  }

  for acl_id in acl_ids {
    if dry_run {
      info!("[dry-run] Would delete network ACL {acl_id}");
      continue;
    }

    info!("Deleting network ACL {acl_id}");
    client.delete_network_acl().network_acl_id(acl_id).send().await?;
  }

  Ok(())
}

/// Delete the security groups of the VPC, skipping the `default` group
async fn delete_security_groups(client: &Client, vpc_id: &str, dry_run: bool) -> Result<()> {
  let response = client
    .describe_security_groups()
    .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
    .send()
    .await?;

  let group_ids = nondefault_security_group_ids(response.security_groups());
  if group_ids.is_empty() {
    info!("There are no non-default security groups for VPC {vpc_id}");
  }

  for group_id in group_ids {
    if dry_run {
      info!("[dry-run] Would delete security group {group_id}");
      continue;
    }

    info!("Deleting security group {group_id}");
    client.delete_security_group().group_id(group_id).send().await?;
  }

  Ok(())
}

/// Delete the VPC
async fn delete_vpc(client: &Client, vpc_id: &str, dry_run: bool) -> Result<()> {
  if dry_run {
    info!("[dry-run] Would delete VPC {vpc_id}");
    return Ok(());
  }

  info!("Deleting VPC {vpc_id}");
  client.delete_vpc().vpc_id(vpc_id).send().await?;

  Ok(())
}

/// Subnets created as the default subnet for an availability zone
fn default_subnet_ids(subnets: &[Subnet]) -> Vec<&str> {
  subnets
    .iter()
    .filter(|subnet| subnet.default_for_az().unwrap_or_default())
    .filter_map(|subnet| subnet.subnet_id())
    .collect()
}

/// Route tables that do not carry a main association
fn secondary_route_table_ids(route_tables: &[RouteTable]) -> Vec<&str> {
  route_tables
    .iter()
    .filter(|table| {
      !table
        .associations()
        .iter()
        .any(|association| association.main().unwrap_or_default())
    })
    .filter_map(|table| table.route_table_id())
    .collect()
}

/// Network ACLs other than the VPC's default ACL
fn nondefault_network_acl_ids(acls: &[NetworkAcl]) -> Vec<&str> {
  acls
    .iter()
    .filter(|acl| !acl.is_default().unwrap_or_default())
    .filter_map(|acl| acl.network_acl_id())
    .collect()
}

/// Security groups other than the VPC's `default` group
fn nondefault_security_group_ids(groups: &[SecurityGroup]) -> Vec<&str> {
  groups
    .iter()
    .filter(|group| group.group_name() != Some("default"))
    .filter_map(|group| group.group_id())
    .collect()
}

#[cfg(test)]
mod tests {
  use aws_sdk_ec2::types::RouteTableAssociation;

  use super::*;

  fn subnet(id: &str, default_for_az: bool) -> Subnet {
    Subnet::builder().subnet_id(id).default_for_az(default_for_az).build()
  }

  fn route_table(id: &str, main: Option<bool>) -> RouteTable {
    let mut builder = RouteTable::builder().route_table_id(id);
    if let Some(main) = main {
      builder = builder.associations(RouteTableAssociation::builder().main(main).build());
    }
    builder.build()
  }

  #[test]
  fn it_selects_only_default_subnets() {
    let subnets = vec![subnet("subnet-1", true), subnet("subnet-2", false), subnet("subnet-3", true)];
    let result = default_subnet_ids(&subnets);
    assert_eq!(result, vec!["subnet-1", "subnet-3"]);
  }

  #[test]
  fn it_skips_the_main_route_table() {
    let tables = vec![
      route_table("rtb-main", Some(true)),
      route_table("rtb-extra", Some(false)),
      route_table("rtb-unassociated", None),
    ];
    let result = secondary_route_table_ids(&tables);
    assert_eq!(result, vec!["rtb-extra", "rtb-unassociated"]);
  }

  #[test]
  fn it_skips_tables_with_any_main_association() {
    let table = RouteTable::builder()
      .route_table_id("rtb-mixed")
      .associations(RouteTableAssociation::builder().main(false).build())
      .associations(RouteTableAssociation::builder().main(true).build())
      .build();
    let result = secondary_route_table_ids(&[table]);
    assert!(result.is_empty());
  }

  #[test]
  fn it_skips_the_default_network_acl() {
    let acls = vec![
      NetworkAcl::builder().network_acl_id("acl-default").is_default(true).build(),
      NetworkAcl::builder().network_acl_id("acl-extra").is_default(false).build(),
    ];
    let result = nondefault_network_acl_ids(&acls);
    assert_eq!(result, vec!["acl-extra"]);
  }

  #[test]
  fn it_skips_the_default_security_group() {
    let groups = vec![
      SecurityGroup::builder().group_id("sg-default").group_name("default").build(),
      SecurityGroup::builder().group_id("sg-app").group_name("app").build(),
    ];
    let result = nondefault_security_group_ids(&groups);
    assert_eq!(result, vec!["sg-app"]);
  }
}
