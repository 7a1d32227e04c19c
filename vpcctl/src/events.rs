//! Parsing of the AWS Organizations events that trigger default VPC deletion
//!
//! Supports the account lifecycle events emitted via CloudTrail
//! (`CreateAccountResult`, `InviteAccountToOrganization`) and region opt-in
//! status changes

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Target derived from an event: which account, and optionally which regions
#[derive(Debug, PartialEq, Eq)]
pub struct EventTarget {
  /// The account the event concerns
  pub account_id: String,
  /// Regions named by the event; `None` means all regions of the account
  pub regions: Option<Vec<String>>,
}

/// An EventBridge event document, narrowed to the fields this tool consumes
#[derive(Debug, Deserialize)]
pub struct Event {
  #[serde(rename = "detail-type")]
  detail_type: String,
  account: Option<String>,
  detail: Detail,
}

#[derive(Debug, Deserialize)]
struct Detail {
  #[serde(rename = "eventName")]
  event_name: Option<String>,
  #[serde(rename = "accountId")]
  account_id: Option<String>,
  #[serde(rename = "regionName")]
  region_name: Option<String>,
  #[serde(rename = "serviceEventDetails")]
  service_event_details: Option<ServiceEventDetails>,
  #[serde(rename = "requestParameters")]
  request_parameters: Option<RequestParameters>,
}

#[derive(Debug, Deserialize)]
struct ServiceEventDetails {
  #[serde(rename = "createAccountStatus")]
  create_account_status: Option<CreateAccountStatus>,
}

#[derive(Debug, Deserialize)]
struct CreateAccountStatus {
  #[serde(rename = "accountId")]
  account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RequestParameters {
  target: Option<InviteTarget>,
}

#[derive(Debug, Deserialize)]
struct InviteTarget {
  id: Option<String>,
}

/// Parse an event document and derive the deletion target
pub fn parse_event(json: &str) -> Result<EventTarget> {
  let event: Event = serde_json::from_str(json).context("Failed to deserialize event document")?;

  match event.detail_type.as_str() {
    "AWS Service Event via CloudTrail" => parse_cloudtrail_event(&event),
    "Region Opt-In Status Change" => parse_region_opt_in_event(&event),
    other => bail!("Unsupported event detail-type '{other}'"),
  }
}

/// Account lifecycle events surfaced through CloudTrail
fn parse_cloudtrail_event(event: &Event) -> Result<EventTarget> {
  let event_name = event
    .detail
    .event_name
    .as_deref()
    .context("CloudTrail event is missing detail.eventName")?;

  let account_id = match event_name {
    "CreateAccountResult" => event
      .detail
      .service_event_details
      .as_ref()
      .and_then(|details| details.create_account_status.as_ref())
      .and_then(|status| status.account_id.clone())
      .context("CreateAccountResult event is missing the created account id")?,
    "InviteAccountToOrganization" => event
      .detail
      .request_parameters
      .as_ref()
      .and_then(|params| params.target.as_ref())
      .and_then(|target| target.id.clone())
      .context("InviteAccountToOrganization event is missing the invited account id")?,
    other => bail!("Unsupported CloudTrail event '{other}'"),
  };

  Ok(EventTarget {
    account_id,
    regions: None,
  })
}

/// Region opt-in events scope the run to the newly enabled region
fn parse_region_opt_in_event(event: &Event) -> Result<EventTarget> {
  let account_id = event
    .detail
    .account_id
    .clone()
    .or_else(|| event.account.clone())
    .context("Region opt-in event is missing an account id")?;

  let region = event
    .detail
    .region_name
    .clone()
    .context("Region opt-in event is missing detail.regionName")?;

  Ok(EventTarget {
    account_id,
    regions: Some(vec![region]),
  })
}
