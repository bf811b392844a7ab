//! Manifest document types.
//!
//! Field names and nesting are a fixed wire contract with the deployment
//! tool. Option fields hold `serde_json::Value` because a field may be a
//! literal or a `{{ params.NAME }}` expression.

use std::collections::BTreeMap;

use kindling_config::ParamSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ManifestError;

/// Version tag of the manifest format.
pub const SPEC_VERSION: &str = "v1alpha1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
  pub spec_version: String,
  #[serde(default)]
  pub params: Vec<ParamSpec>,
  #[serde(rename = "requiredAPIs", default)]
  pub required_apis: Vec<RequiredApi>,
  /// Endpoints keyed by normalized identifier.
  #[serde(default)]
  pub endpoints: BTreeMap<String, Endpoint>,
}

impl Manifest {
  pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}

/// A platform API the deployment must enable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredApi {
  pub api: String,
  pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
  /// Final name of the trigger.
  pub entry_point: String,
  pub platform: String,
  pub region: Vec<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub available_memory_mb: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cpu: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timeout_seconds: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub concurrency: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub min_instances: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_instances: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub service_account_email: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vpc: Option<Vpc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ingress_settings: Option<Value>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub labels: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub secret_environment_variables: Vec<SecretEnvironmentVariable>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub enforce_app_check: Option<bool>,
  #[serde(flatten)]
  pub trigger: EndpointTrigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vpc {
  pub connector: Value,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub egress_settings: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretEnvironmentVariable {
  pub key: String,
}

/// The one trigger-specific block of an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndpointTrigger {
  HttpsTrigger(HttpsTrigger),
  CallableTrigger(CallableTrigger),
  EventTrigger(EventTrigger),
  BlockingTrigger(BlockingTrigger),
  ScheduleTrigger(ScheduleTrigger),
  TaskQueueTrigger(TaskQueueTrigger),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpsTrigger {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub invoker: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cors: Option<Cors>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cors {
  pub origins: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableTrigger {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTrigger {
  pub event_type: String,
  #[serde(default)]
  pub event_filters: BTreeMap<String, Value>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub event_filter_path_patterns: BTreeMap<String, Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub channel: Option<String>,
  pub retry: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingTrigger {
  pub event_type: String,
  pub options: BlockingOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingOptions {
  pub id_token: bool,
  pub access_token: bool,
  pub refresh_token: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTrigger {
  pub schedule: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub time_zone: Option<Value>,
  pub retry_config: RetryConfigBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueueTrigger {
  pub retry_config: RetryConfigBlock,
  pub rate_limits: RateLimitsBlock,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub invoker: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfigBlock {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub retry_count: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_attempts: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_retry_seconds: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub min_backoff_seconds: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_backoff_seconds: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_doublings: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitsBlock {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_concurrent_dispatches: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_dispatches_per_second: Option<Value>,
}
