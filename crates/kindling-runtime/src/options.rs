//! Declaration options, one struct per trigger family.
//!
//! Each struct holds the fields that identify the trigger plus the shared
//! [`EndpointOptions`]. Identifying fields should be string literals for the
//! declaration to appear in a generated manifest.

use std::collections::BTreeMap;

use kindling_config::{EndpointOptions, OptionValue};
use kindling_trigger::{RateLimits, RetryConfig};

#[derive(Debug, Clone, Default)]
pub struct HttpsOptions {
  pub name: String,
  pub invoker: Vec<String>,
  pub cors: Vec<String>,
  pub options: EndpointOptions,
}

#[derive(Debug, Clone, Default)]
pub struct CallableOptions {
  pub name: String,
  pub enforce_app_check: bool,
  pub options: EndpointOptions,
}

#[derive(Debug, Clone, Default)]
pub struct PubSubOptions {
  pub topic: String,
  pub options: EndpointOptions,
}

#[derive(Debug, Clone, Default)]
pub struct FirestoreOptions {
  /// Document path pattern, e.g. `users/{userId}`.
  pub document: String,
  pub database: Option<String>,
  pub namespace: Option<String>,
  pub options: EndpointOptions,
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseOptions {
  /// Reference path pattern, e.g. `/messages/{id}`.
  pub reference: String,
  pub instance: Option<String>,
  pub options: EndpointOptions,
}

#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
  pub bucket: String,
  pub options: EndpointOptions,
}

#[derive(Debug, Clone, Default)]
pub struct AlertOptions {
  pub alert_type: String,
  pub app_id: Option<String>,
  pub options: EndpointOptions,
}

/// Options for alerts whose type is fixed by the declaring method.
#[derive(Debug, Clone, Default)]
pub struct AppAlertOptions {
  pub app_id: Option<String>,
  pub options: EndpointOptions,
}

#[derive(Debug, Clone, Default)]
pub struct BlockingOptions {
  pub id_token: bool,
  pub access_token: bool,
  pub refresh_token: bool,
  pub options: EndpointOptions,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleOptions {
  /// Cron expression or App Engine schedule, e.g. `every 5 minutes`.
  pub schedule: String,
  pub time_zone: Option<OptionValue>,
  pub retry: RetryConfig,
  pub options: EndpointOptions,
}

#[derive(Debug, Clone, Default)]
pub struct TaskQueueOptions {
  pub name: String,
  pub retry: RetryConfig,
  pub rate_limits: RateLimits,
  pub invoker: Vec<String>,
  pub options: EndpointOptions,
}

#[derive(Debug, Clone, Default)]
pub struct CustomEventOptions {
  pub event_type: String,
  pub channel: Option<String>,
  pub filters: BTreeMap<String, String>,
  pub options: EndpointOptions,
}

/// Options for triggers with no identifying fields.
#[derive(Debug, Clone, Default)]
pub struct EventOptions {
  pub options: EndpointOptions,
}
