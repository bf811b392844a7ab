use std::collections::BTreeMap;

use crate::option::OptionValue;

/// Deployment options shared by every trigger type.
///
/// Fields left as `None` are omitted from the manifest, as are fields set to
/// [`OptionValue::Reset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointOptions {
  /// A region code, a list of region codes, or a deferred expression.
  pub region: Option<OptionValue>,
  /// Memory in megabytes.
  pub memory: Option<OptionValue>,
  pub cpu: Option<OptionValue>,
  pub timeout_seconds: Option<OptionValue>,
  pub concurrency: Option<OptionValue>,
  pub min_instances: Option<OptionValue>,
  pub max_instances: Option<OptionValue>,
  pub service_account: Option<OptionValue>,
  pub vpc_connector: Option<OptionValue>,
  pub vpc_egress: Option<OptionValue>,
  pub ingress: Option<OptionValue>,
  /// Retry failed event deliveries. Only meaningful for event triggers.
  pub retry: Option<OptionValue>,
  pub labels: BTreeMap<String, String>,
  /// Names of secret parameters exposed to the endpoint.
  pub secrets: Vec<String>,
}

impl EndpointOptions {
  /// Names of the scalar fields that [`EndpointOptions::set`] accepts.
  pub const SCALAR_FIELDS: &'static [&'static str] = &[
    "region",
    "memory",
    "cpu",
    "timeout_seconds",
    "concurrency",
    "min_instances",
    "max_instances",
    "service_account",
    "vpc_connector",
    "vpc_egress",
    "ingress",
    "retry",
  ];

  /// Set a scalar field by its Rust field name.
  ///
  /// Returns `false` for unknown names, leaving the options unchanged.
  pub fn set(&mut self, field: &str, value: OptionValue) -> bool {
    let slot = match field {
      "region" => &mut self.region,
      "memory" => &mut self.memory,
      "cpu" => &mut self.cpu,
      "timeout_seconds" => &mut self.timeout_seconds,
      "concurrency" => &mut self.concurrency,
      "min_instances" => &mut self.min_instances,
      "max_instances" => &mut self.max_instances,
      "service_account" => &mut self.service_account,
      "vpc_connector" => &mut self.vpc_connector,
      "vpc_egress" => &mut self.vpc_egress,
      "ingress" => &mut self.ingress,
      "retry" => &mut self.retry,
      _ => return false,
    };
    *slot = Some(value);
    true
  }
}
