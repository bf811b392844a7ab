//! Fixed enumerations with a wire representation.
//!
//! Each enum exposes `from_label`, keyed by the Rust variant name, so the
//! scanner can turn `MemoryOption::Gb1` found in source into the same value
//! the runtime gets from `MemoryOption::Gb1.into()`.

use serde::{Deserialize, Serialize};

/// Memory available to a single instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOption {
  Mb128,
  Mb256,
  Mb512,
  Gb1,
  Gb2,
  Gb4,
  Gb8,
  Gb16,
  Gb32,
}

impl MemoryOption {
  pub fn from_label(label: &str) -> Option<Self> {
    let memory = match label {
      "Mb128" => Self::Mb128,
      "Mb256" => Self::Mb256,
      "Mb512" => Self::Mb512,
      "Gb1" => Self::Gb1,
      "Gb2" => Self::Gb2,
      "Gb4" => Self::Gb4,
      "Gb8" => Self::Gb8,
      "Gb16" => Self::Gb16,
      "Gb32" => Self::Gb32,
      _ => return None,
    };
    Some(memory)
  }

  /// Size in megabytes.
  pub fn megabytes(self) -> u32 {
    match self {
      Self::Mb128 => 128,
      Self::Mb256 => 256,
      Self::Mb512 => 512,
      Self::Gb1 => 1024,
      Self::Gb2 => 2048,
      Self::Gb4 => 4096,
      Self::Gb8 => 8192,
      Self::Gb16 => 16384,
      Self::Gb32 => 32768,
    }
  }
}

/// Regions an endpoint can be deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedRegion {
  AsiaEast1,
  AsiaEast2,
  AsiaNortheast1,
  AsiaNortheast2,
  AsiaNortheast3,
  AsiaSouth1,
  AsiaSoutheast1,
  AsiaSoutheast2,
  AustraliaSoutheast1,
  EuropeCentral2,
  EuropeNorth1,
  EuropeWest1,
  EuropeWest2,
  EuropeWest3,
  EuropeWest6,
  NorthamericaNortheast1,
  SouthamericaEast1,
  UsCentral1,
  UsEast1,
  UsEast4,
  UsWest1,
  UsWest2,
  UsWest3,
  UsWest4,
}

impl SupportedRegion {
  pub fn from_label(label: &str) -> Option<Self> {
    let region = match label {
      "AsiaEast1" => Self::AsiaEast1,
      "AsiaEast2" => Self::AsiaEast2,
      "AsiaNortheast1" => Self::AsiaNortheast1,
      "AsiaNortheast2" => Self::AsiaNortheast2,
      "AsiaNortheast3" => Self::AsiaNortheast3,
      "AsiaSouth1" => Self::AsiaSouth1,
      "AsiaSoutheast1" => Self::AsiaSoutheast1,
      "AsiaSoutheast2" => Self::AsiaSoutheast2,
      "AustraliaSoutheast1" => Self::AustraliaSoutheast1,
      "EuropeCentral2" => Self::EuropeCentral2,
      "EuropeNorth1" => Self::EuropeNorth1,
      "EuropeWest1" => Self::EuropeWest1,
      "EuropeWest2" => Self::EuropeWest2,
      "EuropeWest3" => Self::EuropeWest3,
      "EuropeWest6" => Self::EuropeWest6,
      "NorthamericaNortheast1" => Self::NorthamericaNortheast1,
      "SouthamericaEast1" => Self::SouthamericaEast1,
      "UsCentral1" => Self::UsCentral1,
      "UsEast1" => Self::UsEast1,
      "UsEast4" => Self::UsEast4,
      "UsWest1" => Self::UsWest1,
      "UsWest2" => Self::UsWest2,
      "UsWest3" => Self::UsWest3,
      "UsWest4" => Self::UsWest4,
      _ => return None,
    };
    Some(region)
  }

  /// Region code, e.g. "europe-west1".
  pub fn code(self) -> &'static str {
    match self {
      Self::AsiaEast1 => "asia-east1",
      Self::AsiaEast2 => "asia-east2",
      Self::AsiaNortheast1 => "asia-northeast1",
      Self::AsiaNortheast2 => "asia-northeast2",
      Self::AsiaNortheast3 => "asia-northeast3",
      Self::AsiaSouth1 => "asia-south1",
      Self::AsiaSoutheast1 => "asia-southeast1",
      Self::AsiaSoutheast2 => "asia-southeast2",
      Self::AustraliaSoutheast1 => "australia-southeast1",
      Self::EuropeCentral2 => "europe-central2",
      Self::EuropeNorth1 => "europe-north1",
      Self::EuropeWest1 => "europe-west1",
      Self::EuropeWest2 => "europe-west2",
      Self::EuropeWest3 => "europe-west3",
      Self::EuropeWest6 => "europe-west6",
      Self::NorthamericaNortheast1 => "northamerica-northeast1",
      Self::SouthamericaEast1 => "southamerica-east1",
      Self::UsCentral1 => "us-central1",
      Self::UsEast1 => "us-east1",
      Self::UsEast4 => "us-east4",
      Self::UsWest1 => "us-west1",
      Self::UsWest2 => "us-west2",
      Self::UsWest3 => "us-west3",
      Self::UsWest4 => "us-west4",
    }
  }
}

/// Which outbound traffic is routed through the VPC connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VpcEgress {
  PrivateRangesOnly,
  AllTraffic,
}

impl VpcEgress {
  pub fn from_label(label: &str) -> Option<Self> {
    match label {
      "PrivateRangesOnly" => Some(Self::PrivateRangesOnly),
      "AllTraffic" => Some(Self::AllTraffic),
      _ => None,
    }
  }

  pub fn wire_name(self) -> &'static str {
    match self {
      Self::PrivateRangesOnly => "PRIVATE_RANGES_ONLY",
      Self::AllTraffic => "ALL_TRAFFIC",
    }
  }
}

/// Which inbound traffic may reach the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngressSetting {
  AllowAll,
  AllowInternalOnly,
  AllowInternalAndGclb,
}

impl IngressSetting {
  pub fn from_label(label: &str) -> Option<Self> {
    match label {
      "AllowAll" => Some(Self::AllowAll),
      "AllowInternalOnly" => Some(Self::AllowInternalOnly),
      "AllowInternalAndGclb" => Some(Self::AllowInternalAndGclb),
      _ => None,
    }
  }

  pub fn wire_name(self) -> &'static str {
    match self {
      Self::AllowAll => "ALLOW_ALL",
      Self::AllowInternalOnly => "ALLOW_INTERNAL_ONLY",
      Self::AllowInternalAndGclb => "ALLOW_INTERNAL_AND_GCLB",
    }
  }
}

/// Look up an enumeration constant by type and variant name.
///
/// Returns the wire value for `MemoryOption::Gb1` style paths, or `None`
/// when the type or variant is not part of the table.
pub fn constant_value(type_name: &str, variant: &str) -> Option<serde_json::Value> {
  match type_name {
    "MemoryOption" => MemoryOption::from_label(variant).map(|m| m.megabytes().into()),
    "SupportedRegion" => SupportedRegion::from_label(variant).map(|r| r.code().into()),
    "VpcEgress" => VpcEgress::from_label(variant).map(|e| e.wire_name().into()),
    "IngressSetting" => IngressSetting::from_label(variant).map(|i| i.wire_name().into()),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_megabytes() {
    assert_eq!(MemoryOption::Mb512.megabytes(), 512);
    assert_eq!(MemoryOption::Gb1.megabytes(), 1024);
    assert_eq!(MemoryOption::Gb32.megabytes(), 32768);
  }

  #[test]
  fn test_constant_value_lookup() {
    assert_eq!(constant_value("MemoryOption", "Gb2"), Some(serde_json::json!(2048)));
    assert_eq!(
      constant_value("SupportedRegion", "EuropeWest1"),
      Some(serde_json::json!("europe-west1"))
    );
    assert_eq!(
      constant_value("VpcEgress", "AllTraffic"),
      Some(serde_json::json!("ALL_TRAFFIC"))
    );
    assert_eq!(
      constant_value("IngressSetting", "AllowInternalAndGclb"),
      Some(serde_json::json!("ALLOW_INTERNAL_AND_GCLB"))
    );
  }

  #[test]
  fn test_constant_value_unknown() {
    assert_eq!(constant_value("MemoryOption", "Gb3"), None);
    assert_eq!(constant_value("Unknown", "Gb1"), None);
  }

  #[test]
  fn test_wire_name_matches_serde() {
    let egress = serde_json::to_value(VpcEgress::PrivateRangesOnly).unwrap();
    assert_eq!(egress, VpcEgress::PrivateRangesOnly.wire_name());

    let ingress = serde_json::to_value(IngressSetting::AllowInternalOnly).unwrap();
    assert_eq!(ingress, IngressSetting::AllowInternalOnly.wire_name());
  }
}
