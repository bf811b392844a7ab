use serde::{Deserialize, Serialize};

use crate::option::ParamRef;

/// Value type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
  #[serde(rename = "string")]
  String,
  #[serde(rename = "int")]
  Int,
  #[serde(rename = "float")]
  Float,
  #[serde(rename = "boolean")]
  Bool,
  #[serde(rename = "list")]
  List,
  #[serde(rename = "secret")]
  Secret,
}

/// Encoding of a secret parameter's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretFormat {
  Json,
}

/// Optional metadata supplied when declaring a parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamOptions {
  pub default: Option<serde_json::Value>,
  pub label: Option<String>,
  pub description: Option<String>,
}

/// A declared parameter, as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
  pub name: String,
  #[serde(rename = "type")]
  pub param_type: ParamType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub format: Option<SecretFormat>,
}

impl ParamSpec {
  pub fn new(name: impl Into<String>, param_type: ParamType, options: ParamOptions) -> Self {
    Self {
      name: name.into(),
      param_type,
      default: options.default,
      label: options.label,
      description: options.description,
      format: None,
    }
  }

  /// A secret whose value is a JSON document.
  pub fn json_secret(name: impl Into<String>) -> Self {
    Self {
      format: Some(SecretFormat::Json),
      ..Self::new(name, ParamType::Secret, ParamOptions::default())
    }
  }
}

impl ParamRef for ParamSpec {
  fn param_name(&self) -> &str {
    &self.name
  }
}
