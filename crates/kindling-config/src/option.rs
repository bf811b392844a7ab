//! Option values as declared on a trigger.
//!
//! An option is either known at analysis time (a literal) or deferred until
//! deploy time (a parameter reference or a conditional on a boolean
//! parameter). Deferred values are written to the manifest as
//! `{{ params.NAME }}` expressions that the deployment tool evaluates.

use serde_json::Value;

use crate::enums::{IngressSetting, MemoryOption, SupportedRegion, VpcEgress};

/// Anything that names a declared parameter.
pub trait ParamRef {
  /// Wire name of the parameter, e.g. "MIN_MEM".
  fn param_name(&self) -> &str;
}

impl ParamRef for str {
  fn param_name(&self) -> &str {
    self
  }
}

impl ParamRef for String {
  fn param_name(&self) -> &str {
    self
  }
}

/// A single option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
  /// Value known when the declaration is read.
  Literal(Value),
  /// Value of the named parameter, resolved at deploy time.
  ParamReference(String),
  /// `then` when the boolean parameter `test` is true, `otherwise` if not.
  Conditional {
    test: String,
    then: Value,
    otherwise: Value,
  },
  /// Explicitly fall back to the platform default.
  Reset,
}

impl OptionValue {
  pub fn literal(value: impl Into<Value>) -> Self {
    Self::Literal(value.into())
  }

  pub fn param<P: ParamRef + ?Sized>(param: &P) -> Self {
    Self::ParamReference(param.param_name().to_string())
  }

  pub fn when<P: ParamRef + ?Sized>(
    test: &P,
    then: impl Into<Value>,
    otherwise: impl Into<Value>,
  ) -> Self {
    Self::Conditional {
      test: test.param_name().to_string(),
      then: then.into(),
      otherwise: otherwise.into(),
    }
  }

  pub fn reset() -> Self {
    Self::Reset
  }

  /// Whether the value is only known at deploy time.
  pub fn is_deferred(&self) -> bool {
    matches!(self, Self::ParamReference(_) | Self::Conditional { .. })
  }

  /// The literal value, if any.
  pub fn as_literal(&self) -> Option<&Value> {
    match self {
      Self::Literal(value) => Some(value),
      _ => None,
    }
  }

  /// Render the value the way it appears in the manifest.
  ///
  /// `Reset` renders as `None` so the field is omitted.
  pub fn to_manifest_value(&self) -> Option<Value> {
    match self {
      Self::Literal(value) => Some(value.clone()),
      Self::ParamReference(name) => Some(Value::String(format!("{{{{ params.{} }}}}", name))),
      Self::Conditional {
        test,
        then,
        otherwise,
      } => Some(Value::String(format!(
        "{{{{ params.{} ? {} : {} }}}}",
        test, then, otherwise
      ))),
      Self::Reset => None,
    }
  }
}

impl From<i32> for OptionValue {
  fn from(value: i32) -> Self {
    Self::Literal(value.into())
  }
}

impl From<i64> for OptionValue {
  fn from(value: i64) -> Self {
    Self::Literal(value.into())
  }
}

impl From<u32> for OptionValue {
  fn from(value: u32) -> Self {
    Self::Literal(value.into())
  }
}

impl From<u64> for OptionValue {
  fn from(value: u64) -> Self {
    Self::Literal(value.into())
  }
}

impl From<f64> for OptionValue {
  fn from(value: f64) -> Self {
    Self::Literal(value.into())
  }
}

impl From<bool> for OptionValue {
  fn from(value: bool) -> Self {
    Self::Literal(value.into())
  }
}

impl From<&str> for OptionValue {
  fn from(value: &str) -> Self {
    Self::Literal(value.into())
  }
}

impl From<String> for OptionValue {
  fn from(value: String) -> Self {
    Self::Literal(value.into())
  }
}

impl From<MemoryOption> for OptionValue {
  fn from(value: MemoryOption) -> Self {
    Self::Literal(value.megabytes().into())
  }
}

impl From<SupportedRegion> for OptionValue {
  fn from(value: SupportedRegion) -> Self {
    Self::Literal(value.code().into())
  }
}

impl From<Vec<SupportedRegion>> for OptionValue {
  fn from(value: Vec<SupportedRegion>) -> Self {
    Self::Literal(Value::Array(
      value.into_iter().map(|r| Value::from(r.code())).collect(),
    ))
  }
}

impl From<VpcEgress> for OptionValue {
  fn from(value: VpcEgress) -> Self {
    Self::Literal(value.wire_name().into())
  }
}

impl From<IngressSetting> for OptionValue {
  fn from(value: IngressSetting) -> Self {
    Self::Literal(value.wire_name().into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_literal_renders_verbatim() {
    let value = OptionValue::from(512);
    assert_eq!(value.to_manifest_value(), Some(json!(512)));
    assert!(!value.is_deferred());
  }

  #[test]
  fn test_param_reference_renders_expression() {
    let value = OptionValue::param("MIN_MEM");
    assert_eq!(
      value.to_manifest_value(),
      Some(json!("{{ params.MIN_MEM }}"))
    );
    assert!(value.is_deferred());
  }

  #[test]
  fn test_conditional_renders_ternary() {
    let value = OptionValue::when("IS_PROD", 2, 0);
    assert_eq!(
      value.to_manifest_value(),
      Some(json!("{{ params.IS_PROD ? 2 : 0 }}"))
    );

    let value = OptionValue::when("IS_PROD", "a", "b");
    assert_eq!(
      value.to_manifest_value(),
      Some(json!("{{ params.IS_PROD ? \"a\" : \"b\" }}"))
    );
  }

  #[test]
  fn test_reset_is_omitted() {
    assert_eq!(OptionValue::reset().to_manifest_value(), None);
  }

  #[test]
  fn test_enum_conversions() {
    assert_eq!(
      OptionValue::from(MemoryOption::Gb1),
      OptionValue::Literal(json!(1024))
    );
    assert_eq!(
      OptionValue::from(vec![SupportedRegion::UsEast1, SupportedRegion::EuropeWest1]),
      OptionValue::Literal(json!(["us-east1", "europe-west1"]))
    );
    assert_eq!(
      OptionValue::from(IngressSetting::AllowAll),
      OptionValue::Literal(json!("ALLOW_ALL"))
    );
  }
}
