//! Parameter declarations.
//!
//! The `define_*` functions build a [`Param`] without registering it, for
//! use in `static` items. Parameters declared through
//! [`Functions::params`](crate::Functions::params) are also listed in the
//! live manifest.

use kindling_config::{ParamOptions, ParamRef, ParamSpec, ParamType};

/// A declared parameter. Pass it to `OptionValue::param` or
/// `OptionValue::when` to defer an option to deploy time.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
  spec: ParamSpec,
}

impl Param {
  pub fn name(&self) -> &str {
    &self.spec.name
  }

  pub fn param_type(&self) -> ParamType {
    self.spec.param_type
  }

  pub fn spec(&self) -> &ParamSpec {
    &self.spec
  }
}

impl ParamRef for Param {
  fn param_name(&self) -> &str {
    &self.spec.name
  }
}

fn define(name: &str, param_type: ParamType, options: ParamOptions) -> Param {
  Param {
    spec: ParamSpec::new(name, param_type, options),
  }
}

pub fn define_string(name: &str, options: ParamOptions) -> Param {
  define(name, ParamType::String, options)
}

pub fn define_int(name: &str, options: ParamOptions) -> Param {
  define(name, ParamType::Int, options)
}

pub fn define_float(name: &str, options: ParamOptions) -> Param {
  define(name, ParamType::Float, options)
}

pub fn define_bool(name: &str, options: ParamOptions) -> Param {
  define(name, ParamType::Bool, options)
}

pub fn define_list(name: &str, options: ParamOptions) -> Param {
  define(name, ParamType::List, options)
}

pub fn define_secret(name: &str) -> Param {
  define(name, ParamType::Secret, ParamOptions::default())
}

/// A secret whose value is a JSON document.
pub fn define_json_secret(name: &str) -> Param {
  Param {
    spec: ParamSpec::json_secret(name),
  }
}
