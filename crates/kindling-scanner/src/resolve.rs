//! Option resolution.
//!
//! Reduces an option expression to an [`OptionValue`] without evaluating
//! it. Four shapes are understood: literals and enumeration constants,
//! `OptionValue::param(..)`, `OptionValue::reset()` and
//! `OptionValue::when(..)`. Anything else resolves to `None` and the option
//! is left unset.

use std::collections::HashMap;

use heck::ToShoutySnakeCase;
use kindling_config::{EndpointOptions, OptionValue, ParamOptions, constant_value};
use kindling_trigger::{RateLimits, RetryConfig};
use serde_json::Value;
use syn::{Expr, ExprMacro, Lit, UnOp};

use crate::syntax::{self, StructLiteral, path_ends_with, peel};

/// Maps program variables bound to parameter declarations to the
/// parameter's declared name.
pub type Bindings = HashMap<String, String>;

pub struct Resolver<'a> {
  bindings: &'a Bindings,
}

impl<'a> Resolver<'a> {
  pub fn new(bindings: &'a Bindings) -> Self {
    Self { bindings }
  }

  /// Resolve an option expression.
  pub fn option(&self, expr: &Expr) -> Option<OptionValue> {
    let expr = peel(expr);

    match expr {
      Expr::Path(path) if path_ends_with(&path.path, &["OptionValue", "Reset"]) => {
        return Some(OptionValue::Reset);
      }
      Expr::Call(call) => {
        if let Expr::Path(func) = &*call.func {
          let args: Vec<&Expr> = call.args.iter().collect();
          if path_ends_with(&func.path, &["OptionValue", "reset"]) {
            return Some(OptionValue::Reset);
          }
          if path_ends_with(&func.path, &["OptionValue", "param"]) && args.len() == 1 {
            return self.param_name(args[0]).map(OptionValue::ParamReference);
          }
          if path_ends_with(&func.path, &["OptionValue", "when"]) && args.len() == 3 {
            return Some(OptionValue::Conditional {
              test: self.param_name(args[0])?,
              then: self.literal(args[1])?,
              otherwise: self.literal(args[2])?,
            });
          }
        }
      }
      _ => {}
    }

    self.literal(expr).map(OptionValue::Literal)
  }

  /// Resolve a compile-time literal value.
  ///
  /// Covers number, string and boolean literals, negated numbers,
  /// enumeration constants, `vec![..]` of literals and `json!(..)`.
  pub fn literal(&self, expr: &Expr) -> Option<Value> {
    let expr = peel(expr);
    match expr {
      Expr::Lit(lit) => lit_value(&lit.lit, false),
      Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => match peel(&unary.expr) {
        Expr::Lit(lit) => lit_value(&lit.lit, true),
        _ => None,
      },
      Expr::Path(path) => {
        let segments: Vec<String> = path
          .path
          .segments
          .iter()
          .map(|s| s.ident.to_string())
          .collect();
        match segments.as_slice() {
          [.., type_name, variant] => constant_value(type_name, variant),
          _ => None,
        }
      }
      Expr::Macro(ExprMacro { mac, .. }) if mac.path.is_ident("json") => {
        let inner: Expr = mac.parse_body().ok()?;
        self.literal(&inner)
      }
      Expr::Macro(_) | Expr::Array(_) => {
        let items = syntax::elements(expr)?;
        items
          .iter()
          .map(|item| self.literal(item))
          .collect::<Option<Vec<_>>>()
          .map(Value::Array)
      }
      _ => None,
    }
  }

  /// Wire name of the parameter an argument refers to.
  ///
  /// A string literal is the wire name itself. A variable is looked up in
  /// the bindings, falling back to its UPPER_SNAKE form.
  pub fn param_name(&self, expr: &Expr) -> Option<String> {
    if let Some(name) = syntax::string(expr) {
      return Some(name);
    }
    match peel(expr) {
      Expr::Path(path) => {
        let ident = path.path.segments.last()?.ident.to_string();
        Some(
          self
            .bindings
            .get(&ident)
            .cloned()
            .unwrap_or_else(|| ident.to_shouty_snake_case()),
        )
      }
      _ => None,
    }
  }

  /// Read an `EndpointOptions { .. }` literal.
  pub fn endpoint_options(&self, literal: StructLiteral<'_>) -> EndpointOptions {
    let mut options = EndpointOptions::default();

    for (field, expr) in literal.fields() {
      match field.as_str() {
        "labels" => {
          for (key, value) in syntax::string_pairs(expr).unwrap_or_default() {
            options.labels.insert(key, value);
          }
        }
        "secrets" => options.secrets = syntax::string_list(expr).unwrap_or_default(),
        name if EndpointOptions::SCALAR_FIELDS.contains(&name) => {
          if let Some(value) = self.option(expr) {
            options.set(name, value);
          }
        }
        _ => {}
      }
    }

    options
  }

  /// Read a `RetryConfig { .. }` literal.
  pub fn retry_config(&self, literal: StructLiteral<'_>) -> RetryConfig {
    let mut retry = RetryConfig::default();
    for (field, expr) in literal.fields() {
      if let Some(value) = self.option(expr) {
        retry.set(&field, value);
      }
    }
    retry
  }

  /// Read a `RateLimits { .. }` literal.
  pub fn rate_limits(&self, literal: StructLiteral<'_>) -> RateLimits {
    let mut limits = RateLimits::default();
    for (field, expr) in literal.fields() {
      if let Some(value) = self.option(expr) {
        limits.set(&field, value);
      }
    }
    limits
  }

  /// Read a `ParamOptions { .. }` literal.
  pub fn param_options(&self, literal: StructLiteral<'_>) -> ParamOptions {
    ParamOptions {
      default: literal.field("default").and_then(|e| self.literal(e)),
      label: literal.string("label"),
      description: literal.string("description"),
    }
  }
}

fn lit_value(lit: &Lit, negate: bool) -> Option<Value> {
  match lit {
    Lit::Int(int) => {
      let value: i64 = int.base10_parse().ok()?;
      Some(Value::from(if negate { -value } else { value }))
    }
    Lit::Float(float) => {
      let value: f64 = float.base10_parse().ok()?;
      Some(Value::from(if negate { -value } else { value }))
    }
    Lit::Str(s) if !negate => Some(Value::from(s.value())),
    Lit::Bool(b) if !negate => Some(Value::from(b.value)),
    _ => None,
  }
}
