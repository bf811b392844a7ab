//! Shape helpers over `syn` expressions.

use syn::punctuated::Punctuated;
use syn::{Expr, ExprMacro, ExprStruct, Lit, Member, Path, Stmt, Token, UnOp};

/// Conversions that do not change the value a declaration sees.
const TRANSPARENT_METHODS: &[&str] = &["into", "to_string", "to_owned", "clone"];

/// One-argument constructors that do not change the value.
const TRANSPARENT_CALLS: &[&[&str]] = &[
  &["Some"],
  &["String", "from"],
  &["OptionValue", "from"],
  &["OptionValue", "literal"],
  &["Value", "from"],
];

/// Whether the trailing segments of `path` are `tail`.
pub(crate) fn path_ends_with(path: &Path, tail: &[&str]) -> bool {
  if path.segments.len() < tail.len() {
    return false;
  }
  path
    .segments
    .iter()
    .rev()
    .zip(tail.iter().rev())
    .all(|(segment, expected)| segment.ident == expected)
}

/// Strip wrappers that carry a value through unchanged: parentheses,
/// references, derefs, `?`, `Some(..)`, `.into()` and friends.
pub(crate) fn peel(mut expr: &Expr) -> &Expr {
  loop {
    expr = match expr {
      Expr::Paren(inner) => &inner.expr,
      Expr::Group(inner) => &inner.expr,
      Expr::Reference(inner) => &inner.expr,
      Expr::Try(inner) => &inner.expr,
      Expr::Unary(unary) if matches!(unary.op, UnOp::Deref(_)) => &unary.expr,
      Expr::MethodCall(call)
        if call.args.is_empty()
          && TRANSPARENT_METHODS.iter().any(|m| call.method == m) =>
      {
        &call.receiver
      }
      Expr::Call(call) if call.args.len() == 1 => match &*call.func {
        Expr::Path(func)
          if TRANSPARENT_CALLS
            .iter()
            .any(|tail| path_ends_with(&func.path, tail) && func.path.segments.len() == tail.len()) =>
        {
          &call.args[0]
        }
        _ => return expr,
      },
      _ => return expr,
    };
  }
}

/// A string literal, possibly wrapped in conversions.
pub(crate) fn string(expr: &Expr) -> Option<String> {
  match peel(expr) {
    Expr::Lit(lit) => match &lit.lit {
      Lit::Str(s) => Some(s.value()),
      _ => None,
    },
    _ => None,
  }
}

/// A boolean literal.
pub(crate) fn boolean(expr: &Expr) -> Option<bool> {
  match peel(expr) {
    Expr::Lit(lit) => match &lit.lit {
      Lit::Bool(b) => Some(b.value),
      _ => None,
    },
    _ => None,
  }
}

/// Elements of a `vec![..]` or array expression.
pub(crate) fn elements(expr: &Expr) -> Option<Vec<Expr>> {
  match peel(expr) {
    Expr::Macro(ExprMacro { mac, .. }) if mac.path.is_ident("vec") => mac
      .parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated)
      .ok()
      .map(|items| items.into_iter().collect()),
    Expr::Array(array) => Some(array.elems.iter().cloned().collect()),
    _ => None,
  }
}

/// A list of string literals. Any non-literal element rejects the list.
pub(crate) fn string_list(expr: &Expr) -> Option<Vec<String>> {
  elements(expr)?.iter().map(string).collect()
}

/// `(key, value)` string pairs of a `BTreeMap::from([..])`-style literal.
pub(crate) fn string_pairs(expr: &Expr) -> Option<Vec<(String, String)>> {
  let list = match peel(expr) {
    Expr::Call(call) if call.args.len() == 1 => match &*call.func {
      Expr::Path(func) if func.path.segments.last().is_some_and(|s| s.ident == "from") => {
        &call.args[0]
      }
      _ => return None,
    },
    _ => return None,
  };

  elements(list)?
    .iter()
    .map(|pair| match pair {
      Expr::Tuple(tuple) if tuple.elems.len() == 2 => {
        Some((string(&tuple.elems[0])?, string(&tuple.elems[1])?))
      }
      _ => None,
    })
    .collect()
}

/// Field access over a struct literal such as `PubSubOptions { .. }`.
///
/// Anything that is not a struct literal behaves like one with no fields,
/// so defaults apply.
#[derive(Clone, Copy)]
pub(crate) struct StructLiteral<'a> {
  inner: Option<&'a ExprStruct>,
}

impl<'a> StructLiteral<'a> {
  pub(crate) fn of(expr: Option<&'a Expr>) -> Self {
    let inner = match expr.map(peel) {
      Some(Expr::Struct(literal)) => Some(literal),
      _ => None,
    };
    Self { inner }
  }

  /// Name of the struct, e.g. `EndpointOptions`.
  pub(crate) fn type_name(&self) -> Option<String> {
    self
      .inner?
      .path
      .segments
      .last()
      .map(|s| s.ident.to_string())
  }

  pub(crate) fn field(&self, name: &str) -> Option<&'a Expr> {
    self.inner?.fields.iter().find_map(|field| match &field.member {
      Member::Named(ident) if ident == name => Some(&field.expr),
      _ => None,
    })
  }

  pub(crate) fn fields(self) -> impl Iterator<Item = (String, &'a Expr)> + 'a {
    self
      .inner
      .into_iter()
      .flat_map(|literal| literal.fields.iter())
      .filter_map(|field| match &field.member {
        Member::Named(ident) => Some((ident.to_string(), &field.expr)),
        Member::Unnamed(_) => None,
      })
  }

  pub(crate) fn string(&self, name: &str) -> Option<String> {
    self.field(name).and_then(string)
  }

  pub(crate) fn boolean(&self, name: &str) -> bool {
    self.field(name).and_then(boolean).unwrap_or(false)
  }

  pub(crate) fn string_list(&self, name: &str) -> Vec<String> {
    self.field(name).and_then(string_list).unwrap_or_default()
  }
}

/// The value expression of `LazyLock::new(|| ..)` or a block, or the
/// expression itself.
pub(crate) fn initializer(expr: &Expr) -> &Expr {
  let expr = peel(expr);
  match expr {
    Expr::Call(call) if call.args.len() == 1 => match &*call.func {
      Expr::Path(func)
        if path_ends_with(&func.path, &["LazyLock", "new"])
          || path_ends_with(&func.path, &["Lazy", "new"]) =>
      {
        match &call.args[0] {
          Expr::Closure(closure) => initializer(&closure.body),
          _ => expr,
        }
      }
      _ => expr,
    },
    Expr::Block(block) => match block.block.stmts.last() {
      Some(Stmt::Expr(last, None)) => initializer(last),
      _ => expr,
    },
    _ => expr,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn expr(src: &str) -> Expr {
    syn::parse_str(src).unwrap()
  }

  #[test]
  fn test_string_through_conversions() {
    assert_eq!(string(&expr(r#""a".into()"#)), Some("a".to_string()));
    assert_eq!(string(&expr(r#"String::from("b")"#)), Some("b".to_string()));
    assert_eq!(string(&expr(r#"Some("c".to_string())"#)), Some("c".to_string()));
    assert_eq!(string(&expr("topic_name")), None);
    assert_eq!(string(&expr(r#"format!("{}", x)"#)), None);
  }

  #[test]
  fn test_string_list_from_vec_macro() {
    assert_eq!(
      string_list(&expr(r#"vec!["public".into(), "admin".to_string()]"#)),
      Some(vec!["public".to_string(), "admin".to_string()])
    );
    assert_eq!(string_list(&expr(r#"vec!["a".into(), name]"#)), None);
  }

  #[test]
  fn test_string_pairs_from_map() {
    assert_eq!(
      string_pairs(&expr(r#"BTreeMap::from([("team".into(), "orders".into())])"#)),
      Some(vec![("team".to_string(), "orders".to_string())])
    );
  }

  #[test]
  fn test_struct_literal_fields() {
    let e = expr(r#"PubSubOptions { topic: "t".into(), ..Default::default() }"#);
    let literal = StructLiteral::of(Some(&e));
    assert_eq!(literal.type_name().as_deref(), Some("PubSubOptions"));
    assert_eq!(literal.string("topic"), Some("t".to_string()));
    assert!(literal.field("options").is_none());

    let e = expr("PubSubOptions::default()");
    assert!(StructLiteral::of(Some(&e)).string("topic").is_none());
  }

  #[test]
  fn test_lazy_lock_initializer() {
    let e = expr(r#"LazyLock::new(|| params::define_int("MIN_MEM", ParamOptions::default()))"#);
    match initializer(&e) {
      Expr::Call(call) => match &*call.func {
        Expr::Path(func) => assert!(path_ends_with(&func.path, &["params", "define_int"])),
        _ => panic!("expected a path call"),
      },
      _ => panic!("expected the closure body"),
    }
  }
}
