use std::fs;
use std::path::Path;

use ignore::WalkBuilder;
use indexmap::IndexMap;
use kindling_config::{ParamSpec, ParamType};
use kindling_trigger::TriggerSpec;
use syn::visit::{self, Visit};
use syn::{Expr, ExprCall, ExprMethodCall, ItemConst, ItemStatic, Local, Pat};
use tracing::{debug, info, instrument, warn};

use crate::declarations::{NAMESPACES, lookup, param_declaration};
use crate::error::ScanError;
use crate::resolve::{Bindings, Resolver};
use crate::syntax::{self, StructLiteral, initializer, peel};

/// Declarations discovered by a scan.
///
/// Both maps are keyed by name and keep first-declaration order. A later
/// declaration with the same name replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
  pub params: IndexMap<String, ParamSpec>,
  /// Keyed by final name.
  pub triggers: IndexMap<String, TriggerSpec>,
}

impl ScanOutput {
  pub fn is_empty(&self) -> bool {
    self.params.is_empty() && self.triggers.is_empty()
  }
}

/// Scan every `.rs` file under `root`, honouring ignore files.
///
/// Files that cannot be read or parsed are skipped with a warning.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn scan_dir(root: &Path) -> Result<ScanOutput, ScanError> {
  if !root.is_dir() {
    return Err(ScanError::NotADirectory {
      path: root.to_path_buf(),
    });
  }

  let walker = WalkBuilder::new(root)
    .standard_filters(true)
    .follow_links(false)
    .sort_by_file_path(|a, b| a.cmp(b))
    .build();

  let mut files = Vec::new();
  for entry in walker {
    let entry = match entry {
      Ok(entry) => entry,
      Err(err) => {
        warn!(error = %err, "skipping unreadable entry");
        continue;
      }
    };
    if !entry.file_type().is_some_and(|t| t.is_file()) {
      continue;
    }
    let path = entry.path();
    if path.extension().is_none_or(|ext| ext != "rs") {
      continue;
    }

    let source = match fs::read_to_string(path) {
      Ok(source) => source,
      Err(err) => {
        warn!(path = %path.display(), error = %err, "skipping unreadable source file");
        continue;
      }
    };
    if let Some(file) = parse(&source, path) {
      files.push(file);
    }
  }

  let output = scan_files(&files);
  info!(
    files = files.len(),
    params = output.params.len(),
    triggers = output.triggers.len(),
    "scan complete"
  );
  Ok(output)
}

/// Scan a single source file.
pub fn scan_file(path: &Path) -> Result<ScanOutput, ScanError> {
  let source = fs::read_to_string(path).map_err(|source| ScanError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(parse(&source, path).map_or_else(ScanOutput::default, |file| scan_files(&[file])))
}

/// Scan source text. Unparseable text yields an empty output.
pub fn scan_source(source: &str) -> ScanOutput {
  parse(source, Path::new("<source>")).map_or_else(ScanOutput::default, |file| scan_files(&[file]))
}

fn parse(source: &str, path: &Path) -> Option<syn::File> {
  match syn::parse_file(source) {
    Ok(file) => Some(file),
    Err(err) => {
      warn!(path = %path.display(), error = %err, "skipping unparseable source file");
      None
    }
  }
}

/// Parameters first, across every file, so a trigger can reference a
/// parameter bound in another module.
fn scan_files(files: &[syn::File]) -> ScanOutput {
  let mut params = ParamCollector::default();
  for file in files {
    params.visit_file(file);
  }

  let resolver = Resolver::new(&params.bindings);
  let mut triggers = TriggerCollector {
    resolver,
    triggers: IndexMap::new(),
  };
  for file in files {
    triggers.visit_file(file);
  }

  let triggers = triggers.triggers;
  ScanOutput {
    params: params.into_params(),
    triggers,
  }
}

/// A `params` namespace call or a `params::define_*` function call.
struct ParamCall<'a> {
  method: String,
  param_type: ParamType,
  takes_options: bool,
  args: Vec<&'a Expr>,
}

impl<'a> ParamCall<'a> {
  fn of(expr: &'a Expr) -> Option<Self> {
    match peel(expr) {
      Expr::MethodCall(call) => Self::of_method_call(call),
      Expr::Call(call) => Self::of_call(call),
      _ => None,
    }
  }

  fn of_method_call(call: &'a ExprMethodCall) -> Option<Self> {
    if namespace_of(&call.receiver).as_deref() != Some("params") {
      return None;
    }
    Self::new(call.method.to_string(), call.args.iter().collect())
  }

  fn of_call(call: &'a ExprCall) -> Option<Self> {
    let Expr::Path(func) = &*call.func else {
      return None;
    };
    let segments = &func.path.segments;
    if segments.len() < 2 || segments[segments.len() - 2].ident != "params" {
      return None;
    }
    let method = segments.last()?.ident.to_string();
    Self::new(method, call.args.iter().collect())
  }

  fn new(method: String, args: Vec<&'a Expr>) -> Option<Self> {
    let (param_type, takes_options) = param_declaration(&method)?;
    Some(Self {
      method,
      param_type,
      takes_options,
      args,
    })
  }

  /// Declared wire name, when it is a literal.
  fn name(&self) -> Option<String> {
    self.args.first().and_then(|arg| syntax::string(arg))
  }

  fn spec(&self, resolver: &Resolver<'_>) -> Option<ParamSpec> {
    let name = self.name()?;
    if self.method == "define_json_secret" {
      return Some(ParamSpec::json_secret(name));
    }
    let options = if self.takes_options {
      resolver.param_options(StructLiteral::of(self.args.get(1).copied()))
    } else {
      Default::default()
    };
    Some(ParamSpec::new(name, self.param_type, options))
  }
}

/// Name of the namespace accessor a call is made on, e.g. `pubsub` for
/// `functions.pubsub()`.
fn namespace_of(receiver: &Expr) -> Option<String> {
  match peel(receiver) {
    Expr::MethodCall(call) if call.args.is_empty() => {
      let name = call.method.to_string();
      (name == "params" || NAMESPACES.contains(&name.as_str())).then_some(name)
    }
    _ => None,
  }
}

fn pat_ident(pat: &Pat) -> Option<String> {
  match pat {
    Pat::Ident(ident) => Some(ident.ident.to_string()),
    Pat::Type(typed) => pat_ident(&typed.pat),
    _ => None,
  }
}

/// A parameter listed in the manifest, in the order the runtime would add
/// it to its registry.
enum Listed {
  /// Defined through `functions.params().define_*`.
  Defined(ParamSpec),
  /// Passed to `functions.params().declare(..)`.
  Declared(Expr),
}

/// Collects parameter declarations and their variable bindings.
///
/// Free `params::define_*` calls only build a value, so they are listed
/// once a `declare` call names them, matching what the runtime registry
/// records.
#[derive(Default)]
struct ParamCollector {
  bindings: Bindings,
  listed: Vec<Listed>,
  free: IndexMap<String, ParamSpec>,
}

impl ParamCollector {
  fn bind(&mut self, variable: String, expr: &Expr) {
    if let Some(name) = ParamCall::of(initializer(expr)).and_then(|call| call.name()) {
      debug!(variable = %variable, param = %name, "bound parameter");
      self.bindings.insert(variable, name);
    }
  }

  fn spec(call: &ParamCall<'_>) -> Option<ParamSpec> {
    let bindings = Bindings::new();
    call.spec(&Resolver::new(&bindings))
  }

  /// Parameters in listing order, once every binding is known.
  fn into_params(self) -> IndexMap<String, ParamSpec> {
    let resolver = Resolver::new(&self.bindings);
    let mut params = IndexMap::new();
    for listed in &self.listed {
      match listed {
        Listed::Defined(spec) => {
          params.insert(spec.name.clone(), spec.clone());
        }
        Listed::Declared(arg) => {
          let name = match ParamCall::of(arg) {
            Some(call) => call.name(),
            None => resolver.param_name(arg),
          };
          let Some(name) = name else {
            debug!("skipping declare without a resolvable parameter");
            continue;
          };
          match self.free.get(&name) {
            Some(spec) => {
              params.insert(name, spec.clone());
            }
            None => debug!(param = %name, "declared parameter has no free definition"),
          }
        }
      }
    }
    for name in self.free.keys() {
      if !params.contains_key(name) {
        debug!(param = %name, "free parameter is never declared");
      }
    }
    params
  }
}

impl<'ast> Visit<'ast> for ParamCollector {
  fn visit_local(&mut self, local: &'ast Local) {
    if let (Some(variable), Some(init)) = (pat_ident(&local.pat), &local.init) {
      self.bind(variable, &init.expr);
    }
    visit::visit_local(self, local);
  }

  fn visit_item_static(&mut self, item: &'ast ItemStatic) {
    self.bind(item.ident.to_string(), &item.expr);
    visit::visit_item_static(self, item);
  }

  fn visit_item_const(&mut self, item: &'ast ItemConst) {
    self.bind(item.ident.to_string(), &item.expr);
    visit::visit_item_const(self, item);
  }

  fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
    if let Some(param) = ParamCall::of_method_call(call) {
      if let Some(spec) = Self::spec(&param) {
        debug!(param = %spec.name, "found parameter declaration");
        self.listed.push(Listed::Defined(spec));
      }
    } else if call.method == "declare"
      && call.args.len() == 1
      && namespace_of(&call.receiver).as_deref() == Some("params")
    {
      self.listed.push(Listed::Declared(call.args[0].clone()));
    }
    visit::visit_expr_method_call(self, call);
  }

  fn visit_expr_call(&mut self, call: &'ast ExprCall) {
    if let Some(param) = ParamCall::of_call(call) {
      if let Some(spec) = Self::spec(&param) {
        debug!(param = %spec.name, "found free parameter definition");
        self.free.insert(spec.name.clone(), spec);
      }
    }
    visit::visit_expr_call(self, call);
  }
}

struct TriggerCollector<'b> {
  resolver: Resolver<'b>,
  triggers: IndexMap<String, TriggerSpec>,
}

impl<'ast> Visit<'ast> for TriggerCollector<'_> {
  fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
    let method = call.method.to_string();
    let declaration = namespace_of(&call.receiver)
      .and_then(|namespace| lookup(&namespace, &method).map(|d| (namespace, d)));

    if let Some((namespace, declaration)) = declaration {
      let options = StructLiteral::of(call.args.first());
      match declaration.extract(options, &self.resolver) {
        Some(trigger) => {
          let endpoint = self
            .resolver
            .endpoint_options(StructLiteral::of(options.field("options")));
          let spec = TriggerSpec::new(trigger, endpoint);
          debug!(name = %spec.name, kind = spec.kind().as_str(), "found trigger declaration");
          if self.triggers.insert(spec.name.clone(), spec).is_some() {
            debug!(namespace = %namespace, method = %method, "later declaration replaced an earlier one");
          }
        }
        None => {
          debug!(namespace = %namespace, method = %method, "skipping declaration without a literal identifier");
        }
      }
    }

    visit::visit_expr_method_call(self, call);
  }
}
