//! The runtime registry.
//!
//! Populated once at startup by executing declarations, then read-only.
//! Registrations are keyed by the same normalized identifier the manifest
//! uses for its endpoint keys.

use std::collections::HashMap;

use kindling_config::ParamSpec;
use kindling_manifest::{Manifest, ManifestError, assemble};
use kindling_trigger::{PathPattern, TriggerKind, TriggerSpec, normalize};
use tracing::info;

use crate::error::RegistryError;
use crate::handler::Handler;

/// A registered function.
#[derive(Debug, Clone)]
pub struct Registration {
  /// Final name of the trigger.
  pub name: String,
  /// Normalized identifier.
  pub id: String,
  pub spec: TriggerSpec,
  pub handler: Handler,
  /// Whether clients may call the function with any method.
  pub externally_callable: bool,
  /// Pattern inbound document or reference paths must match.
  pub path_pattern: Option<PathPattern>,
  /// Event type the function subscribes to, for event functions.
  pub event_type: Option<String>,
}

impl Registration {
  pub fn kind(&self) -> TriggerKind {
    self.spec.kind()
  }
}

#[derive(Debug, Default)]
pub struct Registry {
  params: Vec<ParamSpec>,
  registrations: Vec<Registration>,
  by_id: HashMap<String, usize>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a parameter declaration. Redeclaring a name replaces it.
  pub fn add_param(&mut self, spec: ParamSpec) {
    match self.params.iter_mut().find(|p| p.name == spec.name) {
      Some(existing) => *existing = spec,
      None => self.params.push(spec),
    }
  }

  /// Register a function.
  ///
  /// Fails when another registration already normalizes to the same
  /// identifier.
  pub fn register(&mut self, spec: TriggerSpec, handler: Handler) -> Result<(), RegistryError> {
    let id = spec.identifier().map_err(|source| RegistryError::InvalidName {
      name: spec.name.clone(),
      source,
    })?;

    if let Some(&index) = self.by_id.get(&id) {
      return Err(RegistryError::Duplicate {
        identifier: id,
        name: spec.name,
        existing: self.registrations[index].name.clone(),
      });
    }

    let kind = spec.kind();
    let registration = Registration {
      name: spec.name.clone(),
      id: id.clone(),
      externally_callable: kind.is_externally_callable(),
      path_pattern: spec.trigger.path_pattern(),
      event_type: spec.trigger.event_type(),
      spec,
      handler,
    };

    info!(
      name = %registration.name,
      id = %registration.id,
      kind = kind.as_str(),
      "function registered"
    );

    self.by_id.insert(id, self.registrations.len());
    self.registrations.push(registration);
    Ok(())
  }

  /// Look up a registration by identifier.
  pub fn get(&self, id: &str) -> Option<&Registration> {
    self.by_id.get(id).map(|&index| &self.registrations[index])
  }

  /// Look up a registration by identifier or by final name.
  pub fn find(&self, name: &str) -> Option<&Registration> {
    self
      .get(name)
      .or_else(|| normalize(name).ok().and_then(|id| self.get(&id)))
  }

  /// Registrations in registration order.
  pub fn registrations(&self) -> &[Registration] {
    &self.registrations
  }

  pub fn params(&self) -> &[ParamSpec] {
    &self.params
  }

  pub fn len(&self) -> usize {
    self.registrations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.registrations.is_empty()
  }

  /// Assemble the manifest describing the registered functions.
  pub fn manifest(&self) -> Result<Manifest, ManifestError> {
    assemble(&self.params, self.registrations.iter().map(|r| &r.spec))
  }
}

#[cfg(test)]
mod tests {
  use bytes::Bytes;
  use http::{Request, Response};
  use kindling_config::{EndpointOptions, ParamOptions, ParamType};
  use kindling_trigger::Trigger;

  use super::*;
  use crate::error::HandlerError;

  async fn ok(_: Request<Bytes>) -> Result<Response<Bytes>, HandlerError> {
    Ok(Response::new(Bytes::new()))
  }

  fn https(name: &str) -> TriggerSpec {
    TriggerSpec::new(
      Trigger::Https {
        name: name.to_string(),
        invoker: vec![],
        cors: vec![],
      },
      EndpointOptions::default(),
    )
  }

  #[test]
  fn test_register_and_find() {
    let mut registry = Registry::new();
    registry.register(https("helloWorld"), Handler::http(ok)).unwrap();

    let registration = registry.get("hello-world").unwrap();
    assert_eq!(registration.name, "helloWorld");
    assert!(registration.externally_callable);
    assert!(registry.find("helloWorld").is_some());
    assert!(registry.find("goodbye").is_none());
  }

  #[test]
  fn test_duplicate_identifier_is_fatal() {
    let mut registry = Registry::new();
    registry.register(https("helloWorld"), Handler::http(ok)).unwrap();

    let err = registry
      .register(https("hello_world"), Handler::http(ok))
      .unwrap_err();
    match err {
      RegistryError::Duplicate {
        identifier,
        name,
        existing,
      } => {
        assert_eq!(identifier, "hello-world");
        assert_eq!(name, "hello_world");
        assert_eq!(existing, "helloWorld");
      }
      other => panic!("unexpected error: {}", other),
    }
    assert_eq!(registry.len(), 1);
  }

  #[test]
  fn test_invalid_name_is_rejected() {
    let mut registry = Registry::new();
    let err = registry.register(https("42"), Handler::http(ok)).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidName { .. }));
  }

  #[test]
  fn test_params_replace_by_name() {
    let mut registry = Registry::new();
    registry.add_param(ParamSpec::new("REGION", ParamType::String, ParamOptions::default()));
    registry.add_param(ParamSpec::new("REGION", ParamType::List, ParamOptions::default()));
    assert_eq!(registry.params().len(), 1);
    assert_eq!(registry.params()[0].param_type, ParamType::List);
  }

  #[test]
  fn test_manifest_from_registrations() {
    let mut registry = Registry::new();
    registry.register(https("helloWorld"), Handler::http(ok)).unwrap();

    let manifest = registry.manifest().unwrap();
    assert_eq!(manifest.endpoints["hello-world"].entry_point, "helloWorld");
  }
}
