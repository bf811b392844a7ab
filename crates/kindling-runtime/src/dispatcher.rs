//! Request dispatch.
//!
//! A request is classified in order:
//! 1. fixed control paths (`/__/health`, `/__/quitquitquit` and, when the
//!    control API is enabled, `/__/functions.yaml`)
//! 2. single-target mode, when `FUNCTION_TARGET` names one registration
//! 3. envelope mode, when the request carries a valid event envelope whose
//!    type and source map to a registration
//! 4. path mode, from the first path segment or the `x-function-target`
//!    header
//!
//! Request bodies arrive fully buffered, so a failed envelope match falls
//! through to path mode with the request untouched.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method, Request, Response, StatusCode};
use kindling_trigger::{ExpectedTarget, Trigger, expected_target};
use serde_json::json;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{DispatchError, EnvelopeError};
use crate::event::CloudEvent;
use crate::handler::Handler;
use crate::registry::{Registration, Registry};

/// Liveness probe path.
pub const HEALTH_PATH: &str = "/__/health";
/// Graceful shutdown path.
pub const QUIT_PATH: &str = "/__/quitquitquit";
/// Live manifest path, served only when the control API is enabled.
pub const MANIFEST_PATH: &str = "/__/functions.yaml";
/// Header naming the target function when the path does not.
pub const TARGET_HEADER: &str = "x-function-target";

const TARGET_ENV: &str = "FUNCTION_TARGET";
const CONTROL_API_ENV: &str = "FUNCTIONS_CONTROL_API";

pub(crate) type InitHook = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Dispatcher configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherConfig {
  /// Serve only this function, named by final name or identifier.
  pub target: Option<String>,
  /// Serve the live manifest at [`MANIFEST_PATH`].
  pub control_api: bool,
}

impl DispatcherConfig {
  /// Read `FUNCTION_TARGET` and `FUNCTIONS_CONTROL_API` from the process
  /// environment.
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    Self {
      target: lookup(TARGET_ENV).filter(|target| !target.is_empty()),
      control_api: lookup(CONTROL_API_ENV).as_deref() == Some("true"),
    }
  }
}

/// Routes requests to registered handlers.
///
/// Cheap to share behind an `Arc`; `dispatch` takes `&self` and may run
/// concurrently.
pub struct Dispatcher {
  registry: Registry,
  config: DispatcherConfig,
  init_hook: Option<InitHook>,
  /// Whether the init hook completed without panicking.
  initialized: OnceCell<bool>,
  shutdown: CancellationToken,
}

impl Dispatcher {
  pub fn new(registry: Registry, config: DispatcherConfig) -> Self {
    Self {
      registry,
      config,
      init_hook: None,
      initialized: OnceCell::new(),
      shutdown: CancellationToken::new(),
    }
  }

  /// Run `hook` exactly once, before the first handler invocation.
  ///
  /// A hook that panics is not retried. Every later invocation then fails
  /// with a 500 response.
  pub fn with_init_hook<F, Fut>(self, hook: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    self.with_boxed_init(Box::new(move || -> BoxFuture<'static, ()> {
      Box::pin(hook())
    }))
  }

  pub(crate) fn with_boxed_init(mut self, hook: InitHook) -> Self {
    self.init_hook = Some(hook);
    self
  }

  /// Token cancelled when a shutdown request is received.
  pub fn shutdown_token(&self) -> CancellationToken {
    self.shutdown.clone()
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  pub fn config(&self) -> &DispatcherConfig {
    &self.config
  }

  /// Route a request and produce its response.
  ///
  /// Never fails: routing errors, handler errors and handler panics are
  /// all turned into error responses.
  #[instrument(
    name = "dispatch",
    skip_all,
    fields(
      request_id = %Uuid::new_v4(),
      method = %request.method(),
      path = %request.uri().path(),
    )
  )]
  pub async fn dispatch(&self, request: Request<Bytes>) -> Response<Bytes> {
    if let Some(response) = self.control(&request) {
      return response;
    }

    match self.route(request).await {
      Ok(response) => response,
      Err(error) => self.error_response(error),
    }
  }

  fn control(&self, request: &Request<Bytes>) -> Option<Response<Bytes>> {
    let path = request.uri().path();
    if path == QUIT_PATH {
      info!("shutdown requested");
      self.shutdown.cancel();
      return Some(text(StatusCode::OK, "ok"));
    }
    if request.method() != Method::GET {
      return None;
    }
    if path == HEALTH_PATH {
      return Some(text(StatusCode::OK, "ok"));
    }
    if path == MANIFEST_PATH && self.config.control_api {
      let response = match self.registry.manifest().and_then(|m| m.to_json_pretty()) {
        Ok(body) => json_response(StatusCode::OK, Bytes::from(body)),
        Err(source) => self.error_response(DispatchError::Manifest { source }),
      };
      return Some(response);
    }
    None
  }

  async fn route(&self, request: Request<Bytes>) -> Result<Response<Bytes>, DispatchError> {
    let envelope = CloudEvent::from_request(&request);

    if let Some(target) = &self.config.target {
      let registration = self
        .registry
        .find(target)
        .ok_or_else(|| DispatchError::NotFound {
          target: target.clone(),
        })?;
      check_method(registration, &request)?;
      return self.invoke(registration, request, envelope).await;
    }

    match &envelope {
      Ok(Some(event)) => {
        if let Some(registration) = self.match_event(event) {
          debug!(id = %registration.id, event_type = %event.event_type, "event matched");
          check_method(registration, &request)?;
          return self.invoke(registration, request, envelope).await;
        }
        debug!(event_type = %event.event_type, "no registration for event, trying path");
      }
      Ok(None) => {}
      Err(error) => debug!(error = %error, "invalid event envelope, trying path"),
    }

    let registration = self.match_path(&request)?;
    check_method(registration, &request)?;
    self.invoke(registration, request, envelope).await
  }

  /// Find the registration an event should be delivered to.
  fn match_event(&self, event: &CloudEvent) -> Option<&Registration> {
    match expected_target(&event.route())? {
      ExpectedTarget::Exact(id) => self
        .registry
        .get(&id)
        .filter(|registration| registration.handler.is_event()),
      ExpectedTarget::Wildcard { event_type, path } => {
        self.registry.registrations().iter().find(|registration| {
          let type_matches = registration
            .event_type
            .as_deref()
            .is_some_and(|declared| event_type.starts_with(declared));
          let path_matches = registration
            .path_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.matches(&path));
          type_matches && path_matches && scope_matches(&registration.spec.trigger, event)
        })
      }
    }
  }

  fn match_path(&self, request: &Request<Bytes>) -> Result<&Registration, DispatchError> {
    let segment = request
      .uri()
      .path()
      .trim_start_matches('/')
      .split('/')
      .next()
      .unwrap_or_default();
    if !segment.is_empty() {
      if let Some(registration) = self.registry.find(segment) {
        return Ok(registration);
      }
    }

    let header = request
      .headers()
      .get(TARGET_HEADER)
      .and_then(|value| value.to_str().ok());
    if let Some(name) = header {
      if let Some(registration) = self.registry.find(name) {
        return Ok(registration);
      }
    }

    let target = header.unwrap_or(request.uri().path()).to_string();
    Err(DispatchError::NotFound { target })
  }

  async fn invoke(
    &self,
    registration: &Registration,
    request: Request<Bytes>,
    envelope: Result<Option<CloudEvent>, EnvelopeError>,
  ) -> Result<Response<Bytes>, DispatchError> {
    let name = registration.name.clone();

    let outcome = match &registration.handler {
      Handler::Http(handler) => {
        self.initialize().await?;
        info!(name = %name, "function invoked");
        AssertUnwindSafe(handler.handle(request))
          .catch_unwind()
          .await
      }
      Handler::Event(handler) => {
        let event = match envelope {
          Ok(Some(event)) => event,
          Ok(None) => {
            return Err(DispatchError::InvalidEvent {
              name,
              source: EnvelopeError::NoEnvelope,
            });
          }
          Err(source) => return Err(DispatchError::InvalidEvent { name, source }),
        };
        self.initialize().await?;
        info!(name = %name, event_id = %event.id, "function invoked");
        AssertUnwindSafe(handler.handle(event))
          .catch_unwind()
          .await
          .map(|result| result.map(|()| text(StatusCode::OK, "")))
      }
    };

    match outcome {
      Ok(Ok(response)) => Ok(response),
      Ok(Err(source)) => Err(DispatchError::Handler { name, source }),
      Err(_) => Err(DispatchError::Panicked { name }),
    }
  }

  async fn initialize(&self) -> Result<(), DispatchError> {
    let completed = self
      .initialized
      .get_or_init(|| async {
        let Some(hook) = &self.init_hook else {
          return true;
        };
        info!("running init hook");
        match AssertUnwindSafe(hook()).catch_unwind().await {
          Ok(()) => true,
          Err(_) => {
            error!("init hook panicked");
            false
          }
        }
      })
      .await;
    if *completed {
      Ok(())
    } else {
      Err(DispatchError::InitPanicked)
    }
  }

  fn error_response(&self, error: DispatchError) -> Response<Bytes> {
    match &error {
      DispatchError::NotFound { .. } => {
        warn!(error = %error, "function not found");
        let functions: Vec<&str> = self
          .registry
          .registrations()
          .iter()
          .map(|registration| registration.name.as_str())
          .collect();
        let body = json!({ "error": error.to_string(), "functions": functions });
        json_response(StatusCode::NOT_FOUND, Bytes::from(body.to_string()))
      }
      DispatchError::MethodNotAllowed { .. } => {
        warn!(error = %error, "method not allowed");
        let body = json!({ "error": error.to_string() });
        json_response(StatusCode::METHOD_NOT_ALLOWED, Bytes::from(body.to_string()))
      }
      DispatchError::InvalidEvent { .. } => {
        warn!(error = %error, "invalid event");
        let body = json!({ "error": error.to_string() });
        json_response(StatusCode::BAD_REQUEST, Bytes::from(body.to_string()))
      }
      DispatchError::Handler { .. }
      | DispatchError::Panicked { .. }
      | DispatchError::InitPanicked
      | DispatchError::Manifest { .. } => {
        error!(error = %error, "function failed");
        let body = json!({ "error": "internal error" });
        json_response(
          StatusCode::INTERNAL_SERVER_ERROR,
          Bytes::from(body.to_string()),
        )
      }
    }
  }
}

/// Functions other than HTTP and callable ones are invoked by the platform
/// with POST only.
fn check_method(registration: &Registration, request: &Request<Bytes>) -> Result<(), DispatchError> {
  if registration.externally_callable || request.method() == Method::POST {
    return Ok(());
  }
  Err(DispatchError::MethodNotAllowed {
    method: request.method().to_string(),
    name: registration.name.clone(),
  })
}

/// Database, namespace and instance filters of path-pattern triggers.
///
/// An event that does not carry the attribute is not filtered on it.
fn scope_matches(trigger: &Trigger, event: &CloudEvent) -> bool {
  match trigger {
    Trigger::Firestore {
      database,
      namespace,
      ..
    } => {
      event.database.as_deref().is_none_or(|d| d == database)
        && event.namespace.as_deref().is_none_or(|n| n == namespace)
    }
    Trigger::Database { instance, .. } => match instance.strip_suffix('*') {
      Some(prefix) => event
        .instance
        .as_deref()
        .is_none_or(|i| i.starts_with(prefix)),
      None => event.instance.as_deref().is_none_or(|i| i == instance),
    },
    _ => true,
  }
}

fn text(status: StatusCode, body: &'static str) -> Response<Bytes> {
  let mut response = Response::new(Bytes::from_static(body.as_bytes()));
  *response.status_mut() = status;
  response
}

fn json_response(status: StatusCode, body: Bytes) -> Response<Bytes> {
  let mut response = Response::new(body);
  *response.status_mut() = status;
  response
    .headers_mut()
    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
  response
}
