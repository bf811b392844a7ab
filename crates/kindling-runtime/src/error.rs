//! Runtime error types.

use kindling_manifest::ManifestError;
use kindling_trigger::IdentifierError;

/// Errors raised while registering functions at startup.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
  /// Two declarations normalize to the same identifier.
  #[error("duplicate function '{identifier}': '{name}' collides with '{existing}'")]
  Duplicate {
    identifier: String,
    name: String,
    existing: String,
  },

  /// The final name has no letters to build an identifier from.
  #[error("invalid function name '{name}'")]
  InvalidName {
    name: String,
    #[source]
    source: IdentifierError,
  },
}

/// Errors returned by a function handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
  /// The handler failed with a message.
  #[error("{message}")]
  Failed { message: String },

  /// The event payload did not decode into the expected type.
  #[error("invalid event data: {source}")]
  InvalidData {
    #[source]
    source: serde_json::Error,
  },
}

impl HandlerError {
  pub fn failed(message: impl Into<String>) -> Self {
    Self::Failed {
      message: message.into(),
    }
  }
}

/// Reasons a request carrying an event envelope was not accepted as one.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
  /// The request carries neither `ce-` headers nor a structured envelope.
  #[error("request carries no event envelope")]
  NoEnvelope,

  /// A required attribute is absent.
  #[error("event envelope is missing '{name}'")]
  MissingAttribute { name: &'static str },

  /// The envelope declares a protocol version other than 1.0.
  #[error("unsupported event spec version '{version}'")]
  UnsupportedSpecVersion { version: String },

  /// A header value is not visible ASCII.
  #[error("invalid header '{name}'")]
  InvalidHeader { name: String },

  /// The structured envelope is not valid JSON.
  #[error("invalid structured event: {source}")]
  InvalidJson {
    #[source]
    source: serde_json::Error,
  },
}

/// Request-scoped dispatch failures. Each maps to an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
  /// No registration matches the request.
  #[error("no function matches '{target}'")]
  NotFound { target: String },

  /// The function only accepts POST.
  #[error("method {method} not allowed for function '{name}'")]
  MethodNotAllowed { method: String, name: String },

  /// An event function was called without a valid event envelope.
  #[error("function '{name}' expects an event: {source}")]
  InvalidEvent {
    name: String,
    #[source]
    source: EnvelopeError,
  },

  /// The handler returned an error.
  #[error("function '{name}' failed: {source}")]
  Handler {
    name: String,
    #[source]
    source: HandlerError,
  },

  /// The handler panicked.
  #[error("function '{name}' panicked")]
  Panicked { name: String },

  /// The init hook panicked, so no function can be invoked.
  #[error("init hook panicked")]
  InitPanicked,

  /// The live manifest could not be assembled.
  #[error("failed to build manifest: {source}")]
  Manifest {
    #[source]
    source: ManifestError,
  },
}
