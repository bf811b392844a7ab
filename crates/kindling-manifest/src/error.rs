use kindling_trigger::IdentifierError;
use thiserror::Error;

/// Errors that can occur while assembling a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// A trigger's final name does not yield a deployment identifier.
  #[error("trigger '{name}' has no valid identifier: {source}")]
  Identifier {
    name: String,
    #[source]
    source: IdentifierError,
  },

  /// Failed to serialize the manifest document.
  #[error("failed to serialize manifest: {0}")]
  Serialize(#[from] serde_json::Error),
}
