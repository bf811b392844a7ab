use thiserror::Error;

/// Errors raised while deriving a deployment identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
  /// The raw name contains no letters, so no identifier can start with one.
  #[error("cannot derive an identifier from '{raw}': no letters")]
  Empty { raw: String },
}
