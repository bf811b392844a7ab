use std::path::PathBuf;

/// Errors that stop a scan before any source is read.
///
/// Problems inside individual files never surface here; a file that cannot
/// be read or parsed is logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
  /// The scan root does not exist or is not a directory.
  #[error("not a directory: {}", path.display())]
  NotADirectory { path: PathBuf },

  /// Reading a single source file failed.
  #[error("failed to read {}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
