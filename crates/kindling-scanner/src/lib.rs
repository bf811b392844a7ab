//! Kindling Scanner
//!
//! Finds trigger and parameter declarations in Rust source without
//! compiling or running it. The scanner reads the same calls the runtime
//! executes (`functions.pubsub().on_message_published(..)`) and produces the
//! specs the manifest assembler consumes.
//!
//! Declarations the scanner cannot read, such as a topic held in a
//! variable, are skipped rather than reported as errors.

mod declarations;
mod error;
mod resolve;
mod scan;
mod syntax;

pub use declarations::{Declaration, NAMESPACES, lookup};
pub use error::ScanError;
pub use resolve::{Bindings, Resolver};
pub use scan::{ScanOutput, scan_dir, scan_file, scan_source};
