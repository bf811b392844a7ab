//! Kindling Trigger
//!
//! The trigger model shared by manifest generation and runtime dispatch.
//!
//! A [`Trigger`] is a closed sum type; everything that depends on the
//! trigger type is a `match` over it in one of three places:
//! - [`naming`]: the final name of a declaration
//! - [`events`]: event-type strings and the mapping from an inbound event
//!   back to the identifier of the trigger that should receive it
//! - the manifest assembler in `kindling-manifest`
//!
//! Adding a variant fails to compile until all three are updated.

mod error;
pub mod events;
mod identifier;
pub mod naming;
mod pattern;
mod spec;

pub use error::IdentifierError;
pub use events::{EventRoute, ExpectedTarget, expected_target};
pub use identifier::{MAX_IDENTIFIER_LEN, normalize};
pub use naming::final_name;
pub use pattern::{PathPattern, Segment};
pub use spec::{
  BlockingEvent, DEFAULT_DATABASE_INSTANCE, DEFAULT_FIRESTORE_DATABASE, DatabaseEvent,
  FirestoreEvent, RateLimits, RetryConfig, StorageEvent, Trigger, TriggerKind, TriggerSpec,
};
