//! Kindling Manifest
//!
//! The versioned deployment document handed to the deployment tool, and
//! the assembler that builds it from parameter and trigger specs.
//!
//! The same assembler serves both the build artifact (specs discovered by
//! `kindling-scanner`) and the live manifest endpoint (specs held by the
//! runtime registry), so the two documents cannot drift apart.

mod assemble;
mod error;
mod manifest;

pub use assemble::{assemble, required_api};
pub use error::ManifestError;
pub use manifest::{
  BlockingOptions, BlockingTrigger, CallableTrigger, Cors, Endpoint, EndpointTrigger, EventTrigger,
  HttpsTrigger, Manifest, RateLimitsBlock, RequiredApi, RetryConfigBlock, SPEC_VERSION,
  ScheduleTrigger, SecretEnvironmentVariable, TaskQueueTrigger, Vpc,
};
