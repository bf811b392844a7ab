//! Kindling Config
//!
//! This crate contains the option and parameter types that both halves of
//! kindling agree on. The scanner produces them by reading source without
//! running it, and the runtime produces them by executing the same
//! declaration calls. Keeping the enumeration tables here means a memory
//! label or region constant maps to the same wire value on both paths.

mod endpoint;
mod enums;
mod option;
mod param;

pub use endpoint::EndpointOptions;
pub use enums::{IngressSetting, MemoryOption, SupportedRegion, VpcEgress, constant_value};
pub use option::{OptionValue, ParamRef};
pub use param::{ParamOptions, ParamSpec, ParamType, SecretFormat};

/// Region used when an endpoint does not declare one.
pub const DEFAULT_REGION: &str = "us-central1";
