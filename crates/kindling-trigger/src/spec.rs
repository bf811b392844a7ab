use std::collections::BTreeMap;

use kindling_config::{EndpointOptions, OptionValue};

use crate::error::IdentifierError;
use crate::identifier::normalize;
use crate::naming::final_name;
use crate::pattern::PathPattern;

/// Firestore database and namespace used when none is declared.
pub const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";

/// Realtime Database instance filter used when none is declared.
pub const DEFAULT_DATABASE_INSTANCE: &str = "*";

/// Type tag of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TriggerKind {
  Https,
  Callable,
  PubSub,
  Firestore,
  Database,
  Storage,
  Alert,
  Blocking,
  Schedule,
  TaskQueue,
  CustomEvent,
  RemoteConfig,
  TestLab,
}

impl TriggerKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Https => "http",
      Self::Callable => "callable",
      Self::PubSub => "pubsub",
      Self::Firestore => "firestore",
      Self::Database => "database",
      Self::Storage => "storage",
      Self::Alert => "alert",
      Self::Blocking => "blocking",
      Self::Schedule => "scheduled",
      Self::TaskQueue => "task-queue",
      Self::CustomEvent => "custom-event",
      Self::RemoteConfig => "remote-config",
      Self::TestLab => "test-lab",
    }
  }

  /// Whether clients call the trigger directly over HTTP.
  ///
  /// Everything else is invoked by the platform with a POST.
  pub fn is_externally_callable(self) -> bool {
    matches!(self, Self::Https | Self::Callable)
  }

  /// Whether inbound events are matched against a path pattern rather than
  /// by identifier.
  pub fn uses_path_pattern(self) -> bool {
    matches!(self, Self::Firestore | Self::Database)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirestoreEvent {
  Written,
  Created,
  Updated,
  Deleted,
  WrittenWithAuthContext,
  CreatedWithAuthContext,
  UpdatedWithAuthContext,
  DeletedWithAuthContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEvent {
  Written,
  Created,
  Updated,
  Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEvent {
  Finalized,
  Archived,
  Deleted,
  MetadataUpdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingEvent {
  BeforeCreate,
  BeforeSignIn,
  BeforeSendEmail,
  BeforeSendSms,
}

/// Retry policy for scheduled and task-queue triggers.
///
/// Scheduled triggers use `retry_count` and the duration fields; task
/// queues use `max_attempts` and the second-based fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryConfig {
  pub retry_count: Option<OptionValue>,
  pub max_attempts: Option<OptionValue>,
  pub max_retry_seconds: Option<OptionValue>,
  pub min_backoff_seconds: Option<OptionValue>,
  pub max_backoff_seconds: Option<OptionValue>,
  pub max_doublings: Option<OptionValue>,
}

impl RetryConfig {
  pub fn set(&mut self, field: &str, value: OptionValue) -> bool {
    let slot = match field {
      "retry_count" => &mut self.retry_count,
      "max_attempts" => &mut self.max_attempts,
      "max_retry_seconds" => &mut self.max_retry_seconds,
      "min_backoff_seconds" => &mut self.min_backoff_seconds,
      "max_backoff_seconds" => &mut self.max_backoff_seconds,
      "max_doublings" => &mut self.max_doublings,
      _ => return false,
    };
    *slot = Some(value);
    true
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimits {
  pub max_concurrent_dispatches: Option<OptionValue>,
  pub max_dispatches_per_second: Option<OptionValue>,
}

impl RateLimits {
  pub fn set(&mut self, field: &str, value: OptionValue) -> bool {
    let slot = match field {
      "max_concurrent_dispatches" => &mut self.max_concurrent_dispatches,
      "max_dispatches_per_second" => &mut self.max_dispatches_per_second,
      _ => return false,
    };
    *slot = Some(value);
    true
  }
}

/// Invocation source of a trigger with its type-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
  Https {
    name: String,
    invoker: Vec<String>,
    cors: Vec<String>,
  },
  Callable {
    name: String,
    enforce_app_check: bool,
  },
  PubSub {
    topic: String,
  },
  Firestore {
    event: FirestoreEvent,
    document: String,
    database: String,
    namespace: String,
  },
  Database {
    event: DatabaseEvent,
    reference: String,
    instance: String,
  },
  Storage {
    event: StorageEvent,
    bucket: String,
  },
  Alert {
    alert_type: String,
    app_id: Option<String>,
  },
  Blocking {
    event: BlockingEvent,
    id_token: bool,
    access_token: bool,
    refresh_token: bool,
  },
  Schedule {
    schedule: String,
    time_zone: Option<OptionValue>,
    retry: RetryConfig,
  },
  TaskQueue {
    name: String,
    retry: RetryConfig,
    rate_limits: RateLimits,
    invoker: Vec<String>,
  },
  CustomEvent {
    event_type: String,
    channel: Option<String>,
    filters: BTreeMap<String, String>,
  },
  RemoteConfig,
  TestLab,
}

impl Trigger {
  pub fn kind(&self) -> TriggerKind {
    match self {
      Self::Https { .. } => TriggerKind::Https,
      Self::Callable { .. } => TriggerKind::Callable,
      Self::PubSub { .. } => TriggerKind::PubSub,
      Self::Firestore { .. } => TriggerKind::Firestore,
      Self::Database { .. } => TriggerKind::Database,
      Self::Storage { .. } => TriggerKind::Storage,
      Self::Alert { .. } => TriggerKind::Alert,
      Self::Blocking { .. } => TriggerKind::Blocking,
      Self::Schedule { .. } => TriggerKind::Schedule,
      Self::TaskQueue { .. } => TriggerKind::TaskQueue,
      Self::CustomEvent { .. } => TriggerKind::CustomEvent,
      Self::RemoteConfig => TriggerKind::RemoteConfig,
      Self::TestLab => TriggerKind::TestLab,
    }
  }

  /// Path pattern for document and reference triggers.
  pub fn path_pattern(&self) -> Option<PathPattern> {
    match self {
      Self::Firestore { document, .. } => Some(PathPattern::parse(document)),
      Self::Database { reference, .. } => Some(PathPattern::parse(reference)),
      _ => None,
    }
  }
}

/// A fully described trigger declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSpec {
  /// Final name, derived from the trigger by [`final_name`].
  pub name: String,
  pub trigger: Trigger,
  pub options: EndpointOptions,
}

impl TriggerSpec {
  pub fn new(trigger: Trigger, options: EndpointOptions) -> Self {
    Self {
      name: final_name(&trigger),
      trigger,
      options,
    }
  }

  pub fn kind(&self) -> TriggerKind {
    self.trigger.kind()
  }

  /// Normalized deployment identifier of this trigger.
  pub fn identifier(&self) -> Result<String, IdentifierError> {
    normalize(&self.name)
  }
}
