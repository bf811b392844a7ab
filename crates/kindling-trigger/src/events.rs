//! Event-type strings and inbound event routing.
//!
//! [`Trigger::event_type`] gives the event type an event-sourced trigger
//! subscribes to. [`expected_target`] goes the other way: from the type and
//! source of an inbound event to the identifier (or path pattern candidates)
//! that should receive it, by rebuilding the [`Trigger`] the event implies
//! and running it through the same naming rules as a declaration.

use std::collections::BTreeMap;

use crate::identifier::normalize;
use crate::naming::final_name;
use crate::spec::{BlockingEvent, DatabaseEvent, FirestoreEvent, StorageEvent, Trigger};

pub const PUBSUB_PUBLISHED: &str = "google.cloud.pubsub.topic.v1.messagePublished";
pub const ALERT_PUBLISHED: &str = "google.firebase.firebasealerts.alerts.v1.published";
pub const REMOTE_CONFIG_UPDATED: &str = "google.firebase.remoteconfig.remoteConfig.v1.updated";
pub const TEST_MATRIX_COMPLETED: &str = "google.firebase.testlab.testMatrix.v1.completed";

const FIRESTORE_PREFIX: &str = "google.cloud.firestore.document.v1.";
const DATABASE_PREFIX: &str = "google.firebase.database.ref.v1.";
const STORAGE_PREFIX: &str = "google.cloud.storage.object.v1.";
const BLOCKING_PREFIX: &str = "providers/cloud.auth/eventTypes/user.";

const PUBSUB_SOURCE_MARKER: &str = "/topics/";
const STORAGE_SOURCE_MARKER: &str = "/buckets/";

impl Trigger {
  /// Event type the trigger subscribes to.
  ///
  /// `None` for triggers invoked directly over HTTP or by a scheduler.
  pub fn event_type(&self) -> Option<String> {
    let event_type = match self {
      Self::Https { .. } | Self::Callable { .. } => return None,
      Self::Schedule { .. } | Self::TaskQueue { .. } => return None,
      Self::PubSub { .. } => PUBSUB_PUBLISHED.to_string(),
      Self::Firestore { event, .. } => event.event_type(),
      Self::Database { event, .. } => event.event_type(),
      Self::Storage { event, .. } => event.event_type(),
      Self::Alert { .. } => ALERT_PUBLISHED.to_string(),
      Self::Blocking { event, .. } => event.event_type(),
      Self::CustomEvent { event_type, .. } => event_type.clone(),
      Self::RemoteConfig => REMOTE_CONFIG_UPDATED.to_string(),
      Self::TestLab => TEST_MATRIX_COMPLETED.to_string(),
    };
    Some(event_type)
  }
}

impl FirestoreEvent {
  pub fn event_type(self) -> String {
    let suffix = match self {
      Self::Written => "written",
      Self::Created => "created",
      Self::Updated => "updated",
      Self::Deleted => "deleted",
      Self::WrittenWithAuthContext => "written.withAuthContext",
      Self::CreatedWithAuthContext => "created.withAuthContext",
      Self::UpdatedWithAuthContext => "updated.withAuthContext",
      Self::DeletedWithAuthContext => "deleted.withAuthContext",
    };
    format!("{}{}", FIRESTORE_PREFIX, suffix)
  }
}

impl DatabaseEvent {
  pub fn event_type(self) -> String {
    let suffix = match self {
      Self::Written => "written",
      Self::Created => "created",
      Self::Updated => "updated",
      Self::Deleted => "deleted",
    };
    format!("{}{}", DATABASE_PREFIX, suffix)
  }
}

impl StorageEvent {
  pub fn event_type(self) -> String {
    let suffix = match self {
      Self::Finalized => "finalized",
      Self::Archived => "archived",
      Self::Deleted => "deleted",
      Self::MetadataUpdated => "metadataUpdated",
    };
    format!("{}{}", STORAGE_PREFIX, suffix)
  }

  fn from_event_type(event_type: &str) -> Option<Self> {
    let event = match event_type.strip_prefix(STORAGE_PREFIX)? {
      "finalized" => Self::Finalized,
      "archived" => Self::Archived,
      "deleted" => Self::Deleted,
      "metadataUpdated" => Self::MetadataUpdated,
      _ => return None,
    };
    Some(event)
  }
}

impl BlockingEvent {
  /// Legacy-style event type carried in the blocking trigger block.
  pub fn event_type(self) -> String {
    format!("{}{}", BLOCKING_PREFIX, self.method())
  }
}

/// Routing-relevant attributes of an inbound event.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventRoute<'a> {
  pub event_type: &'a str,
  pub source: &'a str,
  /// Document path of a Firestore event.
  pub document: Option<&'a str>,
  /// Reference path of a Realtime Database event.
  pub reference: Option<&'a str>,
  pub alert_type: Option<&'a str>,
}

/// Where an inbound event should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedTarget {
  /// The registration whose identifier equals this one.
  Exact(String),
  /// Any registration whose event type is a prefix of `event_type` and
  /// whose path pattern matches `path`.
  Wildcard { event_type: String, path: String },
}

/// Map an inbound event to the target it should be delivered to.
///
/// Returns `None` when the event lacks what its type needs for routing
/// (a topic, bucket, path or alert type), so the caller can fall back to
/// path routing.
pub fn expected_target(route: &EventRoute<'_>) -> Option<ExpectedTarget> {
  let event_type = route.event_type;

  if event_type.starts_with(FIRESTORE_PREFIX) {
    return wildcard(event_type, route.document?);
  }
  if event_type.starts_with(DATABASE_PREFIX) {
    return wildcard(event_type, route.reference?);
  }

  let trigger = if event_type == PUBSUB_PUBLISHED {
    Trigger::PubSub {
      topic: source_suffix(route.source, PUBSUB_SOURCE_MARKER)?,
    }
  } else if event_type.starts_with(STORAGE_PREFIX) {
    Trigger::Storage {
      event: StorageEvent::from_event_type(event_type)?,
      bucket: source_suffix(route.source, STORAGE_SOURCE_MARKER)?,
    }
  } else if event_type == ALERT_PUBLISHED {
    Trigger::Alert {
      alert_type: route.alert_type?.to_string(),
      app_id: None,
    }
  } else if event_type == REMOTE_CONFIG_UPDATED {
    Trigger::RemoteConfig
  } else if event_type == TEST_MATRIX_COMPLETED {
    Trigger::TestLab
  } else {
    Trigger::CustomEvent {
      event_type: event_type.to_string(),
      channel: None,
      filters: BTreeMap::new(),
    }
  };

  normalize(&final_name(&trigger))
    .ok()
    .map(ExpectedTarget::Exact)
}

fn wildcard(event_type: &str, path: &str) -> Option<ExpectedTarget> {
  Some(ExpectedTarget::Wildcard {
    event_type: event_type.to_string(),
    path: path.trim_matches('/').to_string(),
  })
}

/// Resource name following `marker` in an event source, e.g. the topic in
/// `//pubsub.googleapis.com/projects/p/topics/orders`.
fn source_suffix(source: &str, marker: &str) -> Option<String> {
  let (_, rest) = source.rsplit_once(marker)?;
  let name = rest.split('/').next().unwrap_or_default();
  (!name.is_empty()).then(|| name.to_string())
}
