//! Final-name derivation.
//!
//! The final name of a declaration is part of the wire contract: the
//! manifest keys endpoints by its normalized form and the runtime routes
//! events by recomputing it. Every rule lives here, keyed by [`Trigger`].

use crate::spec::{BlockingEvent, DatabaseEvent, FirestoreEvent, StorageEvent, Trigger};

/// Alert types of the vendor-specific alert declarations.
pub mod alert_types {
  pub const CRASHLYTICS_NEW_FATAL_ISSUE: &str = "crashlytics.newFatalIssue";
  pub const CRASHLYTICS_NEW_NONFATAL_ISSUE: &str = "crashlytics.newNonfatalIssue";
  pub const CRASHLYTICS_REGRESSION: &str = "crashlytics.regression";
  pub const CRASHLYTICS_VELOCITY: &str = "crashlytics.velocity";
  pub const BILLING_PLAN_UPDATE: &str = "billing.planUpdate";
  pub const BILLING_PLAN_AUTOMATED_UPDATE: &str = "billing.planAutomatedUpdate";
  pub const APP_DISTRIBUTION_NEW_TESTER_IOS_DEVICE: &str = "appDistribution.newTesterIosDevice";
  pub const APP_DISTRIBUTION_IN_APP_FEEDBACK: &str = "appDistribution.inAppFeedback";
  pub const PERFORMANCE_THRESHOLD: &str = "performance.threshold";
}

/// Derive the final name of a trigger.
pub fn final_name(trigger: &Trigger) -> String {
  match trigger {
    Trigger::Https { name, .. } | Trigger::Callable { name, .. } => name.clone(),
    Trigger::TaskQueue { name, .. } => name.clone(),
    Trigger::PubSub { topic } => format!("onMessagePublished_{}", remove_chars(topic, "-")),
    Trigger::Firestore {
      event, document, ..
    } => format!("{}_{}", event.method(), remove_chars(document, "/{}-")),
    Trigger::Database {
      event, reference, ..
    } => format!(
      "{}_{}",
      event.method(),
      remove_chars(reference.trim_matches('/'), "/{}-$")
    ),
    Trigger::Storage { event, bucket } => format!(
      "{}_{}",
      event.method(),
      bucket
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
    ),
    Trigger::Alert { alert_type, .. } => {
      format!("onAlertPublished_{}", remove_chars(alert_type, ".-"))
    }
    Trigger::Blocking { event, .. } => event.method().to_string(),
    Trigger::Schedule { schedule, .. } => {
      format!("onSchedule_{}", remove_chars(schedule, " */-,"))
    }
    Trigger::CustomEvent { event_type, .. } => {
      format!("onCustomEventPublished_{}", remove_chars(event_type, ".-"))
    }
    Trigger::RemoteConfig => "onConfigUpdated".to_string(),
    Trigger::TestLab => "onTestMatrixCompleted".to_string(),
  }
}

fn remove_chars(value: &str, chars: &str) -> String {
  value.chars().filter(|c| !chars.contains(*c)).collect()
}

impl FirestoreEvent {
  pub fn method(self) -> &'static str {
    match self {
      Self::Written => "onDocumentWritten",
      Self::Created => "onDocumentCreated",
      Self::Updated => "onDocumentUpdated",
      Self::Deleted => "onDocumentDeleted",
      Self::WrittenWithAuthContext => "onDocumentWrittenWithAuthContext",
      Self::CreatedWithAuthContext => "onDocumentCreatedWithAuthContext",
      Self::UpdatedWithAuthContext => "onDocumentUpdatedWithAuthContext",
      Self::DeletedWithAuthContext => "onDocumentDeletedWithAuthContext",
    }
  }
}

impl DatabaseEvent {
  pub fn method(self) -> &'static str {
    match self {
      Self::Written => "onValueWritten",
      Self::Created => "onValueCreated",
      Self::Updated => "onValueUpdated",
      Self::Deleted => "onValueDeleted",
    }
  }
}

impl StorageEvent {
  pub fn method(self) -> &'static str {
    match self {
      Self::Finalized => "onObjectFinalized",
      Self::Archived => "onObjectArchived",
      Self::Deleted => "onObjectDeleted",
      Self::MetadataUpdated => "onObjectMetadataUpdated",
    }
  }
}

impl BlockingEvent {
  /// Canonical name; blocking triggers cannot be renamed.
  pub fn method(self) -> &'static str {
    match self {
      Self::BeforeCreate => "beforeCreate",
      Self::BeforeSignIn => "beforeSignIn",
      Self::BeforeSendEmail => "beforeSendEmail",
      Self::BeforeSendSms => "beforeSendSms",
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use kindling_config::OptionValue;

  use super::*;
  use crate::spec::{RateLimits, RetryConfig};

  #[test]
  fn test_explicit_names_are_verbatim() {
    let https = Trigger::Https {
      name: "helloWorld".to_string(),
      invoker: vec![],
      cors: vec![],
    };
    assert_eq!(final_name(&https), "helloWorld");

    let tasks = Trigger::TaskQueue {
      name: "processQueue".to_string(),
      retry: RetryConfig::default(),
      rate_limits: RateLimits::default(),
      invoker: vec![],
    };
    assert_eq!(final_name(&tasks), "processQueue");
  }

  #[test]
  fn test_pubsub_strips_hyphens() {
    let trigger = Trigger::PubSub {
      topic: "orders-created".to_string(),
    };
    assert_eq!(final_name(&trigger), "onMessagePublished_orderscreated");
  }

  #[test]
  fn test_firestore_strips_path_separators() {
    let trigger = Trigger::Firestore {
      event: FirestoreEvent::Updated,
      document: "users/{userId}/posts/{post-id}".to_string(),
      database: "(default)".to_string(),
      namespace: "(default)".to_string(),
    };
    assert_eq!(final_name(&trigger), "onDocumentUpdated_usersuserIdpostspostid");
  }

  #[test]
  fn test_database_trims_outer_slashes() {
    let trigger = Trigger::Database {
      event: DatabaseEvent::Written,
      reference: "/messages/{messageId}/".to_string(),
      instance: "*".to_string(),
    };
    assert_eq!(final_name(&trigger), "onValueWritten_messagesmessageId");
  }

  #[test]
  fn test_storage_keeps_alphanumerics() {
    let trigger = Trigger::Storage {
      event: StorageEvent::MetadataUpdated,
      bucket: "my-app.appspot.com".to_string(),
    };
    assert_eq!(
      final_name(&trigger),
      "onObjectMetadataUpdated_myappappspotcom"
    );
  }

  #[test]
  fn test_alert_and_custom_event_strip_dots() {
    let alert = Trigger::Alert {
      alert_type: alert_types::CRASHLYTICS_NEW_FATAL_ISSUE.to_string(),
      app_id: None,
    };
    assert_eq!(final_name(&alert), "onAlertPublished_crashlyticsnewFatalIssue");

    let custom = Trigger::CustomEvent {
      event_type: "com.example.order-shipped".to_string(),
      channel: None,
      filters: BTreeMap::new(),
    };
    assert_eq!(
      final_name(&custom),
      "onCustomEventPublished_comexampleordershipped"
    );
  }

  #[test]
  fn test_schedule_strips_cron_punctuation() {
    let trigger = Trigger::Schedule {
      schedule: "*/5 1-3 * * mon,fri".to_string(),
      time_zone: Some(OptionValue::from("UTC")),
      retry: RetryConfig::default(),
    };
    assert_eq!(final_name(&trigger), "onSchedule_513monfri");

    let every = Trigger::Schedule {
      schedule: "every 5 minutes".to_string(),
      time_zone: None,
      retry: RetryConfig::default(),
    };
    assert_eq!(final_name(&every), "onSchedule_every5minutes");
  }

  #[test]
  fn test_fixed_names() {
    let blocking = Trigger::Blocking {
      event: BlockingEvent::BeforeSignIn,
      id_token: false,
      access_token: false,
      refresh_token: false,
    };
    assert_eq!(final_name(&blocking), "beforeSignIn");
    assert_eq!(final_name(&Trigger::RemoteConfig), "onConfigUpdated");
    assert_eq!(final_name(&Trigger::TestLab), "onTestMatrixCompleted");
  }
}
