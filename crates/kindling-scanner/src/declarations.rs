//! The declaration table.
//!
//! A call counts as a declaration when its receiver is a namespace accessor
//! (`functions.pubsub()`) and the pair of accessor and method appears in
//! [`lookup`]. The runtime exposes exactly these namespaces and methods.

use std::collections::BTreeMap;

use kindling_config::ParamType;
use kindling_trigger::naming::alert_types;
use kindling_trigger::{
  BlockingEvent, DEFAULT_DATABASE_INSTANCE, DEFAULT_FIRESTORE_DATABASE, DatabaseEvent,
  FirestoreEvent, StorageEvent, Trigger,
};

use crate::resolve::Resolver;
use crate::syntax::{self, StructLiteral};

/// Namespace accessors on the functions context.
pub const NAMESPACES: &[&str] = &[
  "https",
  "pubsub",
  "firestore",
  "database",
  "storage",
  "alerts",
  "crashlytics",
  "billing",
  "app_distribution",
  "performance",
  "identity",
  "scheduler",
  "tasks",
  "eventarc",
  "remote_config",
  "test_lab",
];

/// A recognized trigger declaration, before its arguments are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
  Https,
  Callable,
  PubSub,
  Firestore(FirestoreEvent),
  Database(DatabaseEvent),
  Storage(StorageEvent),
  Alert,
  /// Vendor alert with a fixed alert type.
  AppAlert(&'static str),
  Blocking(BlockingEvent),
  Schedule,
  TaskQueue,
  CustomEvent,
  RemoteConfig,
  TestLab,
}

/// Look up a trigger declaration by namespace accessor and method name.
pub fn lookup(namespace: &str, method: &str) -> Option<Declaration> {
  use Declaration::*;

  let declaration = match (namespace, method) {
    ("https", "on_request") => Https,
    ("https", "on_call") => Callable,
    ("pubsub", "on_message_published") => PubSub,

    ("firestore", "on_document_written") => Firestore(FirestoreEvent::Written),
    ("firestore", "on_document_created") => Firestore(FirestoreEvent::Created),
    ("firestore", "on_document_updated") => Firestore(FirestoreEvent::Updated),
    ("firestore", "on_document_deleted") => Firestore(FirestoreEvent::Deleted),
    ("firestore", "on_document_written_with_auth_context") => {
      Firestore(FirestoreEvent::WrittenWithAuthContext)
    }
    ("firestore", "on_document_created_with_auth_context") => {
      Firestore(FirestoreEvent::CreatedWithAuthContext)
    }
    ("firestore", "on_document_updated_with_auth_context") => {
      Firestore(FirestoreEvent::UpdatedWithAuthContext)
    }
    ("firestore", "on_document_deleted_with_auth_context") => {
      Firestore(FirestoreEvent::DeletedWithAuthContext)
    }

    ("database", "on_value_written") => Database(DatabaseEvent::Written),
    ("database", "on_value_created") => Database(DatabaseEvent::Created),
    ("database", "on_value_updated") => Database(DatabaseEvent::Updated),
    ("database", "on_value_deleted") => Database(DatabaseEvent::Deleted),

    ("storage", "on_object_finalized") => Storage(StorageEvent::Finalized),
    ("storage", "on_object_archived") => Storage(StorageEvent::Archived),
    ("storage", "on_object_deleted") => Storage(StorageEvent::Deleted),
    ("storage", "on_object_metadata_updated") => Storage(StorageEvent::MetadataUpdated),

    ("alerts", "on_alert_published") => Alert,
    ("crashlytics", "on_new_fatal_issue_published") => {
      AppAlert(alert_types::CRASHLYTICS_NEW_FATAL_ISSUE)
    }
    ("crashlytics", "on_new_nonfatal_issue_published") => {
      AppAlert(alert_types::CRASHLYTICS_NEW_NONFATAL_ISSUE)
    }
    ("crashlytics", "on_regression_alert_published") => {
      AppAlert(alert_types::CRASHLYTICS_REGRESSION)
    }
    ("crashlytics", "on_velocity_alert_published") => AppAlert(alert_types::CRASHLYTICS_VELOCITY),
    ("billing", "on_plan_update_published") => AppAlert(alert_types::BILLING_PLAN_UPDATE),
    ("billing", "on_plan_automated_update_published") => {
      AppAlert(alert_types::BILLING_PLAN_AUTOMATED_UPDATE)
    }
    ("app_distribution", "on_new_tester_ios_device_published") => {
      AppAlert(alert_types::APP_DISTRIBUTION_NEW_TESTER_IOS_DEVICE)
    }
    ("app_distribution", "on_in_app_feedback_published") => {
      AppAlert(alert_types::APP_DISTRIBUTION_IN_APP_FEEDBACK)
    }
    ("performance", "on_threshold_alert_published") => {
      AppAlert(alert_types::PERFORMANCE_THRESHOLD)
    }

    ("identity", "before_user_created") => Blocking(BlockingEvent::BeforeCreate),
    ("identity", "before_user_signed_in") => Blocking(BlockingEvent::BeforeSignIn),
    ("identity", "before_email_sent") => Blocking(BlockingEvent::BeforeSendEmail),
    ("identity", "before_sms_sent") => Blocking(BlockingEvent::BeforeSendSms),

    ("scheduler", "on_schedule") => Schedule,
    ("tasks", "on_task_dispatched") => TaskQueue,
    ("eventarc", "on_custom_event_published") => CustomEvent,
    ("remote_config", "on_config_updated") => RemoteConfig,
    ("test_lab", "on_test_matrix_completed") => TestLab,
    _ => return None,
  };
  Some(declaration)
}

impl Declaration {
  /// Build the trigger from the declaration's options literal.
  ///
  /// Returns `None` when the identifying field is missing or is not a
  /// string literal.
  pub fn extract(self, options: StructLiteral<'_>, resolver: &Resolver<'_>) -> Option<Trigger> {
    let trigger = match self {
      Self::Https => Trigger::Https {
        name: options.string("name")?,
        invoker: options.string_list("invoker"),
        cors: options.string_list("cors"),
      },
      Self::Callable => Trigger::Callable {
        name: options.string("name")?,
        enforce_app_check: options.boolean("enforce_app_check"),
      },
      Self::PubSub => Trigger::PubSub {
        topic: options.string("topic")?,
      },
      Self::Firestore(event) => Trigger::Firestore {
        event,
        document: options.string("document")?,
        database: options
          .string("database")
          .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE.to_string()),
        namespace: options
          .string("namespace")
          .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE.to_string()),
      },
      Self::Database(event) => Trigger::Database {
        event,
        reference: options.string("reference")?,
        instance: options
          .string("instance")
          .unwrap_or_else(|| DEFAULT_DATABASE_INSTANCE.to_string()),
      },
      Self::Storage(event) => Trigger::Storage {
        event,
        bucket: options.string("bucket")?,
      },
      Self::Alert => Trigger::Alert {
        alert_type: options.string("alert_type")?,
        app_id: options.string("app_id"),
      },
      Self::AppAlert(alert_type) => Trigger::Alert {
        alert_type: alert_type.to_string(),
        app_id: options.string("app_id"),
      },
      Self::Blocking(event) => Trigger::Blocking {
        event,
        id_token: options.boolean("id_token"),
        access_token: options.boolean("access_token"),
        refresh_token: options.boolean("refresh_token"),
      },
      Self::Schedule => Trigger::Schedule {
        schedule: options.string("schedule")?,
        time_zone: options.field("time_zone").and_then(|e| resolver.option(e)),
        retry: resolver.retry_config(StructLiteral::of(options.field("retry"))),
      },
      Self::TaskQueue => Trigger::TaskQueue {
        name: options.string("name")?,
        retry: resolver.retry_config(StructLiteral::of(options.field("retry"))),
        rate_limits: resolver.rate_limits(StructLiteral::of(options.field("rate_limits"))),
        invoker: options.string_list("invoker"),
      },
      Self::CustomEvent => Trigger::CustomEvent {
        event_type: options.string("event_type")?,
        channel: options.string("channel"),
        filters: options
          .field("filters")
          .and_then(syntax::string_pairs)
          .map(BTreeMap::from_iter)
          .unwrap_or_default(),
      },
      Self::RemoteConfig => Trigger::RemoteConfig,
      Self::TestLab => Trigger::TestLab,
    };
    Some(trigger)
  }
}

/// Parameter type declared by a `params` method, and whether it takes a
/// `ParamOptions` argument.
pub fn param_declaration(method: &str) -> Option<(ParamType, bool)> {
  let declaration = match method {
    "define_string" => (ParamType::String, true),
    "define_int" => (ParamType::Int, true),
    "define_float" => (ParamType::Float, true),
    "define_bool" => (ParamType::Bool, true),
    "define_list" => (ParamType::List, true),
    "define_secret" | "define_json_secret" => (ParamType::Secret, false),
    _ => return None,
  };
  Some(declaration)
}
