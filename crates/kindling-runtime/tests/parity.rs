//! The same declarations, read by the scanner and executed by the runtime,
//! must produce identical manifests.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use bytes::Bytes;
use http::{Request, Response};
use kindling_config::{
  EndpointOptions, IngressSetting, MemoryOption, OptionValue, ParamOptions, SupportedRegion,
  VpcEgress,
};
use kindling_manifest::{Manifest, assemble};
use kindling_runtime::{
  AlertOptions, AppAlertOptions, BlockingOptions, CallableOptions, CloudEvent, CustomEventOptions,
  DatabaseOptions, EventOptions, FirestoreOptions, Functions, HandlerError, HttpsOptions, Param,
  PubSubOptions, RegistryError, ScheduleOptions, StorageOptions, TaskQueueOptions, params,
};
use kindling_scanner::scan_source;
use kindling_trigger::{EventRoute, ExpectedTarget, RateLimits, RetryConfig, expected_target};
use serde_json::json;

async fn on_request(_: Request<Bytes>) -> Result<Response<Bytes>, HandlerError> {
  Ok(Response::new(Bytes::new()))
}

async fn on_event(_: CloudEvent) -> Result<(), HandlerError> {
  Ok(())
}

/// Run a declaration block through both paths and return the two
/// manifests, scanned first.
macro_rules! paired {
  (|$functions:ident| $body:block) => {{
    let source = format!("fn declare() {}", stringify!($body));
    let scanned = scan_source(&source);
    let scanned = assemble(scanned.params.values(), scanned.triggers.values()).unwrap();

    let mut functions = Functions::new();
    let declare = |$functions: &mut Functions| -> Result<(), RegistryError> {
      $body;
      Ok(())
    };
    declare(&mut functions).unwrap();
    let live = functions.registry().manifest().unwrap();

    (scanned, live)
  }};
}

fn assert_same(scanned: &Manifest, live: &Manifest) {
  assert!(!live.endpoints.is_empty());
  assert_eq!(
    serde_json::to_value(scanned).unwrap(),
    serde_json::to_value(live).unwrap()
  );
}

#[test]
fn test_https_and_callable() {
  let (scanned, live) = paired!(|functions| {
    functions.https().on_request(
      HttpsOptions {
        name: "helloWorld".into(),
        invoker: vec!["public".into()],
        cors: vec!["https://example.com".into()],
        options: EndpointOptions {
          memory: Some(MemoryOption::Mb512.into()),
          timeout_seconds: Some(60.into()),
          ingress: Some(IngressSetting::AllowAll.into()),
          labels: BTreeMap::from([("team".into(), "web".into())]),
          ..Default::default()
        },
      },
      on_request,
    )?;
    functions.https().on_call(
      CallableOptions {
        name: "addMessage".into(),
        enforce_app_check: true,
        ..Default::default()
      },
      on_request,
    )?;
  });

  assert_same(&scanned, &live);
  assert_eq!(live.endpoints["hello-world"].entry_point, "helloWorld");
  assert!(live.endpoints.contains_key("add-message"));
}

#[test]
fn test_pubsub_with_params() {
  let (scanned, live) = paired!(|functions| {
    let min_instances = functions.params().define_int(
      "MIN_INSTANCES",
      ParamOptions {
        default: Some(json!(1)),
        label: Some("Minimum instances".into()),
        ..Default::default()
      },
    );
    let is_prod = functions.params().define_bool("IS_PROD", ParamOptions::default());
    let _api_key = functions.params().define_secret("API_KEY");

    functions.pubsub().on_message_published(
      PubSubOptions {
        topic: "orders-created".into(),
        options: EndpointOptions {
          region: Some(vec![SupportedRegion::EuropeWest1, SupportedRegion::UsEast1].into()),
          min_instances: Some(OptionValue::param(&min_instances)),
          max_instances: Some(OptionValue::when(&is_prod, 10, 1)),
          vpc_connector: Some("projects/demo/locations/us-central1/connectors/main".into()),
          vpc_egress: Some(VpcEgress::AllTraffic.into()),
          retry: Some(true.into()),
          secrets: vec!["API_KEY".into()],
          ..Default::default()
        },
      },
      on_event,
    )?;
  });

  assert_same(&scanned, &live);
  assert_eq!(live.params.len(), 3);
}

#[test]
fn test_firestore_and_database() {
  let (scanned, live) = paired!(|functions| {
    functions.firestore().on_document_updated(
      FirestoreOptions {
        document: "users/{userId}/posts/{postId}".into(),
        ..Default::default()
      },
      on_event,
    )?;
    functions.firestore().on_document_created_with_auth_context(
      FirestoreOptions {
        document: "audit/log".into(),
        database: Some("audit".into()),
        ..Default::default()
      },
      on_event,
    )?;
    functions.database().on_value_written(
      DatabaseOptions {
        reference: "/messages/{id}".into(),
        instance: Some("my-app-default-rtdb".into()),
        ..Default::default()
      },
      on_event,
    )?;
    functions.database().on_value_deleted(
      DatabaseOptions {
        reference: "/rooms/{roomId}".into(),
        ..Default::default()
      },
      on_event,
    )?;
  });

  assert_same(&scanned, &live);
  assert_eq!(live.endpoints.len(), 4);
}

#[test]
fn test_storage_and_alerts() {
  let (scanned, live) = paired!(|functions| {
    functions.storage().on_object_finalized(
      StorageOptions {
        bucket: "my-app.appspot.com".into(),
        ..Default::default()
      },
      on_event,
    )?;
    functions.alerts().on_alert_published(
      AlertOptions {
        alert_type: "crashlytics.stabilityDigest".into(),
        ..Default::default()
      },
      on_event,
    )?;
    functions.crashlytics().on_regression_alert_published(
      AppAlertOptions {
        app_id: Some("1:123:android:abc".into()),
        ..Default::default()
      },
      on_event,
    )?;
    functions
      .performance()
      .on_threshold_alert_published(AppAlertOptions::default(), on_event)?;
  });

  assert_same(&scanned, &live);
  assert_eq!(live.endpoints.len(), 4);
}

#[test]
fn test_blocking_schedule_and_tasks() {
  let (scanned, live) = paired!(|functions| {
    functions.identity().before_user_signed_in(
      BlockingOptions {
        id_token: true,
        refresh_token: true,
        ..Default::default()
      },
      on_request,
    )?;
    functions.scheduler().on_schedule(
      ScheduleOptions {
        schedule: "every day 00:00".into(),
        time_zone: Some("America/New_York".into()),
        retry: RetryConfig {
          retry_count: Some(3.into()),
          max_doublings: Some(5.into()),
          ..Default::default()
        },
        ..Default::default()
      },
      on_request,
    )?;
    functions.tasks().on_task_dispatched(
      TaskQueueOptions {
        name: "resizeImage".into(),
        retry: RetryConfig {
          max_attempts: Some(5.into()),
          min_backoff_seconds: Some(60.into()),
          ..Default::default()
        },
        rate_limits: RateLimits {
          max_concurrent_dispatches: Some(6.into()),
          ..Default::default()
        },
        invoker: vec!["private".into()],
        ..Default::default()
      },
      on_request,
    )?;
  });

  assert_same(&scanned, &live);
  let apis: Vec<&str> = live.required_apis.iter().map(|api| api.api.as_str()).collect();
  assert_eq!(
    apis,
    vec![
      "identitytoolkit.googleapis.com",
      "cloudscheduler.googleapis.com",
      "cloudtasks.googleapis.com",
    ]
  );
}

#[test]
fn test_custom_events_remote_config_and_test_lab() {
  let (scanned, live) = paired!(|functions| {
    functions.eventarc().on_custom_event_published(
      CustomEventOptions {
        event_type: "com.example.order.shipped".into(),
        channel: Some("locations/us-central1/channels/orders".into()),
        filters: BTreeMap::from([("carrier".into(), "express".into())]),
        ..Default::default()
      },
      on_event,
    )?;
    functions
      .remote_config()
      .on_config_updated(EventOptions::default(), on_event)?;
    functions
      .test_lab()
      .on_test_matrix_completed(EventOptions::default(), on_event)?;
  });

  assert_same(&scanned, &live);
  assert_eq!(live.endpoints.len(), 3);
}

#[test]
fn test_free_params_need_declaring() {
  let (scanned, live) = paired!(|functions| {
    let greeting = params::define_string("GREETING", ParamOptions::default());
    functions.params().declare(&greeting);
    functions.pubsub().on_message_published(
      PubSubOptions {
        topic: "greetings".into(),
        options: EndpointOptions {
          labels: BTreeMap::from([("greeting".into(), "hello".into())]),
          min_instances: Some(OptionValue::param(&greeting)),
          ..Default::default()
        },
      },
      on_event,
    )?;
  });

  assert_same(&scanned, &live);
  assert_eq!(live.params[0].name, "GREETING");
}

#[test]
fn test_undeclared_static_param_is_not_listed() {
  let (scanned, live) = paired!(|functions| {
    static LIMIT: LazyLock<Param> =
      LazyLock::new(|| params::define_int("RETRY_LIMIT", ParamOptions::default()));
    functions.pubsub().on_message_published(
      PubSubOptions {
        topic: "retries".into(),
        options: EndpointOptions {
          min_instances: Some(OptionValue::param(&*LIMIT)),
          ..Default::default()
        },
      },
      on_event,
    )?;
  });

  assert_same(&scanned, &live);
  assert!(live.params.is_empty());
  assert_eq!(
    live.endpoints["on-message-published-retries"].min_instances,
    Some(json!("{{ params.RETRY_LIMIT }}"))
  );
}

#[test]
fn test_declared_static_param_is_listed() {
  let (scanned, live) = paired!(|functions| {
    static LIMIT: LazyLock<Param> =
      LazyLock::new(|| params::define_int("RETRY_LIMIT", ParamOptions::default()));
    functions.params().declare(&LIMIT);
    functions.pubsub().on_message_published(
      PubSubOptions {
        topic: "retries".into(),
        options: EndpointOptions {
          min_instances: Some(OptionValue::param(&*LIMIT)),
          ..Default::default()
        },
      },
      on_event,
    )?;
  });

  assert_same(&scanned, &live);
  assert_eq!(live.params.len(), 1);
  assert_eq!(live.params[0].name, "RETRY_LIMIT");
}

#[test]
fn test_event_routing_uses_manifest_identifiers() {
  let (_, live) = paired!(|functions| {
    functions.pubsub().on_message_published(
      PubSubOptions {
        topic: "orders-created".into(),
        ..Default::default()
      },
      on_event,
    )?;
    functions.storage().on_object_archived(
      StorageOptions {
        bucket: "my-app.appspot.com".into(),
        ..Default::default()
      },
      on_event,
    )?;
    functions.billing().on_plan_automated_update_published(AppAlertOptions::default(), on_event)?;
    functions.eventarc().on_custom_event_published(
      CustomEventOptions {
        event_type: "com.example.order.shipped".into(),
        ..Default::default()
      },
      on_event,
    )?;
  });

  let routes = [
    EventRoute {
      event_type: "google.cloud.pubsub.topic.v1.messagePublished",
      source: "//pubsub.googleapis.com/projects/demo/topics/orders-created",
      ..Default::default()
    },
    EventRoute {
      event_type: "google.cloud.storage.object.v1.archived",
      source: "//storage.googleapis.com/projects/_/buckets/my-app.appspot.com",
      ..Default::default()
    },
    EventRoute {
      event_type: "google.firebase.firebasealerts.alerts.v1.published",
      source: "//firebasealerts.googleapis.com/projects/demo",
      alert_type: Some("billing.planAutomatedUpdate"),
      ..Default::default()
    },
    EventRoute {
      event_type: "com.example.order.shipped",
      source: "//example.com/orders",
      ..Default::default()
    },
  ];

  for route in &routes {
    match expected_target(route) {
      Some(ExpectedTarget::Exact(id)) => {
        assert!(live.endpoints.contains_key(&id), "{} has no endpoint", id)
      }
      other => panic!("unexpected target for {}: {:?}", route.event_type, other),
    }
  }
}
