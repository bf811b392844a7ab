//! Manifest assembly.
//!
//! Turns parameter and trigger specs into a [`Manifest`]. The endpoint key
//! is the trigger's normalized identifier, the same one the runtime
//! registry stores registrations under.

use std::collections::BTreeMap;

use kindling_config::{DEFAULT_REGION, EndpointOptions, OptionValue, ParamSpec};
use kindling_trigger::{
  PathPattern, RateLimits, RetryConfig, Trigger, TriggerKind, TriggerSpec,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ManifestError;
use crate::manifest::{
  BlockingOptions, BlockingTrigger, CallableTrigger, Cors, Endpoint, EndpointTrigger, EventTrigger,
  HttpsTrigger, Manifest, RateLimitsBlock, RequiredApi, RetryConfigBlock, SPEC_VERSION,
  ScheduleTrigger, SecretEnvironmentVariable, TaskQueueTrigger, Vpc,
};

const PLATFORM: &str = "gcfv2";

/// Platform API a trigger kind depends on, if any.
pub fn required_api(kind: TriggerKind) -> Option<RequiredApi> {
  let (api, reason) = match kind {
    TriggerKind::Schedule => (
      "cloudscheduler.googleapis.com",
      "Needed for scheduled functions.",
    ),
    TriggerKind::TaskQueue => (
      "cloudtasks.googleapis.com",
      "Needed for task queue functions.",
    ),
    TriggerKind::Blocking => (
      "identitytoolkit.googleapis.com",
      "Needed for auth blocking functions.",
    ),
    TriggerKind::CustomEvent => (
      "eventarcpublishing.googleapis.com",
      "Needed for custom event functions.",
    ),
    _ => return None,
  };
  Some(RequiredApi {
    api: api.to_string(),
    reason: reason.to_string(),
  })
}

/// Assemble a manifest from declared parameters and triggers.
///
/// Triggers whose identifiers collide are resolved in favour of the later
/// one, matching how the scanner treats repeated final names.
pub fn assemble<'a>(
  params: impl IntoIterator<Item = &'a ParamSpec>,
  triggers: impl IntoIterator<Item = &'a TriggerSpec>,
) -> Result<Manifest, ManifestError> {
  let mut required_apis: Vec<RequiredApi> = Vec::new();
  let mut endpoints = BTreeMap::new();

  for spec in triggers {
    let identifier = spec
      .identifier()
      .map_err(|source| ManifestError::Identifier {
        name: spec.name.clone(),
        source,
      })?;

    if let Some(api) = required_api(spec.kind()) {
      if !required_apis.contains(&api) {
        required_apis.push(api);
      }
    }

    let endpoint = build_endpoint(spec);
    debug!(identifier = %identifier, kind = spec.kind().as_str(), "assembled endpoint");

    if endpoints.insert(identifier.clone(), endpoint).is_some() {
      warn!(identifier = %identifier, name = %spec.name, "endpoint identifier declared twice, keeping the last");
    }
  }

  Ok(Manifest {
    spec_version: SPEC_VERSION.to_string(),
    params: params.into_iter().cloned().collect(),
    required_apis,
    endpoints,
  })
}

fn build_endpoint(spec: &TriggerSpec) -> Endpoint {
  let options = &spec.options;

  let vpc = value_of(&options.vpc_connector).map(|connector| Vpc {
    connector,
    egress_settings: value_of(&options.vpc_egress),
  });

  let enforce_app_check = match &spec.trigger {
    Trigger::Callable {
      enforce_app_check: true,
      ..
    } => Some(true),
    _ => None,
  };

  Endpoint {
    entry_point: spec.name.clone(),
    platform: PLATFORM.to_string(),
    region: regions(&options.region),
    available_memory_mb: value_of(&options.memory),
    cpu: value_of(&options.cpu),
    timeout_seconds: value_of(&options.timeout_seconds),
    concurrency: value_of(&options.concurrency),
    min_instances: value_of(&options.min_instances),
    max_instances: value_of(&options.max_instances),
    service_account_email: value_of(&options.service_account),
    vpc,
    ingress_settings: value_of(&options.ingress),
    labels: options.labels.clone(),
    secret_environment_variables: options
      .secrets
      .iter()
      .map(|key| SecretEnvironmentVariable { key: key.clone() })
      .collect(),
    enforce_app_check,
    trigger: trigger_block(&spec.trigger, options),
  }
}

fn trigger_block(trigger: &Trigger, options: &EndpointOptions) -> EndpointTrigger {
  match trigger {
    Trigger::Https { invoker, cors, .. } => EndpointTrigger::HttpsTrigger(HttpsTrigger {
      invoker: invoker.clone(),
      cors: (!cors.is_empty()).then(|| Cors {
        origins: cors.clone(),
      }),
    }),
    Trigger::Callable { .. } => EndpointTrigger::CallableTrigger(CallableTrigger::default()),
    Trigger::Blocking {
      event,
      id_token,
      access_token,
      refresh_token,
    } => EndpointTrigger::BlockingTrigger(BlockingTrigger {
      event_type: event.event_type(),
      options: BlockingOptions {
        id_token: *id_token,
        access_token: *access_token,
        refresh_token: *refresh_token,
      },
    }),
    Trigger::Schedule {
      schedule,
      time_zone,
      retry,
    } => EndpointTrigger::ScheduleTrigger(ScheduleTrigger {
      schedule: schedule.clone(),
      time_zone: value_of(time_zone),
      retry_config: retry_block(retry),
    }),
    Trigger::TaskQueue {
      retry,
      rate_limits,
      invoker,
      ..
    } => EndpointTrigger::TaskQueueTrigger(TaskQueueTrigger {
      retry_config: retry_block(retry),
      rate_limits: rate_limits_block(rate_limits),
      invoker: invoker.clone(),
    }),
    _ => EndpointTrigger::EventTrigger(event_block(trigger, options)),
  }
}

fn event_block(trigger: &Trigger, options: &EndpointOptions) -> EventTrigger {
  let mut filters: BTreeMap<String, Value> = BTreeMap::new();
  let mut path_patterns: BTreeMap<String, Value> = BTreeMap::new();
  let mut channel = None;

  match trigger {
    Trigger::PubSub { topic } => {
      filters.insert("topic".to_string(), topic.clone().into());
    }
    Trigger::Firestore {
      document,
      database,
      namespace,
      ..
    } => {
      filters.insert("database".to_string(), database.clone().into());
      filters.insert("namespace".to_string(), namespace.clone().into());
      let document = document.trim_matches('/').to_string();
      if PathPattern::parse(&document).has_wildcards() {
        path_patterns.insert("document".to_string(), document.into());
      } else {
        filters.insert("document".to_string(), document.into());
      }
    }
    Trigger::Database {
      reference,
      instance,
      ..
    } => {
      path_patterns.insert(
        "ref".to_string(),
        reference.trim_matches('/').to_string().into(),
      );
      if instance.contains('*') {
        path_patterns.insert("instance".to_string(), instance.clone().into());
      } else {
        filters.insert("instance".to_string(), instance.clone().into());
      }
    }
    Trigger::Storage { bucket, .. } => {
      filters.insert("bucket".to_string(), bucket.clone().into());
    }
    Trigger::Alert { alert_type, app_id } => {
      filters.insert("alerttype".to_string(), alert_type.clone().into());
      if let Some(app_id) = app_id {
        filters.insert("appid".to_string(), app_id.clone().into());
      }
    }
    Trigger::CustomEvent {
      channel: declared_channel,
      filters: declared_filters,
      ..
    } => {
      for (key, value) in declared_filters {
        filters.insert(key.clone(), value.clone().into());
      }
      channel = declared_channel.clone();
    }
    _ => {}
  }

  EventTrigger {
    event_type: trigger.event_type().unwrap_or_default(),
    event_filters: filters,
    event_filter_path_patterns: path_patterns,
    channel,
    retry: value_of(&options.retry).unwrap_or(Value::Bool(false)),
  }
}

fn retry_block(retry: &RetryConfig) -> RetryConfigBlock {
  RetryConfigBlock {
    retry_count: value_of(&retry.retry_count),
    max_attempts: value_of(&retry.max_attempts),
    max_retry_seconds: value_of(&retry.max_retry_seconds),
    min_backoff_seconds: value_of(&retry.min_backoff_seconds),
    max_backoff_seconds: value_of(&retry.max_backoff_seconds),
    max_doublings: value_of(&retry.max_doublings),
  }
}

fn rate_limits_block(limits: &RateLimits) -> RateLimitsBlock {
  RateLimitsBlock {
    max_concurrent_dispatches: value_of(&limits.max_concurrent_dispatches),
    max_dispatches_per_second: value_of(&limits.max_dispatches_per_second),
  }
}

fn value_of(option: &Option<OptionValue>) -> Option<Value> {
  option.as_ref().and_then(OptionValue::to_manifest_value)
}

fn regions(region: &Option<OptionValue>) -> Vec<Value> {
  match value_of(region) {
    Some(Value::Array(regions)) if !regions.is_empty() => regions,
    Some(Value::Array(_)) | None => vec![Value::from(DEFAULT_REGION)],
    Some(region) => vec![region],
  }
}

#[cfg(test)]
mod tests {
  use kindling_config::{MemoryOption, ParamOptions, ParamType, SupportedRegion};
  use kindling_trigger::{BlockingEvent, DatabaseEvent, FirestoreEvent};
  use serde_json::json;

  use super::*;

  fn spec(trigger: Trigger) -> TriggerSpec {
    TriggerSpec::new(trigger, EndpointOptions::default())
  }

  fn endpoint_json(manifest: &Manifest, id: &str) -> Value {
    serde_json::to_value(&manifest.endpoints[id]).unwrap()
  }

  #[test]
  fn test_pubsub_endpoint_keyed_by_identifier() {
    let triggers = [spec(Trigger::PubSub {
      topic: "orders-created".to_string(),
    })];
    let manifest = assemble([], &triggers).unwrap();

    let endpoint = endpoint_json(&manifest, "on-message-published-orderscreated");
    assert_eq!(endpoint["entryPoint"], "onMessagePublished_orderscreated");
    assert_eq!(endpoint["region"], json!(["us-central1"]));
    assert_eq!(
      endpoint["eventTrigger"],
      json!({
        "eventType": "google.cloud.pubsub.topic.v1.messagePublished",
        "eventFilters": {"topic": "orders-created"},
        "retry": false,
      })
    );
  }

  #[test]
  fn test_generic_options_are_rendered() {
    let mut options = EndpointOptions {
      region: Some(vec![SupportedRegion::EuropeWest1, SupportedRegion::UsEast1].into()),
      memory: Some(OptionValue::param("MIN_MEM")),
      timeout_seconds: Some(OptionValue::from(60)),
      min_instances: Some(OptionValue::when("IS_PROD", 2, 0)),
      max_instances: Some(OptionValue::reset()),
      vpc_connector: Some(OptionValue::from("connector-1")),
      vpc_egress: Some(kindling_config::VpcEgress::AllTraffic.into()),
      secrets: vec!["API_KEY".to_string()],
      ..Default::default()
    };
    options.labels.insert("team".to_string(), "orders".to_string());

    let triggers = [TriggerSpec::new(
      Trigger::Https {
        name: "api".to_string(),
        invoker: vec!["public".to_string()],
        cors: vec!["https://example.com".to_string()],
      },
      options,
    )];
    let manifest = assemble([], &triggers).unwrap();

    assert_eq!(
      endpoint_json(&manifest, "api"),
      json!({
        "entryPoint": "api",
        "platform": "gcfv2",
        "region": ["europe-west1", "us-east1"],
        "availableMemoryMb": "{{ params.MIN_MEM }}",
        "timeoutSeconds": 60,
        "minInstances": "{{ params.IS_PROD ? 2 : 0 }}",
        "vpc": {"connector": "connector-1", "egressSettings": "ALL_TRAFFIC"},
        "labels": {"team": "orders"},
        "secretEnvironmentVariables": [{"key": "API_KEY"}],
        "httpsTrigger": {
          "invoker": ["public"],
          "cors": {"origins": ["https://example.com"]},
        },
      })
    );
  }

  #[test]
  fn test_literal_memory_renders_megabytes() {
    let triggers = [TriggerSpec::new(
      Trigger::Callable {
        name: "addMessage".to_string(),
        enforce_app_check: true,
      },
      EndpointOptions {
        memory: Some(MemoryOption::Mb512.into()),
        ..Default::default()
      },
    )];
    let manifest = assemble([], &triggers).unwrap();

    let endpoint = endpoint_json(&manifest, "add-message");
    assert_eq!(endpoint["availableMemoryMb"], 512);
    assert_eq!(endpoint["enforceAppCheck"], true);
    assert_eq!(endpoint["callableTrigger"], json!({}));
  }

  #[test]
  fn test_firestore_wildcards_use_path_patterns() {
    let triggers = [
      spec(Trigger::Firestore {
        event: FirestoreEvent::Updated,
        document: "users/{userId}/posts/{postId}".to_string(),
        database: "(default)".to_string(),
        namespace: "(default)".to_string(),
      }),
      spec(Trigger::Firestore {
        event: FirestoreEvent::Written,
        document: "config/main".to_string(),
        database: "(default)".to_string(),
        namespace: "(default)".to_string(),
      }),
    ];
    let manifest = assemble([], &triggers).unwrap();

    let wildcard = endpoint_json(&manifest, "on-document-updated-usersuser-idpostspost-id");
    assert_eq!(
      wildcard["eventTrigger"]["eventFilterPathPatterns"],
      json!({"document": "users/{userId}/posts/{postId}"})
    );
    assert!(wildcard["eventTrigger"]["eventFilters"].get("document").is_none());

    let exact = endpoint_json(&manifest, "on-document-written-configmain");
    assert_eq!(exact["eventTrigger"]["eventFilters"]["document"], "config/main");
    assert!(exact["eventTrigger"].get("eventFilterPathPatterns").is_none());
  }

  #[test]
  fn test_database_ref_and_instance_patterns() {
    let triggers = [spec(Trigger::Database {
      event: DatabaseEvent::Created,
      reference: "/messages/{id}".to_string(),
      instance: "*".to_string(),
    })];
    let manifest = assemble([], &triggers).unwrap();

    let endpoint = endpoint_json(&manifest, "on-value-created-messagesid");
    assert_eq!(
      endpoint["eventTrigger"]["eventFilterPathPatterns"],
      json!({"ref": "messages/{id}", "instance": "*"})
    );
    assert_eq!(
      endpoint["eventTrigger"]["eventType"],
      "google.firebase.database.ref.v1.created"
    );
  }

  #[test]
  fn test_required_apis_listed_once() {
    let triggers = [
      spec(Trigger::Schedule {
        schedule: "every 5 minutes".to_string(),
        time_zone: None,
        retry: RetryConfig::default(),
      }),
      spec(Trigger::Schedule {
        schedule: "every day 00:00".to_string(),
        time_zone: Some(OptionValue::from("America/New_York")),
        retry: RetryConfig {
          retry_count: Some(OptionValue::from(3)),
          ..Default::default()
        },
      }),
      spec(Trigger::Blocking {
        event: BlockingEvent::BeforeCreate,
        id_token: true,
        access_token: false,
        refresh_token: false,
      }),
      spec(Trigger::PubSub {
        topic: "t".to_string(),
      }),
    ];
    let manifest = assemble([], &triggers).unwrap();

    let apis: Vec<&str> = manifest
      .required_apis
      .iter()
      .map(|api| api.api.as_str())
      .collect();
    assert_eq!(
      apis,
      vec![
        "cloudscheduler.googleapis.com",
        "identitytoolkit.googleapis.com"
      ]
    );

    let blocking = endpoint_json(&manifest, "before-create");
    assert_eq!(
      blocking["blockingTrigger"],
      json!({
        "eventType": "providers/cloud.auth/eventTypes/user.beforeCreate",
        "options": {"idToken": true, "accessToken": false, "refreshToken": false},
      })
    );

    let daily = endpoint_json(&manifest, "on-schedule-everyday00-00");
    assert_eq!(
      daily["scheduleTrigger"],
      json!({
        "schedule": "every day 00:00",
        "timeZone": "America/New_York",
        "retryConfig": {"retryCount": 3},
      })
    );
  }

  #[test]
  fn test_task_queue_blocks_always_present() {
    let triggers = [spec(Trigger::TaskQueue {
      name: "resizeImages".to_string(),
      retry: RetryConfig::default(),
      rate_limits: RateLimits::default(),
      invoker: vec![],
    })];
    let manifest = assemble([], &triggers).unwrap();

    assert_eq!(
      endpoint_json(&manifest, "resize-images")["taskQueueTrigger"],
      json!({"retryConfig": {}, "rateLimits": {}})
    );
    assert_eq!(manifest.required_apis[0].api, "cloudtasks.googleapis.com");
  }

  #[test]
  fn test_params_are_listed_in_order() {
    let params = [
      ParamSpec::new("MIN_MEM", ParamType::Int, ParamOptions::default()),
      ParamSpec::json_secret("SERVICE_CONFIG"),
    ];
    let manifest = assemble(&params, []).unwrap();

    let json = serde_json::to_value(&manifest).unwrap();
    assert_eq!(
      json["params"],
      json!([
        {"name": "MIN_MEM", "type": "int"},
        {"name": "SERVICE_CONFIG", "type": "secret", "format": "json"},
      ])
    );
    assert_eq!(json["endpoints"], json!({}));
  }

  #[test]
  fn test_colliding_identifiers_keep_last() {
    let triggers = [
      spec(Trigger::Https {
        name: "helloWorld".to_string(),
        invoker: vec![],
        cors: vec![],
      }),
      spec(Trigger::Callable {
        name: "hello_world".to_string(),
        enforce_app_check: false,
      }),
    ];
    let manifest = assemble([], &triggers).unwrap();

    assert_eq!(manifest.endpoints.len(), 1);
    assert_eq!(manifest.endpoints["hello-world"].entry_point, "hello_world");
  }

  #[test]
  fn test_unnormalizable_name_is_an_error() {
    let triggers = [spec(Trigger::Https {
      name: "1234".to_string(),
      invoker: vec![],
      cors: vec![],
    })];
    let result = assemble([], &triggers);
    assert!(matches!(result, Err(ManifestError::Identifier { .. })));
  }
}
