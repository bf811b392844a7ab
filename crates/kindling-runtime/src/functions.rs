//! The declaration API.
//!
//! [`Functions`] owns the registry while declarations run. Each namespace
//! accessor returns a short-lived view whose methods build a [`Trigger`],
//! derive its final name and register the handler:
//!
//! ```ignore
//! let mut functions = Functions::new();
//! functions.pubsub().on_message_published(
//!   PubSubOptions { topic: "orders-created".into(), ..Default::default() },
//!   handle_order,
//! )?;
//! let dispatcher = functions.into_dispatcher(DispatcherConfig::from_env());
//! ```
//!
//! The manifest scanner recognizes these exact namespaces and methods, so
//! names here are part of the declaration contract.

use std::future::Future;

use futures::future::BoxFuture;
use kindling_config::{EndpointOptions, ParamOptions, ParamSpec};
use kindling_trigger::naming::alert_types;
use kindling_trigger::{
  BlockingEvent, DEFAULT_DATABASE_INSTANCE, DEFAULT_FIRESTORE_DATABASE, DatabaseEvent,
  FirestoreEvent, StorageEvent, Trigger, TriggerSpec,
};

use crate::dispatcher::{Dispatcher, DispatcherConfig, InitHook};
use crate::error::RegistryError;
use crate::handler::{EventHandler, Handler, HttpHandler};
use crate::options::{
  AlertOptions, AppAlertOptions, BlockingOptions, CallableOptions, CustomEventOptions,
  DatabaseOptions, EventOptions, FirestoreOptions, HttpsOptions, PubSubOptions, ScheduleOptions,
  StorageOptions, TaskQueueOptions,
};
use crate::params::{self, Param};
use crate::registry::Registry;

/// Registration context, constructed once per process.
#[derive(Default)]
pub struct Functions {
  registry: Registry,
  init_hook: Option<InitHook>,
}

impl Functions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Run `hook` once, before the first function invocation.
  ///
  /// Manifest generation never runs the hook, so it may depend on values
  /// only available at runtime.
  pub fn on_init<F, Fut>(&mut self, hook: F)
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    self.init_hook = Some(Box::new(move || -> BoxFuture<'static, ()> { Box::pin(hook()) }));
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  pub fn into_registry(self) -> Registry {
    self.registry
  }

  pub fn into_dispatcher(self, config: DispatcherConfig) -> Dispatcher {
    let dispatcher = Dispatcher::new(self.registry, config);
    match self.init_hook {
      Some(hook) => dispatcher.with_boxed_init(hook),
      None => dispatcher,
    }
  }

  pub fn params(&mut self) -> ParamsNamespace<'_> {
    ParamsNamespace { functions: self }
  }

  fn register(
    &mut self,
    trigger: Trigger,
    options: EndpointOptions,
    handler: Handler,
  ) -> Result<(), RegistryError> {
    self
      .registry
      .register(TriggerSpec::new(trigger, options), handler)
  }
}

macro_rules! namespaces {
  ($($accessor:ident => $namespace:ident),* $(,)?) => {
    $(
      pub struct $namespace<'a> {
        functions: &'a mut Functions,
      }
    )*

    impl Functions {
      $(
        pub fn $accessor(&mut self) -> $namespace<'_> {
          $namespace { functions: self }
        }
      )*
    }
  };
}

namespaces! {
  https => HttpsNamespace,
  pubsub => PubSubNamespace,
  firestore => FirestoreNamespace,
  database => DatabaseNamespace,
  storage => StorageNamespace,
  alerts => AlertsNamespace,
  crashlytics => CrashlyticsNamespace,
  billing => BillingNamespace,
  app_distribution => AppDistributionNamespace,
  performance => PerformanceNamespace,
  identity => IdentityNamespace,
  scheduler => SchedulerNamespace,
  tasks => TasksNamespace,
  eventarc => EventarcNamespace,
  remote_config => RemoteConfigNamespace,
  test_lab => TestLabNamespace,
}

pub struct ParamsNamespace<'a> {
  functions: &'a mut Functions,
}

impl ParamsNamespace<'_> {
  /// List a parameter built with the free `define_*` functions.
  pub fn declare(self, param: &Param) {
    self.functions.registry.add_param(param.spec().clone());
  }

  pub fn define_string(self, name: &str, options: ParamOptions) -> Param {
    self.record(params::define_string(name, options))
  }

  pub fn define_int(self, name: &str, options: ParamOptions) -> Param {
    self.record(params::define_int(name, options))
  }

  pub fn define_float(self, name: &str, options: ParamOptions) -> Param {
    self.record(params::define_float(name, options))
  }

  pub fn define_bool(self, name: &str, options: ParamOptions) -> Param {
    self.record(params::define_bool(name, options))
  }

  pub fn define_list(self, name: &str, options: ParamOptions) -> Param {
    self.record(params::define_list(name, options))
  }

  pub fn define_secret(self, name: &str) -> Param {
    self.record(params::define_secret(name))
  }

  pub fn define_json_secret(self, name: &str) -> Param {
    self.record(params::define_json_secret(name))
  }

  fn record(self, param: Param) -> Param {
    let spec: ParamSpec = param.spec().clone();
    self.functions.registry.add_param(spec);
    param
  }
}

impl HttpsNamespace<'_> {
  pub fn on_request(
    self,
    options: HttpsOptions,
    handler: impl HttpHandler + 'static,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::Https {
      name: options.name,
      invoker: options.invoker,
      cors: options.cors,
    };
    self
      .functions
      .register(trigger, options.options, Handler::http(handler))
  }

  pub fn on_call(
    self,
    options: CallableOptions,
    handler: impl HttpHandler + 'static,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::Callable {
      name: options.name,
      enforce_app_check: options.enforce_app_check,
    };
    self
      .functions
      .register(trigger, options.options, Handler::http(handler))
  }
}

impl PubSubNamespace<'_> {
  pub fn on_message_published(
    self,
    options: PubSubOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::PubSub {
      topic: options.topic,
    };
    self
      .functions
      .register(trigger, options.options, Handler::event(handler))
  }
}

impl FirestoreNamespace<'_> {
  fn on(
    self,
    event: FirestoreEvent,
    options: FirestoreOptions,
    handler: Handler,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::Firestore {
      event,
      document: options.document,
      database: options
        .database
        .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE.to_string()),
      namespace: options
        .namespace
        .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE.to_string()),
    };
    self.functions.register(trigger, options.options, handler)
  }

  pub fn on_document_written(
    self,
    options: FirestoreOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(FirestoreEvent::Written, options, Handler::event(handler))
  }

  pub fn on_document_created(
    self,
    options: FirestoreOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(FirestoreEvent::Created, options, Handler::event(handler))
  }

  pub fn on_document_updated(
    self,
    options: FirestoreOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(FirestoreEvent::Updated, options, Handler::event(handler))
  }

  pub fn on_document_deleted(
    self,
    options: FirestoreOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(FirestoreEvent::Deleted, options, Handler::event(handler))
  }

  pub fn on_document_written_with_auth_context(
    self,
    options: FirestoreOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(
      FirestoreEvent::WrittenWithAuthContext,
      options,
      Handler::event(handler),
    )
  }

  pub fn on_document_created_with_auth_context(
    self,
    options: FirestoreOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(
      FirestoreEvent::CreatedWithAuthContext,
      options,
      Handler::event(handler),
    )
  }

  pub fn on_document_updated_with_auth_context(
    self,
    options: FirestoreOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(
      FirestoreEvent::UpdatedWithAuthContext,
      options,
      Handler::event(handler),
    )
  }

  pub fn on_document_deleted_with_auth_context(
    self,
    options: FirestoreOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(
      FirestoreEvent::DeletedWithAuthContext,
      options,
      Handler::event(handler),
    )
  }
}

impl DatabaseNamespace<'_> {
  fn on(
    self,
    event: DatabaseEvent,
    options: DatabaseOptions,
    handler: Handler,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::Database {
      event,
      reference: options.reference,
      instance: options
        .instance
        .unwrap_or_else(|| DEFAULT_DATABASE_INSTANCE.to_string()),
    };
    self.functions.register(trigger, options.options, handler)
  }

  pub fn on_value_written(
    self,
    options: DatabaseOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(DatabaseEvent::Written, options, Handler::event(handler))
  }

  pub fn on_value_created(
    self,
    options: DatabaseOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(DatabaseEvent::Created, options, Handler::event(handler))
  }

  pub fn on_value_updated(
    self,
    options: DatabaseOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(DatabaseEvent::Updated, options, Handler::event(handler))
  }

  pub fn on_value_deleted(
    self,
    options: DatabaseOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(DatabaseEvent::Deleted, options, Handler::event(handler))
  }
}

impl StorageNamespace<'_> {
  fn on(
    self,
    event: StorageEvent,
    options: StorageOptions,
    handler: Handler,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::Storage {
      event,
      bucket: options.bucket,
    };
    self.functions.register(trigger, options.options, handler)
  }

  pub fn on_object_finalized(
    self,
    options: StorageOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(StorageEvent::Finalized, options, Handler::event(handler))
  }

  pub fn on_object_archived(
    self,
    options: StorageOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(StorageEvent::Archived, options, Handler::event(handler))
  }

  pub fn on_object_deleted(
    self,
    options: StorageOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(StorageEvent::Deleted, options, Handler::event(handler))
  }

  pub fn on_object_metadata_updated(
    self,
    options: StorageOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(StorageEvent::MetadataUpdated, options, Handler::event(handler))
  }
}

impl AlertsNamespace<'_> {
  pub fn on_alert_published(
    self,
    options: AlertOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::Alert {
      alert_type: options.alert_type,
      app_id: options.app_id,
    };
    self
      .functions
      .register(trigger, options.options, Handler::event(handler))
  }
}

/// Register an alert whose type is fixed by the declaring method.
fn register_app_alert(
  functions: &mut Functions,
  alert_type: &str,
  options: AppAlertOptions,
  handler: Handler,
) -> Result<(), RegistryError> {
  let trigger = Trigger::Alert {
    alert_type: alert_type.to_string(),
    app_id: options.app_id,
  };
  functions.register(trigger, options.options, handler)
}

impl CrashlyticsNamespace<'_> {
  pub fn on_new_fatal_issue_published(
    self,
    options: AppAlertOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    register_app_alert(
      self.functions,
      alert_types::CRASHLYTICS_NEW_FATAL_ISSUE,
      options,
      Handler::event(handler),
    )
  }

  pub fn on_new_nonfatal_issue_published(
    self,
    options: AppAlertOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    register_app_alert(
      self.functions,
      alert_types::CRASHLYTICS_NEW_NONFATAL_ISSUE,
      options,
      Handler::event(handler),
    )
  }

  pub fn on_regression_alert_published(
    self,
    options: AppAlertOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    register_app_alert(
      self.functions,
      alert_types::CRASHLYTICS_REGRESSION,
      options,
      Handler::event(handler),
    )
  }

  pub fn on_velocity_alert_published(
    self,
    options: AppAlertOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    register_app_alert(
      self.functions,
      alert_types::CRASHLYTICS_VELOCITY,
      options,
      Handler::event(handler),
    )
  }
}

impl BillingNamespace<'_> {
  pub fn on_plan_update_published(
    self,
    options: AppAlertOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    register_app_alert(
      self.functions,
      alert_types::BILLING_PLAN_UPDATE,
      options,
      Handler::event(handler),
    )
  }

  pub fn on_plan_automated_update_published(
    self,
    options: AppAlertOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    register_app_alert(
      self.functions,
      alert_types::BILLING_PLAN_AUTOMATED_UPDATE,
      options,
      Handler::event(handler),
    )
  }
}

impl AppDistributionNamespace<'_> {
  pub fn on_new_tester_ios_device_published(
    self,
    options: AppAlertOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    register_app_alert(
      self.functions,
      alert_types::APP_DISTRIBUTION_NEW_TESTER_IOS_DEVICE,
      options,
      Handler::event(handler),
    )
  }

  pub fn on_in_app_feedback_published(
    self,
    options: AppAlertOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    register_app_alert(
      self.functions,
      alert_types::APP_DISTRIBUTION_IN_APP_FEEDBACK,
      options,
      Handler::event(handler),
    )
  }
}

impl PerformanceNamespace<'_> {
  pub fn on_threshold_alert_published(
    self,
    options: AppAlertOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    register_app_alert(
      self.functions,
      alert_types::PERFORMANCE_THRESHOLD,
      options,
      Handler::event(handler),
    )
  }
}

impl IdentityNamespace<'_> {
  fn on(
    self,
    event: BlockingEvent,
    options: BlockingOptions,
    handler: Handler,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::Blocking {
      event,
      id_token: options.id_token,
      access_token: options.access_token,
      refresh_token: options.refresh_token,
    };
    self.functions.register(trigger, options.options, handler)
  }

  pub fn before_user_created(
    self,
    options: BlockingOptions,
    handler: impl HttpHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(BlockingEvent::BeforeCreate, options, Handler::http(handler))
  }

  pub fn before_user_signed_in(
    self,
    options: BlockingOptions,
    handler: impl HttpHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(BlockingEvent::BeforeSignIn, options, Handler::http(handler))
  }

  pub fn before_email_sent(
    self,
    options: BlockingOptions,
    handler: impl HttpHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(BlockingEvent::BeforeSendEmail, options, Handler::http(handler))
  }

  pub fn before_sms_sent(
    self,
    options: BlockingOptions,
    handler: impl HttpHandler + 'static,
  ) -> Result<(), RegistryError> {
    self.on(BlockingEvent::BeforeSendSms, options, Handler::http(handler))
  }
}

impl SchedulerNamespace<'_> {
  pub fn on_schedule(
    self,
    options: ScheduleOptions,
    handler: impl HttpHandler + 'static,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::Schedule {
      schedule: options.schedule,
      time_zone: options.time_zone,
      retry: options.retry,
    };
    self
      .functions
      .register(trigger, options.options, Handler::http(handler))
  }
}

impl TasksNamespace<'_> {
  pub fn on_task_dispatched(
    self,
    options: TaskQueueOptions,
    handler: impl HttpHandler + 'static,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::TaskQueue {
      name: options.name,
      retry: options.retry,
      rate_limits: options.rate_limits,
      invoker: options.invoker,
    };
    self
      .functions
      .register(trigger, options.options, Handler::http(handler))
  }
}

impl EventarcNamespace<'_> {
  pub fn on_custom_event_published(
    self,
    options: CustomEventOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    let trigger = Trigger::CustomEvent {
      event_type: options.event_type,
      channel: options.channel,
      filters: options.filters,
    };
    self
      .functions
      .register(trigger, options.options, Handler::event(handler))
  }
}

impl RemoteConfigNamespace<'_> {
  pub fn on_config_updated(
    self,
    options: EventOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self
      .functions
      .register(Trigger::RemoteConfig, options.options, Handler::event(handler))
  }
}

impl TestLabNamespace<'_> {
  pub fn on_test_matrix_completed(
    self,
    options: EventOptions,
    handler: impl EventHandler + 'static,
  ) -> Result<(), RegistryError> {
    self
      .functions
      .register(Trigger::TestLab, options.options, Handler::event(handler))
  }
}
