//! Kindling Runtime
//!
//! Executes trigger declarations into a [`Registry`] and routes live
//! requests to the registered handlers.
//!
//! # Example
//!
//! ```ignore
//! use kindling_runtime::{DispatcherConfig, Functions, HandlerError, PubSubOptions};
//!
//! let mut functions = Functions::new();
//! functions.pubsub().on_message_published(
//!   PubSubOptions { topic: "orders".into(), ..Default::default() },
//!   |event: CloudEvent| async move {
//!     let order: Order = event.data_json()?;
//!     Ok::<(), HandlerError>(())
//!   },
//! )?;
//!
//! let dispatcher = functions.into_dispatcher(DispatcherConfig::from_env());
//! let response = dispatcher.dispatch(request).await;
//! ```
//!
//! The manifest for the same declarations is produced either by
//! `kindling-scanner` reading the source, or by [`Registry::manifest`] at
//! run time. Both go through the assembler in `kindling-manifest`.

mod dispatcher;
mod error;
mod event;
mod functions;
mod handler;
mod options;
pub mod params;
mod registry;

pub use dispatcher::{
  Dispatcher, DispatcherConfig, HEALTH_PATH, MANIFEST_PATH, QUIT_PATH, TARGET_HEADER,
};
pub use error::{DispatchError, EnvelopeError, HandlerError, RegistryError};
pub use event::{CloudEvent, SPEC_VERSION, STRUCTURED_CONTENT_TYPE};
pub use functions::{
  AlertsNamespace, AppDistributionNamespace, BillingNamespace, CrashlyticsNamespace,
  DatabaseNamespace, EventarcNamespace, FirestoreNamespace, Functions, HttpsNamespace,
  IdentityNamespace, ParamsNamespace, PerformanceNamespace, PubSubNamespace,
  RemoteConfigNamespace, SchedulerNamespace, StorageNamespace, TasksNamespace, TestLabNamespace,
};
pub use handler::{EventHandler, Handler, HttpHandler};
pub use options::{
  AlertOptions, AppAlertOptions, BlockingOptions, CallableOptions, CustomEventOptions,
  DatabaseOptions, EventOptions, FirestoreOptions, HttpsOptions, PubSubOptions, ScheduleOptions,
  StorageOptions, TaskQueueOptions,
};
pub use params::Param;
pub use registry::{Registration, Registry};
