//! Function handler traits.
//!
//! HTTP-invoked functions (requests, callables, blocking, scheduled and
//! task-queue functions) implement [`HttpHandler`]. Event functions
//! implement [`EventHandler`]. Both are implemented for async functions and
//! closures of the matching shape.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};

use crate::error::HandlerError;
use crate::event::CloudEvent;

#[async_trait]
pub trait HttpHandler: Send + Sync {
  async fn handle(&self, request: Request<Bytes>) -> Result<Response<Bytes>, HandlerError>;
}

#[async_trait]
pub trait EventHandler: Send + Sync {
  async fn handle(&self, event: CloudEvent) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F, Fut> HttpHandler for F
where
  F: Fn(Request<Bytes>) -> Fut + Send + Sync,
  Fut: Future<Output = Result<Response<Bytes>, HandlerError>> + Send + 'static,
{
  async fn handle(&self, request: Request<Bytes>) -> Result<Response<Bytes>, HandlerError> {
    (self)(request).await
  }
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
  F: Fn(CloudEvent) -> Fut + Send + Sync,
  Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
  async fn handle(&self, event: CloudEvent) -> Result<(), HandlerError> {
    (self)(event).await
  }
}

/// A registered handler.
#[derive(Clone)]
pub enum Handler {
  Http(Arc<dyn HttpHandler>),
  Event(Arc<dyn EventHandler>),
}

impl Handler {
  pub fn http(handler: impl HttpHandler + 'static) -> Self {
    Self::Http(Arc::new(handler))
  }

  pub fn event(handler: impl EventHandler + 'static) -> Self {
    Self::Event(Arc::new(handler))
  }

  pub fn is_event(&self) -> bool {
    matches!(self, Self::Event(_))
  }
}

impl fmt::Debug for Handler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Http(_) => f.write_str("Handler::Http"),
      Self::Event(_) => f.write_str("Handler::Event"),
    }
  }
}
