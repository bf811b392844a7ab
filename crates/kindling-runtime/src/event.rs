//! Event envelopes.
//!
//! An event arrives either in binary mode, with attributes in `ce-` headers
//! and the payload as the body, or in structured mode, as one
//! `application/cloudevents+json` document. Both must carry `specversion`
//! `1.0`, `type`, `source` and `id` before the request is treated as an
//! event at all.

use bytes::Bytes;
use http::Request;
use http::header::CONTENT_TYPE;
use kindling_trigger::EventRoute;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{EnvelopeError, HandlerError};

/// Envelope protocol version accepted by the dispatcher.
pub const SPEC_VERSION: &str = "1.0";

/// Content type of a structured-mode envelope.
pub const STRUCTURED_CONTENT_TYPE: &str = "application/cloudevents+json";

const HEADER_PREFIX: &str = "ce-";

/// A parsed event envelope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudEvent {
  pub id: String,
  pub source: String,
  pub spec_version: String,
  pub event_type: String,
  pub time: Option<String>,
  pub subject: Option<String>,
  pub data_content_type: Option<String>,
  /// Firestore document path.
  pub document: Option<String>,
  /// Realtime Database reference path.
  pub reference: Option<String>,
  pub instance: Option<String>,
  pub database: Option<String>,
  pub namespace: Option<String>,
  /// Principal type of the change, e.g. `app_user`.
  pub auth_type: Option<String>,
  pub auth_id: Option<String>,
  pub alert_type: Option<String>,
  pub app_id: Option<String>,
  /// Payload bytes, undecoded.
  pub data: Bytes,
}

/// Attribute set shared by both modes, before validation.
#[derive(Debug, Default, Deserialize)]
struct Attributes {
  specversion: Option<String>,
  #[serde(rename = "type")]
  event_type: Option<String>,
  source: Option<String>,
  id: Option<String>,
  time: Option<String>,
  subject: Option<String>,
  datacontenttype: Option<String>,
  document: Option<String>,
  #[serde(rename = "ref")]
  reference: Option<String>,
  instance: Option<String>,
  database: Option<String>,
  namespace: Option<String>,
  authtype: Option<String>,
  authid: Option<String>,
  alerttype: Option<String>,
  appid: Option<String>,
  #[serde(default)]
  data: Option<serde_json::Value>,
}

impl CloudEvent {
  /// Parse the envelope carried by a request.
  ///
  /// `Ok(None)` means the request carries no envelope. An envelope that is
  /// present but incomplete is an error.
  pub fn from_request(request: &Request<Bytes>) -> Result<Option<Self>, EnvelopeError> {
    if request.headers().contains_key("ce-specversion") {
      return Self::from_binary(request).map(Some);
    }

    let structured = request
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|value| value.to_str().ok())
      .is_some_and(|value| value.starts_with(STRUCTURED_CONTENT_TYPE));
    if structured {
      return Self::from_structured(request.body()).map(Some);
    }

    Ok(None)
  }

  fn from_binary(request: &Request<Bytes>) -> Result<Self, EnvelopeError> {
    let header = |name: &str| -> Result<Option<String>, EnvelopeError> {
      let key = format!("{}{}", HEADER_PREFIX, name);
      match request.headers().get(key.as_str()) {
        None => Ok(None),
        Some(value) => value
          .to_str()
          .map(|v| Some(v.to_string()))
          .map_err(|_| EnvelopeError::InvalidHeader { name: key.clone() }),
      }
    };

    let attributes = Attributes {
      specversion: header("specversion")?,
      event_type: header("type")?,
      source: header("source")?,
      id: header("id")?,
      time: header("time")?,
      subject: header("subject")?,
      datacontenttype: request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string),
      document: header("document")?,
      reference: header("ref")?,
      instance: header("instance")?,
      database: header("database")?,
      namespace: header("namespace")?,
      authtype: header("authtype")?,
      authid: header("authid")?,
      alerttype: header("alerttype")?,
      appid: header("appid")?,
      data: None,
    };

    Self::from_attributes(attributes, request.body().clone())
  }

  fn from_structured(body: &Bytes) -> Result<Self, EnvelopeError> {
    let mut attributes: Attributes =
      serde_json::from_slice(body).map_err(|source| EnvelopeError::InvalidJson { source })?;
    let data = match attributes.data.take() {
      None | Some(serde_json::Value::Null) => Bytes::new(),
      Some(value) => Bytes::from(value.to_string()),
    };
    Self::from_attributes(attributes, data)
  }

  fn from_attributes(attributes: Attributes, data: Bytes) -> Result<Self, EnvelopeError> {
    let spec_version = attributes
      .specversion
      .ok_or(EnvelopeError::MissingAttribute {
        name: "specversion",
      })?;
    if spec_version != SPEC_VERSION {
      return Err(EnvelopeError::UnsupportedSpecVersion {
        version: spec_version,
      });
    }

    Ok(Self {
      event_type: attributes
        .event_type
        .ok_or(EnvelopeError::MissingAttribute { name: "type" })?,
      source: attributes
        .source
        .ok_or(EnvelopeError::MissingAttribute { name: "source" })?,
      id: attributes
        .id
        .ok_or(EnvelopeError::MissingAttribute { name: "id" })?,
      spec_version,
      time: attributes.time,
      subject: attributes.subject,
      data_content_type: attributes.datacontenttype,
      document: attributes.document,
      reference: attributes.reference,
      instance: attributes.instance,
      database: attributes.database,
      namespace: attributes.namespace,
      auth_type: attributes.authtype,
      auth_id: attributes.authid,
      alert_type: attributes.alerttype,
      app_id: attributes.appid,
      data,
    })
  }

  /// Routing attributes of this event.
  pub fn route(&self) -> EventRoute<'_> {
    EventRoute {
      event_type: &self.event_type,
      source: &self.source,
      document: self.document.as_deref(),
      reference: self.reference.as_deref(),
      alert_type: self.alert_type.as_deref(),
    }
  }

  /// Decode the payload as JSON.
  pub fn data_json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
    serde_json::from_slice(&self.data).map_err(|source| HandlerError::InvalidData { source })
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn binary(headers: &[(&str, &str)], body: &'static str) -> Request<Bytes> {
    let mut builder = Request::builder().method("POST").uri("/");
    for (name, value) in headers {
      builder = builder.header(*name, *value);
    }
    builder.body(Bytes::from_static(body.as_bytes())).unwrap()
  }

  #[test]
  fn test_binary_mode() {
    let request = binary(
      &[
        ("ce-specversion", "1.0"),
        ("ce-type", "google.cloud.firestore.document.v1.updated"),
        ("ce-source", "//firestore.googleapis.com/projects/demo/databases/(default)"),
        ("ce-id", "evt-1"),
        ("ce-document", "users/42"),
        ("content-type", "application/protobuf"),
      ],
      "payload",
    );

    let event = CloudEvent::from_request(&request).unwrap().unwrap();
    assert_eq!(event.id, "evt-1");
    assert_eq!(event.document.as_deref(), Some("users/42"));
    assert_eq!(event.data_content_type.as_deref(), Some("application/protobuf"));
    assert_eq!(event.data, Bytes::from_static(b"payload"));
  }

  #[test]
  fn test_structured_mode() {
    let body = json!({
      "specversion": "1.0",
      "type": "google.cloud.pubsub.topic.v1.messagePublished",
      "source": "//pubsub.googleapis.com/projects/demo/topics/orders",
      "id": "evt-2",
      "data": {"message": {"data": "aGk="}},
    })
    .to_string();
    let request = Request::builder()
      .method("POST")
      .header("content-type", "application/cloudevents+json; charset=utf-8")
      .body(Bytes::from(body))
      .unwrap();

    let event = CloudEvent::from_request(&request).unwrap().unwrap();
    assert_eq!(event.route().source, "//pubsub.googleapis.com/projects/demo/topics/orders");
    let data: serde_json::Value = event.data_json().unwrap();
    assert_eq!(data["message"]["data"], "aGk=");
  }

  #[test]
  fn test_plain_request_has_no_envelope() {
    let request = binary(&[("content-type", "application/json")], "{}");
    assert!(CloudEvent::from_request(&request).unwrap().is_none());
  }

  #[test]
  fn test_missing_attribute_is_rejected() {
    let request = binary(
      &[
        ("ce-specversion", "1.0"),
        ("ce-type", "google.cloud.pubsub.topic.v1.messagePublished"),
        ("ce-id", "evt-3"),
      ],
      "",
    );
    assert!(matches!(
      CloudEvent::from_request(&request),
      Err(EnvelopeError::MissingAttribute { name: "source" })
    ));
  }

  #[test]
  fn test_wrong_spec_version_is_rejected() {
    let request = binary(
      &[
        ("ce-specversion", "0.3"),
        ("ce-type", "t"),
        ("ce-source", "s"),
        ("ce-id", "i"),
      ],
      "",
    );
    assert!(matches!(
      CloudEvent::from_request(&request),
      Err(EnvelopeError::UnsupportedSpecVersion { .. })
    ));
  }
}
