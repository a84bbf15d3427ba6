//! The message envelope and its three payload kinds.
//!
//! A [`MaltegoMessage`] carries at most one [`Payload`]. Which payload it is
//! is decided by the element name on the wire; there is no discriminant
//! attribute. See [`crate::codec`] for the byte-level encoding.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::types::UiMessageType;

/// Root of every message, `<MaltegoMessage>`.
///
/// `payload` is `None` only for an envelope that has nothing staged yet; it
/// encodes as an empty root element.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MaltegoMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

/// The envelope's single payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// `MaltegoTransformRequestMessage`, client → server.
    Request(RequestMessage),
    /// `MaltegoTransformResponseMessage`, server → client.
    Response(ResponseMessage),
    /// `MaltegoTransformExceptionMessage`, server → client.
    Exception(ExceptionMessage),
}

impl Payload {
    /// Wire element name of this payload.
    pub fn element_name(&self) -> &'static str {
        match self {
            Payload::Request(_) => REQUEST_ELEMENT,
            Payload::Response(_) => RESPONSE_ELEMENT,
            Payload::Exception(_) => EXCEPTION_ELEMENT,
        }
    }
}

pub(crate) const ROOT_ELEMENT: &str = "MaltegoMessage";
pub(crate) const REQUEST_ELEMENT: &str = "MaltegoTransformRequestMessage";
pub(crate) const RESPONSE_ELEMENT: &str = "MaltegoTransformResponseMessage";
pub(crate) const EXCEPTION_ELEMENT: &str = "MaltegoTransformExceptionMessage";

impl MaltegoMessage {
    pub fn request(request: RequestMessage) -> Self {
        Self {
            payload: Some(Payload::Request(request)),
        }
    }

    pub fn response(response: ResponseMessage) -> Self {
        Self {
            payload: Some(Payload::Response(response)),
        }
    }

    pub fn exception(exception: ExceptionMessage) -> Self {
        Self {
            payload: Some(Payload::Exception(exception)),
        }
    }

    pub fn as_request(&self) -> Option<&RequestMessage> {
        match &self.payload {
            Some(Payload::Request(r)) => Some(r),
            _ => None,
        }
    }

    pub fn as_response(&self) -> Option<&ResponseMessage> {
        match &self.payload {
            Some(Payload::Response(r)) => Some(r),
            _ => None,
        }
    }

    pub fn as_exception(&self) -> Option<&ExceptionMessage> {
        match &self.payload {
            Some(Payload::Exception(e)) => Some(e),
            _ => None,
        }
    }
}

/// A transform request sent by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestMessage {
    /// Input entities. The client sends exactly one; that rule is enforced
    /// by the server, not here.
    pub entities: Vec<Entity>,
    pub limits: Limits,
    /// Named transform settings (`TransformFields/Field`).
    pub transform_fields: Vec<TransformField>,
}

impl RequestMessage {
    /// Text of the first transform field called `name`, or `""`.
    pub fn transform_field(&self, name: &str) -> &str {
        self.transform_fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.text.as_str())
            .unwrap_or("")
    }
}

/// Result-count limits, `Limits[@SoftLimit,@HardLimit]`. Kept as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Limits {
    pub soft_limit: String,
    pub hard_limit: String,
}

impl Limits {
    /// The soft limit as a number, if it parses.
    pub fn soft(&self) -> Option<u32> {
        self.soft_limit.trim().parse().ok()
    }

    /// The hard limit as a number, if it parses.
    pub fn hard(&self) -> Option<u32> {
        self.hard_limit.trim().parse().ok()
    }
}

/// A named transform setting, `TransformFields/Field[@Name]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransformField {
    pub name: String,
    pub text: String,
}

/// Entities and UI messages returned to the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseMessage {
    pub entities: Vec<Entity>,
    pub ui_messages: Vec<UiMessage>,
}

/// A line in the client's output pane, `UIMessage[@MessageType]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiMessage {
    pub text: String,
    pub message_type: UiMessageType,
}

/// One or more coded exceptions returned instead of a response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExceptionMessage {
    pub exceptions: Vec<Exception>,
}

/// `Exception[@code]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exception {
    pub text: String,
    pub code: String,
}
