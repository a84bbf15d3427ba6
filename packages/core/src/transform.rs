//! The per-request [`Transform`] builder.
//!
//! A transform holds the decoded request (read-only) and stages the reply:
//! entities and UI messages go into a response, coded exceptions into an
//! exception message. [`Transform::render`] turns whatever is staged into
//! wire text; the request is never echoed back.

use thiserror::Error;

use crate::codec::{decode, DecodeError, Encoder};
use crate::entity::Entity;
use crate::escape::escape;
use crate::message::{
    Exception, ExceptionMessage, MaltegoMessage, Payload, RequestMessage, ResponseMessage,
    UiMessage,
};
use crate::types::UiMessageType;

/// Weight given to entities created through [`Transform::add_entity`].
pub const DEFAULT_WEIGHT: &str = "100";

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("could not decode request: {0}")]
    Decode(#[from] DecodeError),

    #[error("message has no {0} payload")]
    MissingRequest(&'static str),

    /// A transform body gave up. The text is shown to the analyst.
    #[error("{0}")]
    Failed(String),
}

impl TransformError {
    /// Wrap any displayable error as a transform failure.
    pub fn failed(err: impl std::fmt::Display) -> Self {
        TransformError::Failed(err.to_string())
    }
}

/// Builder for one transform run.
#[derive(Debug, Clone, Default)]
pub struct Transform {
    request: Option<RequestMessage>,
    response: Option<ResponseMessage>,
    exceptions: Option<ExceptionMessage>,
}

impl Transform {
    /// An empty transform with no request, e.g. for local runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transform answering `request`.
    pub fn with_request(request: RequestMessage) -> Self {
        Self {
            request: Some(request),
            ..Self::default()
        }
    }

    /// Decode `bytes` and require a request payload.
    pub fn from_request(bytes: &[u8]) -> Result<Self, TransformError> {
        match decode(bytes)?.payload {
            Some(Payload::Request(request)) => Ok(Self::with_request(request)),
            _ => Err(TransformError::MissingRequest(
                crate::message::REQUEST_ELEMENT,
            )),
        }
    }

    pub fn request(&self) -> Option<&RequestMessage> {
        self.request.as_ref()
    }

    /// The first entity of the request. The client always sends exactly one.
    pub fn input_entity(&self) -> Option<&Entity> {
        self.request.as_ref().and_then(|r| r.entities.first())
    }

    /// A named transform setting from the request, or `""`.
    pub fn transform_field(&self, name: &str) -> &str {
        self.request
            .as_ref()
            .map(|r| r.transform_field(name))
            .unwrap_or("")
    }

    /// Append an entity to the response and return it for further setup.
    ///
    /// `value` is escaped; the weight is [`DEFAULT_WEIGHT`].
    pub fn add_entity(&mut self, entity_type: &str, value: &str) -> &mut Entity {
        let entities = &mut self.response.get_or_insert_with(Default::default).entities;
        entities.push(Entity::new(entity_type, escape(value), DEFAULT_WEIGHT));
        let last = entities.len() - 1;
        &mut entities[last]
    }

    /// Append a UI message to the response. `text` is stored as given.
    pub fn add_ui_message(&mut self, text: &str, message_type: UiMessageType) {
        self.response
            .get_or_insert_with(Default::default)
            .ui_messages
            .push(UiMessage {
                text: text.to_string(),
                message_type,
            });
    }

    pub fn add_exception(&mut self, text: &str, code: &str) {
        self.exceptions
            .get_or_insert_with(Default::default)
            .exceptions
            .push(Exception {
                text: text.to_string(),
                code: code.to_string(),
            });
    }

    pub fn response(&self) -> Option<&ResponseMessage> {
        self.response.as_ref()
    }

    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    pub fn has_exceptions(&self) -> bool {
        self.exceptions.is_some()
    }

    /// The envelope [`render`](Self::render) would encode: the response when
    /// one is staged, otherwise the exceptions, otherwise nothing.
    pub fn message(&self) -> MaltegoMessage {
        if let Some(response) = &self.response {
            MaltegoMessage::response(response.clone())
        } else if let Some(exceptions) = &self.exceptions {
            MaltegoMessage::exception(exceptions.clone())
        } else {
            MaltegoMessage::default()
        }
    }

    /// Encode the staged reply.
    ///
    /// Encoding failures are logged and whatever was written before the
    /// failure is returned.
    pub fn render(&self) -> String {
        let mut encoder = Encoder::new();
        if let Err(e) = encoder.message(&self.message()) {
            tracing::warn!("failed to encode transform output: {e}");
        }
        encoder.finish()
    }

    /// Drop the staged response and encode the staged exceptions.
    pub fn render_as_exception(&mut self) -> String {
        self.response = None;
        self.render()
    }
}
