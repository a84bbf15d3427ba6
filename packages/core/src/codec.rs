//! XML encoding and decoding of [`MaltegoMessage`]s.
//!
//! The client parses a fixed schema, so the encoder is byte-exact rather than
//! merely well-formed:
//!
//! - `Value` and `Weight` are always written, as `<Value></Value>` when empty.
//! - Empty elements are never self-closed.
//! - Attribute and child order follow the schema, not alphabetical order.
//! - Display labels are written as CDATA.
//! - Character data and attribute values go through [`xml_escape`].
//!
//! The decoder is lenient: unknown elements are skipped at every level,
//! whitespace between elements is ignored, and leaf text is the
//! concatenation of its text and CDATA content.

use std::borrow::Cow;

use quick_xml::events::attributes::{AttrError, Attribute};
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::entity::{DisplayLabel, Entity, Field, Genealogy};
use crate::escape::xml_escape;
use crate::message::{
    Exception, ExceptionMessage, Limits, MaltegoMessage, Payload, RequestMessage,
    ResponseMessage, TransformField, UiMessage, EXCEPTION_ELEMENT, REQUEST_ELEMENT,
    RESPONSE_ELEMENT, ROOT_ELEMENT,
};
use crate::types::{MatchingRule, UiMessageType};

/// Errors raised while decoding a message.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("text is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("document has no root element")]
    MissingRoot,

    #[error("expected element <MaltegoMessage> but have <{0}>")]
    UnexpectedRoot(String),

    #[error("document ended inside an element")]
    UnexpectedEof,
}

/// Errors raised while encoding a message.
///
/// The in-memory model cannot produce invalid XML, so this only surfaces
/// failures of the underlying writer.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a message to its wire text.
pub fn encode(message: &MaltegoMessage) -> Result<String, EncodeError> {
    let mut encoder = Encoder::new();
    encoder.message(message)?;
    Ok(encoder.finish())
}

/// Encode a single `<Entity>` element.
pub fn encode_entity(entity: &Entity) -> Result<String, EncodeError> {
    let mut encoder = Encoder::new();
    encoder.entity(entity)?;
    Ok(encoder.finish())
}

/// Encode a single display `<Label>` element.
pub fn encode_label(label: &DisplayLabel) -> Result<String, EncodeError> {
    let mut encoder = Encoder::new();
    encoder.label(label)?;
    Ok(encoder.finish())
}

/// Streaming writer for the message schema.
///
/// Kept crate-visible so [`crate::Transform::render`] can recover whatever
/// was written before a failure.
pub(crate) struct Encoder {
    writer: Writer<Vec<u8>>,
}

impl Encoder {
    pub(crate) fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    /// The text written so far.
    pub(crate) fn finish(self) -> String {
        String::from_utf8_lossy(&self.writer.into_inner()).into_owned()
    }

    pub(crate) fn message(&mut self, message: &MaltegoMessage) -> Result<(), EncodeError> {
        self.start(ROOT_ELEMENT, &[])?;
        match &message.payload {
            Some(Payload::Request(request)) => self.request(request)?,
            Some(Payload::Response(response)) => self.response(response)?,
            Some(Payload::Exception(exception)) => self.exception(exception)?,
            None => {}
        }
        self.end(ROOT_ELEMENT)
    }

    fn request(&mut self, request: &RequestMessage) -> Result<(), EncodeError> {
        self.start(REQUEST_ELEMENT, &[])?;
        self.entities(&request.entities)?;
        self.empty(
            "Limits",
            &[
                ("HardLimit", &request.limits.hard_limit),
                ("SoftLimit", &request.limits.soft_limit),
            ],
        )?;
        self.start("TransformFields", &[])?;
        for field in &request.transform_fields {
            self.text_element("Field", &[("Name", &field.name)], &field.text)?;
        }
        self.end("TransformFields")?;
        self.end(REQUEST_ELEMENT)
    }

    fn response(&mut self, response: &ResponseMessage) -> Result<(), EncodeError> {
        self.start(RESPONSE_ELEMENT, &[])?;
        self.entities(&response.entities)?;
        self.start("UIMessages", &[])?;
        for message in &response.ui_messages {
            self.text_element(
                "UIMessage",
                &[("MessageType", message.message_type.as_str())],
                &message.text,
            )?;
        }
        self.end("UIMessages")?;
        self.end(RESPONSE_ELEMENT)
    }

    fn exception(&mut self, exception: &ExceptionMessage) -> Result<(), EncodeError> {
        self.start(EXCEPTION_ELEMENT, &[])?;
        self.start("Exceptions", &[])?;
        for e in &exception.exceptions {
            self.text_element("Exception", &[("code", &e.code)], &e.text)?;
        }
        self.end("Exceptions")?;
        self.end(EXCEPTION_ELEMENT)
    }

    fn entities(&mut self, entities: &[Entity]) -> Result<(), EncodeError> {
        self.start("Entities", &[])?;
        for entity in entities {
            self.entity(entity)?;
        }
        self.end("Entities")
    }

    fn entity(&mut self, entity: &Entity) -> Result<(), EncodeError> {
        self.start("Entity", &[("Type", &entity.entity_type)])?;

        if let Some(genealogy) = &entity.genealogy {
            self.start("Genealogy", &[])?;
            self.empty(
                "Type",
                &[
                    ("Name", &genealogy.type_name),
                    ("OldName", &genealogy.old_type_name),
                ],
            )?;
            self.end("Genealogy")?;
        }

        self.text_element("Value", &[], &entity.value)?;
        self.text_element("Weight", &[], &entity.weight)?;

        if let Some(labels) = &entity.display_information {
            self.start("DisplayInformation", &[])?;
            for label in labels {
                self.label(label)?;
            }
            self.end("DisplayInformation")?;
        }

        if let Some(icon_url) = entity.icon_url.as_deref().filter(|u| !u.is_empty()) {
            self.text_element("IconURL", &[], icon_url)?;
        }

        if let Some(fields) = &entity.fields {
            self.start("AdditionalFields", &[])?;
            for field in fields {
                self.field(field)?;
            }
            self.end("AdditionalFields")?;
        }

        self.end("Entity")
    }

    fn field(&mut self, field: &Field) -> Result<(), EncodeError> {
        let rule = field.matching_rule.as_ref().map_or("", |r| r.as_str());
        self.text_element(
            "Field",
            &[
                ("MatchingRule", rule),
                ("Name", &field.name),
                ("DisplayName", &field.display_name),
            ],
            &field.text,
        )
    }

    fn label(&mut self, label: &DisplayLabel) -> Result<(), EncodeError> {
        self.start("Label", &[("Name", &label.name), ("Type", &label.kind)])?;
        self.cdata(&label.text)?;
        self.end("Label")
    }

    // --- primitives ----------------------------------------------------------

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), EncodeError> {
        let mut start = BytesStart::new(name);
        for (key, value) in attrs {
            // Pushed pre-escaped so the client's entity forms are used.
            start.push_attribute(Attribute {
                key: QName(key.as_bytes()),
                value: Cow::Owned(xml_escape(value).into_bytes()),
            });
        }
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), EncodeError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// `<name attrs></name>`, never `<name/>`.
    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), EncodeError> {
        self.start(name, attrs)?;
        self.end(name)
    }

    fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), EncodeError> {
        self.start(name, attrs)?;
        if !text.is_empty() {
            self.writer
                .write_event(Event::Text(BytesText::from_escaped(xml_escape(text))))?;
        }
        self.end(name)
    }

    /// Write `text` as CDATA. A `]]>` inside the text closes the section
    /// after `]]` and reopens it before `>`. Empty text writes nothing.
    fn cdata(&mut self, text: &str) -> Result<(), EncodeError> {
        if text.is_empty() {
            return Ok(());
        }
        let parts: Vec<&str> = text.split("]]>").collect();
        let last = parts.len() - 1;
        for (i, part) in parts.iter().enumerate() {
            let mut section = String::with_capacity(part.len() + 3);
            if i > 0 {
                section.push('>');
            }
            section.push_str(part);
            if i < last {
                section.push_str("]]");
            }
            self.writer
                .write_event(Event::CData(BytesCData::new(section)))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a message from wire bytes.
///
/// Only the root element name is checked. Which payload is populated depends
/// on which payload element is present; when none is, `payload` is `None`.
pub fn decode(bytes: &[u8]) -> Result<MaltegoMessage, DecodeError> {
    let mut decoder = Decoder::new(bytes);
    decoder.message()
}

/// Decode a message from a string.
pub fn decode_str(xml: &str) -> Result<MaltegoMessage, DecodeError> {
    decode(xml.as_bytes())
}

struct Decoder<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Decoder<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        let mut reader = Reader::from_reader(bytes);
        reader.expand_empty_elements(true);
        Self { reader }
    }

    fn message(&mut self) -> Result<MaltegoMessage, DecodeError> {
        let root = loop {
            match self.reader.read_event()? {
                Event::Start(e) => break e,
                Event::Eof => return Err(DecodeError::MissingRoot),
                _ => {}
            }
        };
        if root.name().as_ref() != ROOT_ELEMENT.as_bytes() {
            return Err(DecodeError::UnexpectedRoot(
                String::from_utf8_lossy(root.name().as_ref()).into_owned(),
            ));
        }

        let mut message = MaltegoMessage::default();
        self.children(|d, e| {
            match e.name().as_ref() {
                b"MaltegoTransformRequestMessage" => {
                    message.payload = Some(Payload::Request(d.request()?))
                }
                b"MaltegoTransformResponseMessage" => {
                    message.payload = Some(Payload::Response(d.response()?))
                }
                b"MaltegoTransformExceptionMessage" => {
                    message.payload = Some(Payload::Exception(d.exception()?))
                }
                _ => d.skip(&e)?,
            }
            Ok(())
        })?;
        Ok(message)
    }

    fn request(&mut self) -> Result<RequestMessage, DecodeError> {
        let mut request = RequestMessage::default();
        self.children(|d, e| {
            match e.name().as_ref() {
                b"Entities" => request.entities = d.entities()?,
                b"Limits" => {
                    request.limits = Limits {
                        soft_limit: attr(&e, b"SoftLimit")?.unwrap_or_default(),
                        hard_limit: attr(&e, b"HardLimit")?.unwrap_or_default(),
                    };
                    d.skip(&e)?;
                }
                b"TransformFields" => {
                    let mut fields = Vec::new();
                    d.children(|d, e| {
                        if e.name().as_ref() == b"Field" {
                            fields.push(TransformField {
                                name: attr(&e, b"Name")?.unwrap_or_default(),
                                text: d.text()?,
                            });
                        } else {
                            d.skip(&e)?;
                        }
                        Ok(())
                    })?;
                    request.transform_fields = fields;
                }
                _ => d.skip(&e)?,
            }
            Ok(())
        })?;
        Ok(request)
    }

    fn response(&mut self) -> Result<ResponseMessage, DecodeError> {
        let mut response = ResponseMessage::default();
        self.children(|d, e| {
            match e.name().as_ref() {
                b"Entities" => response.entities = d.entities()?,
                b"UIMessages" => {
                    let mut messages = Vec::new();
                    d.children(|d, e| {
                        if e.name().as_ref() == b"UIMessage" {
                            let kind = attr(&e, b"MessageType")?.unwrap_or_default();
                            let message_type = UiMessageType::from_wire(&kind);
                            messages.push(UiMessage {
                                text: d.text()?,
                                message_type,
                            });
                        } else {
                            d.skip(&e)?;
                        }
                        Ok(())
                    })?;
                    response.ui_messages = messages;
                }
                _ => d.skip(&e)?,
            }
            Ok(())
        })?;
        Ok(response)
    }

    fn exception(&mut self) -> Result<ExceptionMessage, DecodeError> {
        let mut exceptions = Vec::new();
        self.children(|d, e| {
            if e.name().as_ref() == b"Exceptions" {
                d.children(|d, e| {
                    if e.name().as_ref() == b"Exception" {
                        exceptions.push(Exception {
                            code: attr(&e, b"code")?.unwrap_or_default(),
                            text: d.text()?,
                        });
                    } else {
                        d.skip(&e)?;
                    }
                    Ok(())
                })?;
            } else {
                d.skip(&e)?;
            }
            Ok(())
        })?;
        Ok(ExceptionMessage { exceptions })
    }

    fn entities(&mut self) -> Result<Vec<Entity>, DecodeError> {
        let mut entities = Vec::new();
        self.children(|d, e| {
            if e.name().as_ref() == b"Entity" {
                entities.push(d.entity(&e)?);
            } else {
                d.skip(&e)?;
            }
            Ok(())
        })?;
        Ok(entities)
    }

    fn entity(&mut self, start: &BytesStart<'_>) -> Result<Entity, DecodeError> {
        let mut entity = Entity {
            entity_type: attr(start, b"Type")?.unwrap_or_default(),
            ..Entity::default()
        };
        self.children(|d, e| {
            match e.name().as_ref() {
                b"Genealogy" => entity.genealogy = Some(d.genealogy()?),
                b"Value" => entity.value = d.text()?,
                b"Weight" => entity.weight = d.text()?,
                b"DisplayInformation" => entity.display_information = Some(d.labels()?),
                b"IconURL" => entity.icon_url = Some(d.text()?),
                b"AdditionalFields" => entity.fields = Some(d.fields()?),
                _ => d.skip(&e)?,
            }
            Ok(())
        })?;
        Ok(entity)
    }

    fn genealogy(&mut self) -> Result<Genealogy, DecodeError> {
        let mut genealogy = Genealogy::default();
        self.children(|d, e| {
            if e.name().as_ref() == b"Type" {
                genealogy = Genealogy {
                    type_name: attr(&e, b"Name")?.unwrap_or_default(),
                    old_type_name: attr(&e, b"OldName")?.unwrap_or_default(),
                };
            }
            d.skip(&e)
        })?;
        Ok(genealogy)
    }

    fn labels(&mut self) -> Result<Vec<DisplayLabel>, DecodeError> {
        let mut labels = Vec::new();
        self.children(|d, e| {
            if e.name().as_ref() == b"Label" {
                labels.push(DisplayLabel {
                    name: attr(&e, b"Name")?.unwrap_or_default(),
                    kind: attr(&e, b"Type")?.unwrap_or_default(),
                    text: d.text()?,
                });
            } else {
                d.skip(&e)?;
            }
            Ok(())
        })?;
        Ok(labels)
    }

    fn fields(&mut self) -> Result<Vec<Field>, DecodeError> {
        let mut fields = Vec::new();
        self.children(|d, e| {
            if e.name().as_ref() == b"Field" {
                fields.push(Field {
                    name: attr(&e, b"Name")?.unwrap_or_default(),
                    display_name: attr(&e, b"DisplayName")?.unwrap_or_default(),
                    matching_rule: attr(&e, b"MatchingRule")?
                        .filter(|r| !r.is_empty())
                        .map(|r| MatchingRule::from_wire(&r)),
                    text: d.text()?,
                });
            } else {
                d.skip(&e)?;
            }
            Ok(())
        })?;
        Ok(fields)
    }

    // --- primitives ----------------------------------------------------------

    /// Visit each child element of the element just opened, up to and
    /// including its end tag. `visit` must consume the child it is given.
    fn children<F>(&mut self, mut visit: F) -> Result<(), DecodeError>
    where
        F: FnMut(&mut Self, BytesStart<'a>) -> Result<(), DecodeError>,
    {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => visit(self, e)?,
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(DecodeError::UnexpectedEof),
                _ => {}
            }
        }
    }

    /// Consume the element opened by `start`, including all of its content.
    fn skip(&mut self, start: &BytesStart<'_>) -> Result<(), DecodeError> {
        self.reader.read_to_end(start.name())?;
        Ok(())
    }

    /// Character data of the element just opened. Nested elements are
    /// skipped.
    fn text(&mut self) -> Result<String, DecodeError> {
        let mut out = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => out.push_str(&t.unescape()?),
                Event::CData(c) => out.push_str(std::str::from_utf8(&c)?),
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(out),
                Event::Eof => return Err(DecodeError::UnexpectedEof),
                _ => {}
            }
        }
    }
}

/// Unescaped value of attribute `name`, if present.
fn attr(start: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, DecodeError> {
    for attribute in start.attributes() {
        let attribute = attribute?;
        if attribute.key.as_ref() == name {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
