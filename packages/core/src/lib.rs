//! Data structures for exchanging transform messages with the Maltego
//! link-analysis client.
//!
//! The client sends a request envelope carrying one input entity and expects
//! a response envelope (entities plus UI messages) or an exception envelope
//! in return. This crate models those envelopes and encodes them exactly the
//! way the client's fixed XML schema expects. It is the foundation for the
//! `maltego-server` transform server and the `mtg` CLI.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`escape`] | XML text escaping for values and the wire |
//! | [`types`] | Closed vocabularies: [`MatchingRule`], [`UiMessageType`], link styles, entity type names |
//! | [`entity`] | [`Entity`] and its fields, labels and link setters |
//! | [`message`] | The [`MaltegoMessage`] envelope and its payloads |
//! | [`codec`] | Byte-exact XML [`encode`] / [`decode`] |
//! | [`transform`] | The per-request [`Transform`] builder |
//! | [`local`] | Argument parsing and process helpers for local transforms |
//! | [`thickness`] | Link thickness from a count |
//! | [`summary`] | Human-readable text rendering of envelopes |
//!
//! # Quick start
//!
//! ```rust
//! use maltego::{entity_types, LinkStyle, Transform, UiMessageType};
//!
//! let request = br#"<MaltegoMessage><MaltegoTransformRequestMessage>
//!   <Entities><Entity Type="maltego.DNSName"><Value>example.com</Value><Weight>0</Weight></Entity></Entities>
//!   <Limits SoftLimit="12" HardLimit="255"/>
//! </MaltegoTransformRequestMessage></MaltegoMessage>"#;
//!
//! let mut t = Transform::from_request(request).unwrap();
//! let host = t.input_entity().unwrap().value.clone();
//!
//! let ip = t.add_entity(entity_types::IPV4_ADDRESS, "93.184.216.34");
//! ip.set_link_label("resolves");
//! ip.set_link_style(LinkStyle::Dashed);
//! t.add_ui_message(&format!("resolved {host}"), UiMessageType::Inform);
//!
//! let xml = t.render();
//! assert!(xml.starts_with("<MaltegoMessage><MaltegoTransformResponseMessage>"));
//! ```

pub mod codec;
pub mod entity;
pub mod escape;
pub mod local;
pub mod message;
pub mod summary;
pub mod thickness;
pub mod transform;
pub mod types;

pub use codec::{decode, decode_str, encode, DecodeError, EncodeError};
pub use entity::{DisplayLabel, Entity, Field, Genealogy, LABEL_TYPE_HTML};
pub use escape::{escape, escape_bytes, xml_escape};
pub use local::{die, print_progress, LocalArgsError, LocalTransform};
pub use message::{
    Exception, ExceptionMessage, Limits, MaltegoMessage, Payload, RequestMessage,
    ResponseMessage, TransformField, UiMessage,
};
pub use thickness::{thickness, thickness_interval};
pub use transform::{Transform, TransformError};
pub use types::{
    entity_types, properties, BookmarkColor, LinkDirection, LinkStyle, MatchingRule,
    UiMessageType,
};
