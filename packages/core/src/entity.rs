//! Graph nodes exchanged with the client.
//!
//! An [`Entity`] carries a type, a value and a weight, plus optional
//! genealogy, display labels, an icon URL and additional fields. Property
//! helpers ([`Entity::add_property`], [`Entity::set_link_color`], …) escape
//! their values before storing them; direct field assignment does not.

use serde::{Deserialize, Serialize};

use crate::escape::escape;
use crate::types::{properties, BookmarkColor, LinkDirection, LinkStyle, MatchingRule};

/// Label kind the client renders in its detail view.
pub const LABEL_TYPE_HTML: &str = "text/html";

/// A single node of the client's graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    /// Entity type, e.g. `maltego.DNSName`. Encoded as the `Type` attribute.
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Type lineage, sent by the client on inbound entities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genealogy: Option<Genealogy>,

    pub value: String,

    /// Numeric weight as text. Kept verbatim so it re-encodes unchanged.
    pub weight: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_information: Option<Vec<DisplayLabel>>,

    /// Not rendered when absent or empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
}

/// `Genealogy/Type[@Name,@OldName]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genealogy {
    pub type_name: String,
    pub old_type_name: String,
}

/// A labelled HTML fragment shown in the client's detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayLabel {
    /// Emitted as CDATA, so HTML markup survives unescaped.
    pub text: String,
    pub name: String,
    /// Always [`LABEL_TYPE_HTML`] for labels built through this crate.
    pub kind: String,
}

impl DisplayLabel {
    pub fn new(text: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            name: name.into(),
            kind: LABEL_TYPE_HTML.into(),
        }
    }
}

/// An additional field of an entity, `AdditionalFields/Field`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub display_name: String,
    /// `None` for inbound fields sent without a `MatchingRule` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_rule: Option<MatchingRule>,
    pub text: String,
}

impl Entity {
    /// Create an entity. `value` is stored as given; escaping it is the
    /// caller's job.
    pub fn new(
        entity_type: impl Into<String>,
        value: impl Into<String>,
        weight: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            value: value.into(),
            weight: weight.into(),
            ..Self::default()
        }
    }

    /// Append a field, escaping `value`. Existing fields with the same name
    /// are kept.
    pub fn add_property(
        &mut self,
        name: &str,
        display_name: &str,
        matching_rule: MatchingRule,
        value: &str,
    ) {
        self.fields.get_or_insert_with(Vec::new).push(Field {
            name: name.to_string(),
            display_name: display_name.to_string(),
            matching_rule: Some(matching_rule),
            text: escape(value),
        });
    }

    /// Shorthand for a strict [`add_property`](Self::add_property) whose
    /// display name is `name` in title case (`"open ports"` → `"Open Ports"`).
    pub fn add_prop(&mut self, name: &str, value: &str) {
        self.add_property(name, &title_case(name), MatchingRule::Strict, value);
    }

    /// Text of the first field called `name`.
    ///
    /// Returns `""` when no such field exists, including when the entity has
    /// no field list at all.
    pub fn field_by_name(&self, name: &str) -> &str {
        self.fields
            .iter()
            .flatten()
            .find(|f| f.name == name)
            .map(|f| f.text.as_str())
            .unwrap_or("")
    }

    /// Append an HTML display label.
    pub fn add_display_information(&mut self, text: &str, name: &str) {
        self.display_information
            .get_or_insert_with(Vec::new)
            .push(DisplayLabel::new(text, name));
    }

    /// Link colour as a hex string such as `#ff0000`.
    pub fn set_link_color(&mut self, color: &str) {
        self.add_property(properties::LINK_COLOR, "LinkColor", MatchingRule::Loose, color);
    }

    pub fn set_link_style(&mut self, style: LinkStyle) {
        self.add_property(
            properties::LINK_STYLE,
            "LinkStyle",
            MatchingRule::Loose,
            style.as_str(),
        );
    }

    /// Stroke width, usually 1..=5 (see [`crate::thickness`]).
    pub fn set_link_thickness(&mut self, thickness: u32) {
        self.add_property(
            properties::LINK_THICKNESS,
            "LinkThickness",
            MatchingRule::Loose,
            &thickness.to_string(),
        );
    }

    pub fn set_link_label(&mut self, label: &str) {
        self.add_property(properties::LINK_LABEL, "Label", MatchingRule::Loose, label);
    }

    pub fn set_bookmark(&mut self, color: BookmarkColor) {
        self.add_property(
            properties::BOOKMARK,
            "Bookmark",
            MatchingRule::Loose,
            color.as_str(),
        );
    }

    pub fn set_note(&mut self, note: &str) {
        self.add_property(properties::NOTES, "Notes", MatchingRule::Loose, note);
    }

    pub fn set_link_direction(&mut self, direction: LinkDirection) {
        self.add_property(
            properties::LINK_DIRECTION,
            "Direction",
            MatchingRule::Loose,
            direction.as_str(),
        );
    }
}

/// Upper-case the first letter of every word.
///
/// Letters, digits and `_` continue a word; anything else (spaces, dots,
/// dashes, …) starts a new one.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = is_word_separator(c);
    }
    out
}

fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        return !(c.is_ascii_alphanumeric() || c == '_');
    }
    if c.is_alphanumeric() {
        return false;
    }
    c.is_whitespace()
}
