//! Closed vocabularies of the transform protocol.
//!
//! Each enum here has a fixed wire string, returned by `as_str()` and used
//! verbatim by the encoder. `FromStr` accepts exactly those strings.

use serde::{Deserialize, Serialize};

/// How the client merges a field when two entities collide.
///
/// Serialises as `"strict"` or `"loose"`. Any other wire text is kept
/// verbatim in [`MatchingRule::Other`] so a decoded field re-encodes as it
/// arrived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchingRule {
    /// The field must be equal for two entities to be merged.
    Strict,
    /// The field is ignored when deciding whether to merge.
    Loose,
    #[serde(untagged)]
    Other(String),
}

impl MatchingRule {
    pub fn as_str(&self) -> &str {
        match self {
            MatchingRule::Strict => "strict",
            MatchingRule::Loose => "loose",
            MatchingRule::Other(s) => s,
        }
    }

    /// The rule named by `s`, keeping unknown text as [`MatchingRule::Other`].
    pub fn from_wire(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| MatchingRule::Other(s.to_string()))
    }
}

impl std::fmt::Display for MatchingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MatchingRule {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(MatchingRule::Strict),
            "loose" => Ok(MatchingRule::Loose),
            _ => Err(format!(
                "unknown matching rule {:?}; expected one of: strict, loose",
                s
            )),
        }
    }
}

/// Severity of a message shown in the client's output pane.
///
/// Decoding keeps unrecognised severities in [`UiMessageType::Other`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UiMessageType {
    FatalError,
    PartialError,
    Inform,
    Debug,
    #[serde(untagged)]
    Other(String),
}

impl UiMessageType {
    pub fn as_str(&self) -> &str {
        match self {
            UiMessageType::FatalError => "FatalError",
            UiMessageType::PartialError => "PartialError",
            UiMessageType::Inform => "Inform",
            UiMessageType::Debug => "Debug",
            UiMessageType::Other(s) => s,
        }
    }

    /// The severity named by `s`, keeping unknown text as
    /// [`UiMessageType::Other`].
    pub fn from_wire(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| UiMessageType::Other(s.to_string()))
    }
}

impl std::fmt::Display for UiMessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UiMessageType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FatalError" => Ok(UiMessageType::FatalError),
            "PartialError" => Ok(UiMessageType::PartialError),
            "Inform" => Ok(UiMessageType::Inform),
            "Debug" => Ok(UiMessageType::Debug),
            _ => Err(format!(
                "unknown UI message type {:?}; expected one of: \
                 FatalError, PartialError, Inform, Debug",
                s
            )),
        }
    }
}

/// Bookmark colour codes. The wire form is the numeric code as text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookmarkColor {
    None,
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
}

impl BookmarkColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookmarkColor::None => "-1",
            BookmarkColor::Blue => "0",
            BookmarkColor::Green => "1",
            BookmarkColor::Yellow => "2",
            BookmarkColor::Orange => "3",
            BookmarkColor::Red => "4",
        }
    }
}

impl std::fmt::Display for BookmarkColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookmarkColor {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-1" => Ok(BookmarkColor::None),
            "0" => Ok(BookmarkColor::Blue),
            "1" => Ok(BookmarkColor::Green),
            "2" => Ok(BookmarkColor::Yellow),
            "3" => Ok(BookmarkColor::Orange),
            "4" => Ok(BookmarkColor::Red),
            _ => Err(format!("unknown bookmark colour code {:?}; expected -1..4", s)),
        }
    }
}

/// Stroke style of the link drawn to an entity. The wire form is the numeric
/// code as text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkStyle {
    Normal,
    Dashed,
    Dotted,
    DashDot,
}

impl LinkStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStyle::Normal => "0",
            LinkStyle::Dashed => "1",
            LinkStyle::Dotted => "2",
            LinkStyle::DashDot => "3",
        }
    }
}

impl std::fmt::Display for LinkStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LinkStyle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(LinkStyle::Normal),
            "1" => Ok(LinkStyle::Dashed),
            "2" => Ok(LinkStyle::Dotted),
            "3" => Ok(LinkStyle::DashDot),
            _ => Err(format!("unknown link style code {:?}; expected 0..3", s)),
        }
    }
}

/// Direction of the link between the input entity and a returned entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LinkDirection {
    OutputToInput,
    InputToOutput,
    Bidirectional,
}

impl LinkDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkDirection::OutputToInput => "output-to-input",
            LinkDirection::InputToOutput => "input-to-output",
            LinkDirection::Bidirectional => "bidirectional",
        }
    }
}

impl std::fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LinkDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "output-to-input" => Ok(LinkDirection::OutputToInput),
            "input-to-output" => Ok(LinkDirection::InputToOutput),
            "bidirectional" => Ok(LinkDirection::Bidirectional),
            _ => Err(format!(
                "unknown link direction {:?}; expected one of: \
                 output-to-input, input-to-output, bidirectional",
                s
            )),
        }
    }
}

/// Field names the client interprets as link and annotation properties.
pub mod properties {
    pub const LINK_COLOR: &str = "link#maltego.link.color";
    pub const LINK_STYLE: &str = "link#maltego.link.style";
    pub const LINK_THICKNESS: &str = "link#maltego.link.thickness";
    pub const LINK_LABEL: &str = "link#maltego.link.label";
    pub const LINK_DIRECTION: &str = "link#maltego.link.direction";
    pub const BOOKMARK: &str = "bookmark#";
    pub const NOTES: &str = "notes#";
}

/// Built-in entity types, all under the `maltego.` namespace.
pub mod entity_types {
    pub const AS: &str = "maltego.AS";
    pub const AFFILIATION: &str = "maltego.Affiliation";
    pub const ALIAS: &str = "maltego.Alias";
    pub const BANNER: &str = "maltego.Banner";
    pub const BUILT_WITH_RELATIONSHIP: &str = "maltego.BuiltWithRelationship";
    pub const BUILT_WITH_TECHNOLOGY: &str = "maltego.BuiltWithTechnology";
    pub const CIRCULAR_AREA: &str = "maltego.CircularArea";
    pub const COMPANY: &str = "maltego.Company";
    pub const DNS_NAME: &str = "maltego.DNSName";
    pub const DATE_TIME: &str = "maltego.DateTime";
    pub const DEVICE: &str = "maltego.Device";
    pub const DOCUMENT: &str = "maltego.Document";
    pub const DOMAIN: &str = "maltego.Domain";
    pub const EMAIL_ADDRESS: &str = "maltego.EmailAddress";
    pub const FILE: &str = "maltego.File";
    pub const GPS: &str = "maltego.GPS";
    pub const HASH: &str = "maltego.Hash";
    pub const IPV4_ADDRESS: &str = "maltego.IPv4Address";
    pub const IMAGE: &str = "maltego.Image";
    pub const LOCATION: &str = "maltego.Location";
    pub const MX_RECORD: &str = "maltego.MXRecord";
    pub const NS_RECORD: &str = "maltego.NSRecord";
    pub const NETBLOCK: &str = "maltego.Netblock";
    pub const ORGANIZATION: &str = "maltego.Organization";
    pub const PERSON: &str = "maltego.Person";
    pub const PHONE_NUMBER: &str = "maltego.PhoneNumber";
    pub const PHRASE: &str = "maltego.Phrase";
    pub const PORT: &str = "maltego.Port";
    pub const SENTIMENT: &str = "maltego.Sentiment";
    pub const SERVICE: &str = "maltego.Service";
    pub const TWIT: &str = "maltego.Twit";
    pub const URL: &str = "maltego.URL";
    pub const UNIQUE_IDENTIFIER: &str = "maltego.UniqueIdentifier";
    pub const WEB_TITLE: &str = "maltego.WebTitle";
    pub const WEBSITE: &str = "maltego.Website";
}
