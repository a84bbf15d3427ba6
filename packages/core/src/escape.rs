//! XML text escaping as the Maltego client expects it.
//!
//! Two layers share one character table:
//!
//! - [`xml_escape`] is what the encoder applies to every attribute value and
//!   every piece of character data it writes.
//! - [`escape`] is what the model helpers apply to user-supplied values before
//!   storing them: the same table, followed by a pass that turns the line-feed
//!   entity back into a literal newline so multi-line values display as such.

const NEWLINE_ENTITY: &str = "&#xA;";

/// Escape `text` for embedding as XML character data or an attribute value.
///
/// The table matches the client's reference encoder byte for byte:
///
/// | Input | Output |
/// |-------|--------|
/// | `"` | `&#34;` |
/// | `'` | `&#39;` |
/// | `&` | `&amp;` |
/// | `<` | `&lt;` |
/// | `>` | `&gt;` |
/// | tab | `&#x9;` |
/// | LF | `&#xA;` |
/// | CR | `&#xD;` |
///
/// Characters outside the XML 1.0 character range become U+FFFD.
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str(NEWLINE_ENTITY),
            '\r' => out.push_str("&#xD;"),
            c if is_xml_char(c) => out.push(c),
            _ => out.push('\u{FFFD}'),
        }
    }
    out
}

/// Escape `text` for storage in the model, keeping newlines literal.
///
/// Runs [`xml_escape`] first and then replaces every `&#xA;` with `'\n'`.
/// The order is fixed: the newline pass always runs last.
///
/// ```rust
/// assert_eq!(maltego::escape("\n"), "\n");
/// assert_eq!(maltego::escape("a & b"), "a &amp; b");
/// ```
pub fn escape(text: &str) -> String {
    xml_escape(text).replace(NEWLINE_ENTITY, "\n")
}

/// Like [`escape`], for raw bytes of unknown encoding.
///
/// Invalid UTF-8 is not an error: it is logged and each bad sequence is
/// replaced with U+FFFD before escaping.
pub fn escape_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => escape(text),
        Err(e) => {
            tracing::warn!("escaping text that is not valid UTF-8: {e}");
            escape(&String::from_utf8_lossy(bytes))
        }
    }
}

// XML 1.0 `Char` production, minus the three whitespace controls handled above.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_becomes_literal() {
        assert_eq!(escape("\n"), "\n");
        assert_eq!(escape("line one\nline two"), "line one\nline two");
    }

    #[test]
    fn wire_escaping_keeps_newline_entity() {
        assert_eq!(xml_escape("a\nb"), "a&#xA;b");
    }

    #[test]
    fn special_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&#34;x&#34;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn tab_and_carriage_return_stay_escaped() {
        assert_eq!(escape("a\tb\r\n"), "a&#x9;b&#xD;\n");
    }

    #[test]
    fn literal_entity_text_is_not_unescaped() {
        // The ampersand is escaped first, so the newline pass cannot match.
        assert_eq!(escape("&#xA;"), "&amp;#xA;");
    }

    #[test]
    fn control_characters_are_replaced() {
        assert_eq!(escape("a\u{1}b"), "a\u{FFFD}b");
    }

    #[test]
    fn invalid_utf8_is_escaped_lossily() {
        assert_eq!(escape_bytes(b"ok"), "ok");
        assert_eq!(escape_bytes(&[b'a', 0xff, b'&']), "a\u{FFFD}&amp;");
    }

    #[test]
    fn unicode_passes_through() {
        assert_eq!(escape("pãypal.com"), "pãypal.com");
    }
}
