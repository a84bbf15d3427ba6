//! Human-readable text summaries of [`MaltegoMessage`]s.
//!
//! The output is stable plain text for terminals and logs. It is not a wire
//! format; only the XML produced by [`crate::codec`] is understood by the
//! client.

use crate::entity::Entity;
use crate::message::{ExceptionMessage, MaltegoMessage, Payload, RequestMessage, ResponseMessage};

/// Render a decoded envelope.
///
/// ```text
/// Request  1 entity
/// ─────────────────
///
/// [maltego.DNSName] "alpine.paterva.com"  weight: 0
///   fqdn (DNS Name) = alpine.paterva.com
///
/// Limits: soft 256  hard 256
/// ```
pub fn render_message(message: &MaltegoMessage) -> String {
    match &message.payload {
        Some(Payload::Request(request)) => render_request(request),
        Some(Payload::Response(response)) => render_response(response),
        Some(Payload::Exception(exception)) => render_exception(exception),
        None => "Empty message\n".to_string(),
    }
}

fn render_request(request: &RequestMessage) -> String {
    let mut out = header("Request", count(request.entities.len(), "entity", "entities"));
    render_entities(&mut out, &request.entities);

    out.push('\n');
    out.push_str(&format!(
        "Limits: soft {}  hard {}\n",
        or_dash(&request.limits.soft_limit),
        or_dash(&request.limits.hard_limit)
    ));

    if !request.transform_fields.is_empty() {
        out.push('\n');
        out.push_str("Transform fields:\n");
        for f in &request.transform_fields {
            out.push_str(&format!("  {} = {}\n", f.name, f.text));
        }
    }
    out
}

fn render_response(response: &ResponseMessage) -> String {
    let mut out = header(
        "Response",
        format!(
            "{}, {}",
            count(response.entities.len(), "entity", "entities"),
            count(response.ui_messages.len(), "message", "messages")
        ),
    );
    render_entities(&mut out, &response.entities);

    if !response.ui_messages.is_empty() {
        out.push('\n');
        out.push_str("Messages:\n");
        for m in &response.ui_messages {
            out.push_str(&format!("  {:<12} {}\n", m.message_type.as_str(), m.text));
        }
    }
    out
}

fn render_exception(exception: &ExceptionMessage) -> String {
    let mut out = header(
        "Exception",
        count(exception.exceptions.len(), "exception", "exceptions"),
    );
    if !exception.exceptions.is_empty() {
        out.push('\n');
        for e in &exception.exceptions {
            out.push_str(&format!("  [{}] {}\n", or_dash(&e.code), e.text));
        }
    }
    out
}

/// One block per entity: a header line, then fields, labels and icon.
pub fn render_entity(entity: &Entity) -> String {
    let mut out = format!(
        "[{}] \"{}\"  weight: {}\n",
        entity.entity_type,
        entity.value,
        or_dash(&entity.weight)
    );

    if let Some(g) = &entity.genealogy {
        out.push_str(&format!("  genealogy: {} (was {})\n", g.type_name, g.old_type_name));
    }
    for f in entity.fields.iter().flatten() {
        let rule = f.matching_rule.as_ref().map(|r| format!("  [{r}]")).unwrap_or_default();
        out.push_str(&format!("  {} ({}) = {}{}\n", f.name, f.display_name, f.text, rule));
    }
    for l in entity.display_information.iter().flatten() {
        out.push_str(&format!("  label {}: {}\n", l.name, truncate(&l.text, 60)));
    }
    if let Some(icon) = entity.icon_url.as_deref().filter(|u| !u.is_empty()) {
        out.push_str(&format!("  icon: {icon}\n"));
    }
    out
}

// --- helpers -----------------------------------------------------------------

fn header(kind: &str, detail: String) -> String {
    let line = format!("{kind}  {detail}");
    let rule = "─".repeat(line.chars().count());
    format!("{line}\n{rule}\n")
}

fn render_entities(out: &mut String, entities: &[Entity]) {
    for e in entities {
        out.push('\n');
        out.push_str(&render_entity(e));
    }
}

fn count(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

fn truncate(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max - 1).collect();
    format!("{cut}…")
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_str;
    use crate::message::{Exception, UiMessage};
    use crate::types::{MatchingRule, UiMessageType};

    #[test]
    fn request_summary_lists_entity_and_limits() {
        let msg = decode_str(
            r#"<MaltegoMessage><MaltegoTransformRequestMessage><Entities><Entity Type="maltego.DNSName"><AdditionalFields><Field Name="fqdn" DisplayName="DNS Name">alpine.paterva.com</Field></AdditionalFields><Value>alpine.paterva.com</Value><Weight>0</Weight></Entity></Entities><Limits SoftLimit="256" HardLimit="256"/></MaltegoTransformRequestMessage></MaltegoMessage>"#,
        )
        .unwrap();
        let text = render_message(&msg);
        assert!(text.starts_with("Request  1 entity\n"));
        assert!(text.contains("[maltego.DNSName] \"alpine.paterva.com\"  weight: 0"));
        assert!(text.contains("  fqdn (DNS Name) = alpine.paterva.com\n"));
        assert!(text.contains("Limits: soft 256  hard 256"));
    }

    #[test]
    fn response_summary_lists_messages() {
        let mut entity = Entity::new("maltego.IPv4Address", "10.0.0.1", "100");
        entity.add_property("ttl", "TTL", MatchingRule::Loose, "60");
        let msg = MaltegoMessage::response(ResponseMessage {
            entities: vec![entity],
            ui_messages: vec![UiMessage {
                text: "complete".into(),
                message_type: UiMessageType::Inform,
            }],
        });
        let text = render_message(&msg);
        assert!(text.starts_with("Response  1 entity, 1 message\n"));
        assert!(text.contains("ttl (TTL) = 60  [loose]"));
        assert!(text.contains("Inform       complete"));
    }

    #[test]
    fn exception_summary() {
        let msg = MaltegoMessage::exception(ExceptionMessage {
            exceptions: vec![Exception {
                text: "rate limited".into(),
                code: "429".into(),
            }],
        });
        assert!(render_message(&msg).contains("[429] rate limited"));
    }

    #[test]
    fn empty_message() {
        assert_eq!(render_message(&MaltegoMessage::default()), "Empty message\n");
    }

    #[test]
    fn long_labels_are_truncated() {
        let mut entity = Entity::new("t", "v", "");
        entity.add_display_information(&"x".repeat(100), "Body");
        let text = render_entity(&entity);
        assert!(text.contains("weight: -"));
        assert!(text.contains(&format!("label Body: {}…", "x".repeat(59))));
    }
}
