//! Conversion between user turns and the wire format.
//!
//! A user turn is free text plus zero or more images, each held as a
//! `data:<mime>;base64,<data>` URL.  [`encode`] turns that into a [`Payload`];
//! [`decode`] pulls the reply text back out of a response.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::types::{Blob, Content, GenerateContentResponse, Part};

/// Substituted when a reply carries no text.
pub const FALLBACK_REPLY: &str =
    "Maaf, saya sedang melakukan analisis mendalam namun tidak dapat memberikan respons saat ini.";

static DATA_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:(.+);base64,(.+)$").expect("data URL pattern is valid"));

/// What gets sent to the model for one user turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Plain text, used when nothing is attached.
    Text(String),
    /// Inline-data parts in attachment order, followed by one text part.
    Parts(Vec<Part>),
}

impl Payload {
    /// Number of inline-data parts carried by the payload.
    pub fn inline_count(&self) -> usize {
        match self {
            Payload::Text(_) => 0,
            Payload::Parts(parts) => parts.iter().filter(|p| p.is_inline_data()).count(),
        }
    }

    /// Converts the payload into user content for a request.
    pub fn into_content(self) -> Content {
        match self {
            Payload::Text(text) => Content::user(vec![Part::text(text)]),
            Payload::Parts(parts) => Content::user(parts),
        }
    }
}

/// Builds the payload for `text` and the attached `images`.
///
/// Images that are not well-formed base64 data URLs are skipped.
pub fn encode<S: AsRef<str>>(text: &str, images: &[S]) -> Payload {
    if images.is_empty() {
        return Payload::Text(text.to_string());
    }
    let mut parts = Vec::with_capacity(images.len() + 1);
    for (idx, image) in images.iter().enumerate() {
        match parse_data_url(image.as_ref()) {
            Some(blob) => parts.push(Part::InlineData { inline_data: blob }),
            None => tracing::debug!(index = idx, "skipping attachment that is not a data URL"),
        }
    }
    parts.push(Part::text(text));
    Payload::Parts(parts)
}

/// Extracts the reply text from `response`, or [`FALLBACK_REPLY`] if there is none.
pub fn decode(response: &GenerateContentResponse) -> String {
    match response.text() {
        Some(text) if !text.trim().is_empty() => text,
        _ => FALLBACK_REPLY.to_string(),
    }
}

/// Parses a `data:<mime>;base64,<data>` URL into a blob.
pub fn parse_data_url(url: &str) -> Option<Blob> {
    let captures = DATA_URL.captures(url)?;
    let mime_type = captures.get(1)?.as_str();
    let data = STANDARD.decode(captures.get(2)?.as_str()).ok()?;
    Some(Blob::new(mime_type, data))
}

/// Formats bytes as a base64 data URL.
pub fn to_data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Candidate, Role};

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";
    const JPEG: &str = "data:image/jpeg;base64,/9j/4AAQ";

    #[test]
    fn text_only_payload() {
        let payload = encode::<&str>("hello", &[]);
        assert_eq!(payload, Payload::Text("hello".to_string()));
        assert_eq!(payload.inline_count(), 0);
    }

    #[test]
    fn images_precede_text_in_order() {
        let payload = encode("describe this", &[PNG, JPEG]);
        let Payload::Parts(parts) = payload else {
            panic!("expected parts payload");
        };
        assert_eq!(parts.len(), 3);
        match &parts[0] {
            Part::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/png");
                assert_eq!(inline_data.data, b"\x89PNG\r\n\x1a\n".to_vec());
            }
            other => panic!("unexpected part {other:?}"),
        }
        match &parts[1] {
            Part::InlineData { inline_data } => assert_eq!(inline_data.mime_type, "image/jpeg"),
            other => panic!("unexpected part {other:?}"),
        }
        assert_eq!(parts[2], Part::text("describe this"));
    }

    #[test]
    fn malformed_images_are_skipped() {
        let payload = encode("look", &["not a data url", "data:image/png;base64,@@@"]);
        assert_eq!(payload, Payload::Parts(vec![Part::text("look")]));

        let payload = encode("look", &["garbage", PNG]);
        assert_eq!(payload.inline_count(), 1);
    }

    #[test]
    fn payload_into_content() {
        let content = encode::<&str>("hi", &[]).into_content();
        assert_eq!(content.role, Some(Role::User));
        assert_eq!(content.parts, vec![Part::text("hi")]);
    }

    #[test]
    fn decode_reply_text() {
        let response = GenerateContentResponse::from_text("Analisis Gejala");
        assert_eq!(decode(&response), "Analisis Gejala");
    }

    #[test]
    fn decode_falls_back_without_text() {
        assert_eq!(decode(&GenerateContentResponse::default()), FALLBACK_REPLY);

        let blocked = GenerateContentResponse {
            candidates: vec![Candidate {
                content: None,
                finish_reason: Some("SAFETY".to_string()),
            }],
            ..GenerateContentResponse::default()
        };
        assert_eq!(decode(&blocked), FALLBACK_REPLY);
        assert_eq!(decode(&GenerateContentResponse::from_text("  ")), FALLBACK_REPLY);
    }

    #[test]
    fn data_url_round_trip() {
        let url = to_data_url("image/webp", b"RIFF");
        assert_eq!(url, "data:image/webp;base64,UklGRg==");
        let blob = parse_data_url(&url).unwrap();
        assert_eq!(blob.mime_type, "image/webp");
        assert_eq!(blob.data, b"RIFF".to_vec());
    }
}
