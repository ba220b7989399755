use serde::{Deserialize, Serialize};

/// The author of a piece of content.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Content authored by the user.
    User,
    /// Content authored by the model.
    Model,
}

/// Raw bytes with a declared media type, sent inline with a request.
///
/// The bytes are kept decoded in memory and base64-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// IANA media type of the data, e.g. `image/png`.
    pub mime_type: String,

    /// The raw bytes.
    #[serde(with = "crate::utils::base64_bytes")]
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// One part of a multi-part content.
///
/// Parts the client does not understand (function calls, code execution
/// results, ...) are preserved as raw JSON so that a conversation history can
/// be replayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Inline binary data.
    InlineData {
        /// The attached blob.
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },

    /// Text.
    Text {
        /// The text itself.
        text: String,

        /// Set when the text is a thought summary rather than answer text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,

        /// Opaque signature the model attaches to its reasoning; it must be
        /// sent back unchanged with the history.
        #[serde(
            rename = "thoughtSignature",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        thought_signature: Option<String>,
    },

    /// Any other part kind.
    Other(serde_json::Value),
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            thought: None,
            thought_signature: None,
        }
    }

    /// Create an inline-data part.
    pub fn inline_data(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Part::InlineData {
            inline_data: Blob::new(mime_type, data),
        }
    }

    /// Returns the answer text of this part, skipping thought summaries.
    pub fn as_answer_text(&self) -> Option<&str> {
        match self {
            Part::Text {
                text,
                thought: None | Some(false),
                ..
            } => Some(text),
            _ => None,
        }
    }

    /// Returns true for inline-data parts.
    pub fn is_inline_data(&self) -> bool {
        matches!(self, Part::InlineData { .. })
    }
}

/// A single message in a conversation: a role and an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Who authored the content.  Absent for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// The parts, in order.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create user content from parts.
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some(Role::User),
            parts,
        }
    }

    /// Create model content from parts.
    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Some(Role::Model),
            parts,
        }
    }

    /// Create role-less content holding a single text part (system instructions).
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated answer text of all parts, or `None` if there is none.
    pub fn text(&self) -> Option<String> {
        let text: String = self.parts.iter().filter_map(Part::as_answer_text).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn inline_data_part_serialization() {
        let part = Part::inline_data("image/png", b"Hello World".to_vec());
        assert_eq!(
            to_value(&part).unwrap(),
            json!({
                "inlineData": {
                    "mimeType": "image/png",
                    "data": "SGVsbG8gV29ybGQ="
                }
            })
        );
    }

    #[test]
    fn user_content_serialization() {
        let content = Content::user(vec![Part::text("hello")]);
        assert_eq!(
            to_value(&content).unwrap(),
            json!({ "role": "user", "parts": [{ "text": "hello" }] })
        );
        let system = Content::system("be kind");
        assert_eq!(
            to_value(&system).unwrap(),
            json!({ "parts": [{ "text": "be kind" }] })
        );
    }

    #[test]
    fn part_deserialization() {
        let parts: Vec<Part> = serde_json::from_value(json!([
            { "inlineData": { "mimeType": "image/jpeg", "data": "SGVsbG8=" } },
            { "text": "thinking...", "thought": true },
            { "text": "answer", "thoughtSignature": "abc" },
            { "functionCall": { "name": "lookup", "args": {} } }
        ]))
        .unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], Part::inline_data("image/jpeg", b"Hello".to_vec()));
        assert_eq!(parts[1].as_answer_text(), None);
        assert_eq!(parts[2].as_answer_text(), Some("answer"));
        assert!(matches!(parts[3], Part::Other(_)));
    }

    #[test]
    fn thought_signature_survives_replay() {
        let wire = json!({
            "role": "model",
            "parts": [{ "text": "jawaban", "thoughtSignature": "c2ln" }]
        });
        let content: Content = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(
            content.parts[0],
            Part::Text {
                text: "jawaban".to_string(),
                thought: None,
                thought_signature: Some("c2ln".to_string()),
            }
        );
        assert_eq!(to_value(&content).unwrap(), wire);
    }

    #[test]
    fn content_text_skips_thoughts() {
        let content = Content::model(vec![
            Part::Text {
                text: "hmm".to_string(),
                thought: Some(true),
                thought_signature: None,
            },
            Part::text("Hello, "),
            Part::text("patient."),
        ]);
        assert_eq!(content.text(), Some("Hello, patient.".to_string()));
        assert_eq!(Content::model(vec![]).text(), None);
    }
}
