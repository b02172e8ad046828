//! Chat wire types shared by the client and the panel.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Persona instructions.
    System,
    /// The student.
    User,
    /// The model.
    Assistant,
}

/// One turn of a conversation, as sent to `/api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author.
    pub role: Role,
    /// Text content.
    pub content: String,
    /// Base64 image payloads, without any data URL prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ChatMessage {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: None,
        }
    }

    /// Attach an image. A `data:<mime>;base64,` prefix is removed.
    pub fn with_image(mut self, payload: &str) -> Self {
        let payload = strip_data_url_prefix(payload).to_string();
        self.images.get_or_insert_with(Vec::new).push(payload);
        self
    }
}

/// Remove a leading `data:…;base64,` prefix, if any.
pub fn strip_data_url_prefix(payload: &str) -> &str {
    if payload.starts_with("data:") {
        if let Some(idx) = payload.find(";base64,") {
            return &payload[idx + ";base64,".len()..];
        }
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_field_is_omitted_when_absent() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn image_prefix_is_stripped() {
        let msg = ChatMessage::user("look").with_image("data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(msg.images, Some(vec!["iVBORw0KGgo=".to_string()]));

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["images"][0], "iVBORw0KGgo=");
    }

    #[test]
    fn bare_payload_is_untouched() {
        assert_eq!(strip_data_url_prefix("AAAA"), "AAAA");
        assert_eq!(strip_data_url_prefix("data:text/plain,hi"), "data:text/plain,hi");
    }
}
