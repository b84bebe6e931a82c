//! Live channel message decoding.

use mutrace_core::errors::{MutraceError, Result};
use mutrace_core::Post;
use serde::Deserialize;

/// Message type carrying a freshly created post
pub const NEW_POST: &str = "new_post";

/// A decoded live channel message
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    NewPost(Post),
    /// Well-formed message of a type this engine does not consume
    Ignored { kind: String },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

/// Decode one raw channel frame
///
/// # Errors
///
/// Returns `MalformedMessage` for invalid JSON, a missing `type`, or a
/// `new_post` whose payload is absent or lacks required post fields.
pub fn decode_message(raw: &str) -> Result<ChannelMessage> {
    let envelope: Envelope =
        serde_json::from_str(raw).map_err(|e| MutraceError::MalformedMessage {
            reason: e.to_string(),
        })?;

    if envelope.kind != NEW_POST {
        return Ok(ChannelMessage::Ignored {
            kind: envelope.kind,
        });
    }

    let payload = envelope
        .payload
        .ok_or_else(|| MutraceError::MalformedMessage {
            reason: "new_post without payload".to_string(),
        })?;
    let post: Post =
        serde_json::from_value(payload).map_err(|e| MutraceError::MalformedMessage {
            reason: format!("invalid new_post payload: {}", e),
        })?;
    Ok(ChannelMessage::NewPost(post))
}

/// Encode a post as a `new_post` frame
pub fn encode_new_post(post: &Post) -> Result<String> {
    serde_json::to_string(&serde_json::json!({ "type": NEW_POST, "payload": post })).map_err(
        |e| MutraceError::MalformedMessage {
            reason: e.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_new_post() {
        let raw = r#"{"type":"new_post","payload":{"id":"p2","parentId":"p1","author":"bob","content":"The sky is red","timestamp":"2024-03-01T12:00:00Z"}}"#;

        let ChannelMessage::NewPost(post) = decode_message(raw).unwrap() else {
            panic!("expected new_post");
        };
        assert_eq!(post.id, "p2");
        assert_eq!(post.parent_id.as_deref(), Some("p1"));
        assert_eq!(post.mutation_score, None);
    }

    #[test]
    fn test_other_types_ignored() {
        let msg = decode_message(r#"{"type":"typing","payload":{"user":"x"}}"#).unwrap();
        assert_eq!(
            msg,
            ChannelMessage::Ignored {
                kind: "typing".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_inputs() {
        for raw in [
            "not json",
            r#"{"payload":{}}"#,
            r#"{"type":"new_post"}"#,
            r#"{"type":"new_post","payload":{"id":"p1"}}"#,
        ] {
            assert!(
                matches!(decode_message(raw), Err(MutraceError::MalformedMessage { .. })),
                "{} should be malformed",
                raw
            );
        }
    }

    #[test]
    fn test_encode_decodes_back() {
        let post = Post::new("p1", "alice", "hello", chrono::Utc::now()).with_incident("inc");
        let raw = encode_new_post(&post).unwrap();
        assert_eq!(decode_message(&raw).unwrap(), ChannelMessage::NewPost(post));
    }
}
