//! Chat payload convention
//!
//! A chat frame's payload is UTF-8 text of the form `<sender>/<body>`,
//! split on the first `/`. The sender field is a phone-number-like
//! address resolved against the local contact directory.

use crate::error::{Error, Result};

/// The logical unit produced by decoding a chat frame's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedMessage {
    pub sender: String,
    pub body: String,
}

impl RoutedMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
        }
    }

    /// Parse a chat payload, splitting on the first `/`.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| Error::MalformedPayload("payload is not UTF-8".into()))?;

        let (sender, body) = text
            .split_once('/')
            .ok_or_else(|| Error::MalformedPayload("missing sender separator".into()))?;

        Ok(Self {
            sender: sender.to_string(),
            body: body.to_string(),
        })
    }

    /// Encode back to the `<sender>/<body>` wire payload.
    pub fn to_payload(&self) -> Vec<u8> {
        format!("{}/{}", self.sender, self.body).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_roundtrip() {
        let msg = RoutedMessage::new("5551234", "hello");
        let decoded = RoutedMessage::from_payload(&msg.to_payload()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_body_may_contain_separator() {
        // Only the first '/' splits; the body keeps the rest
        let msg = RoutedMessage::from_payload(b"5551234/a/b/c").unwrap();
        assert_eq!(msg.sender, "5551234");
        assert_eq!(msg.body, "a/b/c");
    }

    #[test]
    fn test_missing_separator_rejected() {
        let result = RoutedMessage::from_payload(b"no separator here");
        assert!(matches!(result, Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn test_non_utf8_rejected() {
        let result = RoutedMessage::from_payload(&[0xff, 0xfe, b'/', b'x']);
        assert!(matches!(result, Err(Error::MalformedPayload(_))));
    }
}
