//! Stream payloads pushed to connected clients.
//!
//! One JSON object per message, keyed by the variant name:
//!
//! | Variant | Wire form | Flavor |
//! |---|---|---|
//! | `Welcome` | `{"welcome":"Welcome!"}` | presence |
//! | `Users` | `{"users":3}` | presence |
//! | `Hello` | `{"hello":"Hello, World!"}` | both |
//! | `Greeting` | `{"greeting":"Hello"}` | basic |
//!
//! Inbound frames carry no meaning beyond "the client said something", so they stay
//! as [`InboundFrame`](object_framework::InboundFrame).

use serde::{Deserialize, Serialize};

pub const WELCOME: &str = "Welcome!";

/// Fixed reply of the basic flavor to any inbound message.
pub const BASIC_REPLY: &str = "world";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMessage {
    Welcome(String),
    Users(usize),
    Hello(String),
    Greeting(String),
}

impl ServerMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_single_key_object() {
        assert_eq!(
            ServerMessage::Welcome(WELCOME.into()).encode().unwrap(),
            r#"{"welcome":"Welcome!"}"#
        );
        assert_eq!(ServerMessage::Users(3).encode().unwrap(), r#"{"users":3}"#);
        assert_eq!(
            ServerMessage::Hello("Hi, Sam!".into()).encode().unwrap(),
            r#"{"hello":"Hi, Sam!"}"#
        );
        assert_eq!(
            ServerMessage::Greeting("Hi".into()).encode().unwrap(),
            r#"{"greeting":"Hi"}"#
        );
    }

    #[test]
    fn decode_rejects_unknown_keys() {
        assert_eq!(
            ServerMessage::decode(r#"{"users":0}"#).unwrap(),
            ServerMessage::Users(0)
        );
        assert!(ServerMessage::decode(r#"{"bogus":1}"#).is_err());
    }
}
