use serde::{Deserialize, Serialize};

/// Value of the `Name` field the server expects on every command frame.
pub const FRAME_NAME: &str = "WebRcon";

/// Command frame sent to the server. Serialized as a single websocket text
/// frame; the field names on the wire are PascalCase.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommandRequest {
    identifier: i32,
    message: String,
    name: String,
}

impl CommandRequest {
    pub fn new(identifier: i32, command: &str) -> Self {
        CommandRequest {
            identifier,
            message: command.to_owned(),
            name: FRAME_NAME.to_owned(),
        }
    }

    pub fn identifier(&self) -> i32 {
        self.identifier
    }

    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Reply frame received from the server. `Type` is the server's
/// classification of the message (e.g. "Generic", "Chat"); `Stack` only
/// shows up on some error replies.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommandResponse {
    identifier: i32,
    message: String,
    #[serde(rename = "Type", default)]
    message_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

impl CommandResponse {
    pub fn new(identifier: i32, message: String, message_type: String) -> Self {
        CommandResponse {
            identifier,
            message,
            message_type,
            stack: None,
        }
    }

    pub fn identifier(&self) -> i32 {
        self.identifier
    }

    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    pub fn message_type(&self) -> &str {
        self.message_type.as_ref()
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_command_frame_in_wire_order() {
        let request = CommandRequest::new(1, "serverinfo");
        assert_eq!(
            request.to_frame().unwrap(),
            r#"{"Identifier":1,"Message":"serverinfo","Name":"WebRcon"}"#
        );
    }

    #[test]
    fn parses_reply_without_stack() {
        let frame = r#"{"Identifier":1,"Message":"hello","Type":"Generic"}"#;
        let response: CommandResponse = serde_json::from_str(frame).unwrap();
        assert_eq!(response.identifier(), 1);
        assert_eq!(response.message(), "hello");
        assert_eq!(response.message_type(), "Generic");
        assert_eq!(response.stack(), None);
    }

    #[test]
    fn parses_reply_with_stack_and_extra_fields() {
        let frame = r#"{"Identifier":3,"Message":"boom","Type":"Error","Stack":"at cmd","Took":0.2}"#;
        let response: CommandResponse = serde_json::from_str(frame).unwrap();
        assert_eq!(response.identifier(), 3);
        assert_eq!(response.stack(), Some("at cmd"));
    }

    #[test]
    fn tolerates_missing_type() {
        let frame = r#"{"Identifier":2,"Message":"ok"}"#;
        let response: CommandResponse = serde_json::from_str(frame).unwrap();
        assert_eq!(response.message_type(), "");
    }
}
