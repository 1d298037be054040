//! The action an agent selected.

use intent_primitives::ProposedAction;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters of a selected tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionArguments {
    /// The payload parsed into a key-value map.
    Parsed(Map<String, Value>),
    /// The payload was not a serialised key-value map; the text is kept as is.
    RawPayload(String),
}

impl ActionArguments {
    /// Parses a serialised argument payload. Blank payloads are treated as an
    /// empty parameter map.
    #[must_use]
    pub fn parse(payload: &str) -> Self {
        if payload.trim().is_empty() {
            return Self::Parsed(Map::new());
        }
        match serde_json::from_str::<Value>(payload) {
            Ok(Value::Object(map)) => Self::Parsed(map),
            _ => Self::RawPayload(payload.to_owned()),
        }
    }

    /// Parsed parameters, if the payload could be parsed.
    #[must_use]
    pub fn parameters(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Parsed(map) => Some(map),
            Self::RawPayload(_) => None,
        }
    }

    /// Unparseable payload text, if any.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Parsed(_) => None,
            Self::RawPayload(text) => Some(text),
        }
    }

    /// Looks up a parsed parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters().and_then(|map| map.get(key))
    }
}

/// Action the agent selected, reconstructed from the conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectedAction {
    /// A tool call, either supplied as the targeted action or proposed in the
    /// most recent assistant turn.
    ToolCall {
        /// Call identifier.
        call_id: String,
        /// Function name.
        function: String,
        /// Function parameters.
        arguments: ActionArguments,
    },
    /// Free-text fallback taken from the most recent assistant turn.
    Message {
        /// Turn content.
        content: String,
    },
    /// The conversation contained no assistant turn.
    #[default]
    Unknown,
}

impl SelectedAction {
    /// Builds a tool-call action from a proposed action.
    #[must_use]
    pub fn from_proposed(action: &ProposedAction) -> Self {
        Self::ToolCall {
            call_id: action.id().to_owned(),
            function: action.function_name().to_owned(),
            arguments: ActionArguments::parse(action.arguments()),
        }
    }

    /// Function name of a tool call.
    #[must_use]
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::ToolCall { function, .. } => Some(function),
            _ => None,
        }
    }

    /// Content of a message fallback.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Message { content } => Some(content),
            _ => None,
        }
    }

    /// Arguments of a tool call.
    #[must_use]
    pub fn arguments(&self) -> Option<&ActionArguments> {
        match self {
            Self::ToolCall { arguments, .. } => Some(arguments),
            _ => None,
        }
    }

    /// Looks up a parsed tool-call parameter.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.arguments().and_then(|arguments| arguments.get(key))
    }

    /// Returns `true` when the action names a function or carries message text.
    #[must_use]
    pub fn is_specified(&self) -> bool {
        self.function_name().is_some_and(|name| !name.trim().is_empty())
            || self.message().is_some_and(|content| !content.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_payload_is_kept_raw() {
        let arguments = ActionArguments::parse("symbol=NVDA&amount=90M");
        assert_eq!(arguments.raw(), Some("symbol=NVDA&amount=90M"));
        assert!(arguments.parameters().is_none());
    }

    #[test]
    fn non_object_json_is_kept_raw() {
        let arguments = ActionArguments::parse("[1, 2]");
        assert_eq!(arguments.raw(), Some("[1, 2]"));
    }

    #[test]
    fn blank_payload_means_no_parameters() {
        let arguments = ActionArguments::parse("  ");
        assert_eq!(arguments.parameters().map(Map::len), Some(0));
    }

    #[test]
    fn tool_call_from_proposed_action() {
        let proposed =
            ProposedAction::new("call_1", "execute_trade", r#"{"symbol": "NVDA"}"#).unwrap();
        let action = SelectedAction::from_proposed(&proposed);

        assert_eq!(action.function_name(), Some("execute_trade"));
        assert_eq!(action.parameter("symbol"), Some(&Value::from("NVDA")));
        assert!(action.is_specified());
    }

    #[test]
    fn unknown_and_blank_actions_are_unspecified() {
        assert!(!SelectedAction::Unknown.is_specified());
        assert!(
            !SelectedAction::Message {
                content: " ".into()
            }
            .is_specified()
        );
    }
}
