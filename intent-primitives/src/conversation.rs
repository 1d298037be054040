//! Normalised conversation schema consumed by the reasoning extractor.
//!
//! Turns are a closed set over `user`, `assistant` and `tool`; each variant
//! carries only the fields that are valid for that role. The wire shape
//! matches the chat-completions convention:
//!
//! ```json
//! {"role": "assistant", "content": null, "tool_calls": [
//!   {"id": "call_1", "type": "function",
//!    "function": {"name": "execute_trade", "arguments": "{\"amount\": \"$90M\"}"}}
//! ]}
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Role of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human or upstream task author.
    User,
    /// The agent whose reasoning is being governed.
    Assistant,
    /// Output returned by a tool invocation.
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        })
    }
}

/// Function name and serialised arguments of a proposed action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    name: String,
    #[serde(default, deserialize_with = "arguments_as_string")]
    arguments: String,
}

/// Action proposed by an assistant turn (a tool call awaiting execution).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedAction {
    id: String,
    function: FunctionCall,
}

impl ProposedAction {
    /// Creates a proposed action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConversation`] when the call identifier is empty.
    pub fn new(
        id: impl Into<String>,
        function_name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidConversation {
                reason: "proposed action id cannot be empty".into(),
            });
        }
        Ok(Self {
            id,
            function: FunctionCall {
                name: function_name.into(),
                arguments: arguments.into(),
            },
        })
    }

    /// Returns the call identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the targeted function name.
    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function.name
    }

    /// Returns the raw argument payload.
    #[must_use]
    pub fn arguments(&self) -> &str {
        &self.function.arguments
    }
}

/// Single turn of a normalised agent conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Turn {
    /// User-authored content.
    User {
        /// Optional text content.
        #[serde(default)]
        content: Option<String>,
    },
    /// Agent-authored content, optionally proposing actions.
    Assistant {
        /// Optional text content.
        #[serde(default)]
        content: Option<String>,
        /// Actions proposed by this turn, in order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ProposedAction>,
    },
    /// Tool output fed back into the conversation.
    Tool {
        /// Optional text content (frequently a serialised JSON object).
        #[serde(default)]
        content: Option<String>,
        /// Identifier of the call this output answers, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<String>,
    },
}

impl Turn {
    /// Creates a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: Some(content.into()),
        }
    }

    /// Creates an assistant turn carrying only text.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Creates an assistant turn proposing one or more actions.
    #[must_use]
    pub fn assistant_with_actions(content: Option<String>, actions: Vec<ProposedAction>) -> Self {
        Self::Assistant {
            content,
            tool_calls: actions,
        }
    }

    /// Creates a tool turn.
    #[must_use]
    pub fn tool(content: impl Into<String>) -> Self {
        Self::Tool {
            content: Some(content.into()),
            tool_call_id: None,
        }
    }

    /// Returns the turn role.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::Tool { .. } => Role::Tool,
        }
    }

    /// Returns the text content, if any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::User { content } | Self::Assistant { content, .. } | Self::Tool { content, .. } => {
                content.as_deref()
            }
        }
    }

    /// Returns `true` for tool output turns.
    #[must_use]
    pub const fn is_tool(&self) -> bool {
        matches!(self, Self::Tool { .. })
    }

    /// Returns the actions proposed by an assistant turn; empty for other roles.
    #[must_use]
    pub fn proposed_actions(&self) -> &[ProposedAction] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }
}

/// Ordered sequence of turns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation(Vec<Turn>);

impl Conversation {
    /// Creates a conversation from the supplied turns.
    #[must_use]
    pub fn new(turns: Vec<Turn>) -> Self {
        Self(turns)
    }

    /// Returns the turns in order.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    /// Iterates over the turns in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.0.iter()
    }

    /// Number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the conversation holds no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the most recent assistant turn.
    #[must_use]
    pub fn last_assistant(&self) -> Option<&Turn> {
        self.0
            .iter()
            .rev()
            .find(|turn| turn.role() == Role::Assistant)
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(value: Vec<Turn>) -> Self {
        Self(value)
    }
}

impl FromIterator<Turn> for Conversation {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// Some frameworks emit the argument payload as an object rather than a string.
fn arguments_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
