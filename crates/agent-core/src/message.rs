//! Conversation Memory
//!
//! An ordered, append-only log of role-tagged turns. Content is always plain
//! text: structured payloads are serialized to canonical JSON on append, so a
//! turn can be handed to any chat-completions transport as-is.

use serde::{Deserialize, Serialize};

/// Role of a turn's author
///
/// Roles outside the three known ones are accepted and passed through verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Instructions and loop corrections
    System,
    /// Task input and tool results
    User,
    /// Model responses
    Assistant,
    /// Any other role string
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Other(role) => role.as_str(),
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            _ => Self::Other(role),
        }
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        Self::from(role.to_owned())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content offered to [`Memory::append`] before normalization
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Text(String),
    Structured(serde_json::Value),
}

impl Content {
    /// Normalize to the stored string form.
    ///
    /// JSON strings are stored unquoted; every other value is stored as its
    /// compact JSON encoding, which decodes back to the same value.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) | Self::Structured(serde_json::Value::String(text)) => text,
            Self::Structured(value) => value.to_string(),
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

/// A single turn in the conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Author role (`type` is accepted as a legacy alias)
    #[serde(alias = "type")]
    pub role: Role,

    /// Text content
    pub content: String,
}

impl Turn {
    pub fn new(role: impl Into<Role>, content: impl Into<Content>) -> Self {
        Self {
            role: role.into(),
            content: content.into().into_text(),
        }
    }

    pub fn system(content: impl Into<Content>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<Content>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<Content>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Append-only conversation log
///
/// One `Memory` belongs to exactly one running loop; the loop borrows it
/// mutably for the whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memory {
    turns: Vec<Turn>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, normalizing its content to text.
    pub fn append(&mut self, role: impl Into<Role>, content: impl Into<Content>) {
        self.push(Turn::new(role, content));
    }

    /// Append an already-built turn
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Append any serializable payload as its canonical JSON text.
    pub fn append_serialized<T: Serialize>(
        &mut self,
        role: impl Into<Role>,
        payload: &T,
    ) -> crate::Result<()> {
        let value = serde_json::to_value(payload)?;
        self.append(role, value);
        Ok(())
    }

    /// Read the earliest `limit` turns, or all of them when `limit` is `None`.
    pub fn read(&self, limit: Option<usize>) -> &[Turn] {
        match limit {
            Some(limit) => &self.turns[..limit.min(self.turns.len())],
            None => &self.turns,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl<'a> IntoIterator for &'a Memory {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
