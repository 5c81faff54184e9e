//! Session-scoped chat messages. Ids are render keys, unique within the
//! session only — they carry no cross-session identity.

use uuid::Uuid;

use crate::cards::{ProjectCard, StructuredOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    /// Grows while the owning turn streams; frozen once the turn completes.
    pub content: String,
    pub structured_data: Option<StructuredOutput>,
    /// Full project list for multi-item card rendering (projects card only).
    pub projects: Vec<ProjectCard>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            structured_data: None,
            projects: Vec::new(),
        }
    }

    /// Empty assistant message appended when a turn starts streaming.
    pub fn assistant_placeholder() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: String::new(),
            structured_data: None,
            projects: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ChatMessage::user("one");
        let b = ChatMessage::user("two");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_placeholder_starts_empty() {
        let message = ChatMessage::assistant_placeholder();
        assert_eq!(message.role, Role::Assistant);
        assert!(message.content.is_empty());
        assert!(message.structured_data.is_none());
    }
}
