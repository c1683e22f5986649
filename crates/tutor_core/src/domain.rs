//! crates/tutor_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or presentation format.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// The author of a single chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One turn in a chat session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with the current time.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// One conversation thread scoped to a file. History is append-only;
/// insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub name: String,
    pub history: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

/// What the document analyzer derives from an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentAnalysis {
    pub page_count: u32,
    pub chapters: Vec<String>,
    pub main_topics: Vec<String>,
}

/// An uploaded document record plus its derived analysis and chat sessions.
/// Sessions are append-only, most-recent-last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfFile {
    pub id: Uuid,
    pub name: String,
    pub analysis: DocumentAnalysis,
    pub sessions: Vec<ChatSession>,
    pub created_at: DateTime<Utc>,
}

impl PdfFile {
    pub fn session(&self, session_id: Uuid) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == session_id)
    }
}

/// One entry of the ranked common-topics list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: u32,
}

/// Aggregate usage statistics, recomputed on every successful file add.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub files_analyzed: u32,
    pub avg_creativity: u32,
    pub common_topics: Vec<TopicCount>,
}

/// A 0-100 input controlling which response framing the assistant selects.
/// Values above 100 are clamped at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Creativity(u8);

impl Creativity {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Creativity {
    fn default() -> Self {
        Self(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creativity_clamps_to_100() {
        assert_eq!(Creativity::new(100).value(), 100);
        assert_eq!(Creativity::new(255).value(), 100);
        assert_eq!(Creativity::new(0).value(), 0);
    }

    #[test]
    fn session_lookup_by_id() {
        let session = ChatSession {
            id: Uuid::new_v4(),
            name: "test".to_string(),
            history: vec![Message::new(Sender::Assistant, "hi")],
            created_at: Utc::now(),
        };
        let file = PdfFile {
            id: Uuid::new_v4(),
            name: "book.pdf".to_string(),
            analysis: DocumentAnalysis {
                page_count: 10,
                chapters: vec![],
                main_topics: vec![],
            },
            sessions: vec![session.clone()],
            created_at: Utc::now(),
        };
        assert_eq!(file.session(session.id), Some(&session));
        assert_eq!(file.session(Uuid::new_v4()), None);
    }
}
