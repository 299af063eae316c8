use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const GREETING: &str = "Hey there 👋 I'm SHAE. I'm here to listen, reflect, and explore alongside you—no judgments, no prescriptions. What's on your mind today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Companion,
    /// Lifecycle side effects. Never forwarded to the reply service.
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only conversation log for one chat session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_greeting() -> Self {
        let mut transcript = Self::new();
        transcript.append(Sender::Companion, GREETING);
        transcript
    }

    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> &TranscriptEntry {
        self.entries.push(TranscriptEntry {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            created_at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }
}
