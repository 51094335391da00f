//! Chat entry types.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a transcript entry. Strictly increasing in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrigin {
    /// Text typed by the user.
    User,
    /// A reply from the assistant, or a locally generated notice shown as one.
    Assistant,
}

/// A single entry in the transcript.
///
/// Entries are immutable once appended; the text is stored exactly as
/// received and only transformed when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub id: EntryId,
    pub text: String,
    pub origin: EntryOrigin,
    pub created_at: DateTime<Utc>,
}

impl ChatEntry {
    pub fn is_user(&self) -> bool {
        self.origin == EntryOrigin::User
    }

    pub fn is_assistant(&self) -> bool {
        self.origin == EntryOrigin::Assistant
    }

    /// Hour and minute of creation in local time, e.g. `09:41`.
    pub fn format_time(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}
