//! Chat data model for tinytalk.
//!
//! Value types for users, messages, and conversations, plus lenient decoding
//! from the backend's raw JSON records. Decoding is total: a missing or
//! mistyped field yields the field's default, never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chat participant's identity record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// Unique user ID
    pub uid: String,

    /// Short handle, e.g. "alice"
    pub username: String,

    /// Display name
    pub fullname: String,

    /// Profile image reference (URL), empty if unset
    pub profile_image_url: String,
}

impl User {
    /// Decode a user from a raw backend record.
    pub fn from_record(record: &Value) -> Self {
        Self {
            uid: record_str(record, "uid"),
            username: record_str(record, "username"),
            fullname: record_str(record, "fullname"),
            profile_image_url: record_str(record, "profileImageUrl"),
        }
    }

    /// Display label: full name if present, otherwise the handle.
    pub fn display_name(&self) -> &str {
        if self.fullname.is_empty() {
            &self.username
        } else {
            &self.fullname
        }
    }
}

/// A single chat message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Text payload
    pub text: String,

    /// Sender user ID
    pub from_id: String,

    /// Recipient user ID
    pub to_id: String,

    /// Unix timestamp in milliseconds
    pub timestamp: i64,

    /// Whether the local authenticated user sent this message
    pub is_from_current_user: bool,
}

impl Message {
    /// Decode a message from a raw backend record.
    ///
    /// `current_uid` is the local authenticated user's ID, used to derive
    /// the `is_from_current_user` flag at decode time.
    pub fn from_record(record: &Value, current_uid: &str) -> Self {
        let from_id = record_str(record, "fromId");
        let is_from_current_user = !current_uid.is_empty() && from_id == current_uid;

        Self {
            text: record_str(record, "text"),
            to_id: record_str(record, "toId"),
            timestamp: record_i64(record, "timestamp"),
            from_id,
            is_from_current_user,
        }
    }

    /// The chat partner's user ID: the participant who is not the local user.
    pub fn chat_partner_id(&self) -> &str {
        if self.is_from_current_user {
            &self.to_id
        } else {
            &self.from_id
        }
    }
}

/// A conversation: the remote participant paired with the most recent
/// message exchanged with them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    /// The remote participant
    pub user: User,

    /// Most recent message exchanged with them
    pub message: Message,
}

impl Conversation {
    /// The counterpart user ID this conversation is keyed by.
    pub fn partner_id(&self) -> &str {
        self.message.chat_partner_id()
    }
}

/// Extract a string field, defaulting to empty on absence or type mismatch.
pub(crate) fn record_str(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Extract an integer field, defaulting to 0 on absence or type mismatch.
pub(crate) fn record_i64(record: &Value, key: &str) -> i64 {
    record.get(key).and_then(Value::as_i64).unwrap_or_default()
}
