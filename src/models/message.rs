//! Contact message model
//!
//! Messages submitted through the public contact form and triaged in the
//! admin console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A visitor-submitted contact message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Unique identifier
    pub id: i64,
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Optional phone number
    pub phone: Option<String>,
    /// Message body
    pub message: String,
    /// Triage status
    pub status: MessageStatus,
    /// Internal notes attached by console operators
    pub notes: Option<String>,
    /// Submission timestamp
    pub created_at: DateTime<Utc>,
}

/// Triage status for contact messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    #[serde(rename = "UNREAD")]
    Unread,
    #[serde(rename = "READ")]
    Read,
    #[serde(rename = "REPLIED")]
    Replied,
    #[serde(rename = "ARCHIVED")]
    Archived,
}

impl Default for MessageStatus {
    fn default() -> Self {
        Self::Unread
    }
}

impl MessageStatus {
    /// Database/wire string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Unread => "UNREAD",
            MessageStatus::Read => "READ",
            MessageStatus::Replied => "REPLIED",
            MessageStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UNREAD" => Ok(MessageStatus::Unread),
            "READ" => Ok(MessageStatus::Read),
            "REPLIED" => Ok(MessageStatus::Replied),
            "ARCHIVED" => Ok(MessageStatus::Archived),
            _ => Err(anyhow::anyhow!("Invalid message status: {}", s)),
        }
    }
}

/// Input from the public contact form
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessageInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}

/// Console-side update; unset fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMessageInput {
    pub status: Option<MessageStatus>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            MessageStatus::Unread,
            MessageStatus::Read,
            MessageStatus::Replied,
            MessageStatus::Archived,
        ] {
            assert_eq!(MessageStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(MessageStatus::from_str("SPAM").is_err());
    }

    #[test]
    fn test_status_default_is_unread() {
        assert_eq!(MessageStatus::default(), MessageStatus::Unread);
    }
}
