//! One message of the flattened timeline.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::sender::SenderAddress;

/// A declared attachment and, once the assembler has run, where it resolved.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct AttachmentRef {
    /// The `export_name` declared by the message, verbatim.
    pub name: String,
    /// Absolute path of the matching file under the scan root, if any.
    pub resolved: Option<PathBuf>,
}

impl AttachmentRef {
    /// A fresh, unresolved reference.
    pub fn declared(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolved: None,
        }
    }
}

/// One row of the output timeline.
///
/// Records are immutable once parsed, except for attachment resolution which
/// the assembler fills in. By construction `conversation_id` is never empty
/// and `timestamp_utc` is always a real parsed time — messages failing either
/// are dropped at parse time, not emitted with placeholders.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MessageRecord {
    /// Conversation this message belongs to, derived from the name of the
    /// folder holding its container file.
    pub conversation_id: String,

    /// Send time, normalized to UTC.
    pub timestamp_utc: DateTime<Utc>,

    /// Sender address (may be empty for system messages).
    pub sender: SenderAddress,

    /// Message text; empty for attachment-only messages.
    pub body: String,

    /// Attachments declared by the message, in declaration order.
    pub attachments: Vec<AttachmentRef>,

    /// Upload IP recorded by the export, verbatim, if present.
    pub source_ip: Option<String>,

    /// Global encounter order (0, 1, 2, …) across the whole scan.
    /// Used as the deterministic tie-breaker when sorting.
    pub sequence: u64,
}

impl MessageRecord {
    /// Key identifying an exact duplicate: the same export extracted twice
    /// yields records agreeing on all four of these.
    pub fn dedup_key(&self) -> (&str, DateTime<Utc>, &str, &str) {
        (
            &self.conversation_id,
            self.timestamp_utc,
            &self.sender.address,
            &self.body,
        )
    }

    /// Sort key for the timeline ordering invariant: conversation, then
    /// timestamp, then encounter order.
    pub fn sort_key(&self) -> (&str, DateTime<Utc>, u64) {
        (&self.conversation_id, self.timestamp_utc, self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(conv: &str, ts: i64, sender: &str, body: &str, seq: u64) -> MessageRecord {
        MessageRecord {
            conversation_id: conv.to_string(),
            timestamp_utc: Utc.timestamp_opt(ts, 0).unwrap(),
            sender: SenderAddress::parse(sender),
            body: body.to_string(),
            attachments: Vec::new(),
            source_ip: None,
            sequence: seq,
        }
    }

    #[test]
    fn test_dedup_key_ignores_sequence() {
        let a = record("Conv A", 1000, "a@b.com", "hi", 0);
        let b = record("Conv A", 1000, "a@b.com", "hi", 7);
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_uses_normalized_sender() {
        let a = record("Conv A", 1000, "A@B.com", "hi", 0);
        let b = record("Conv A", 1000, "a@b.com", "hi", 1);
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_sort_key_orders_by_conversation_first() {
        let a = record("Conv A", 2000, "x@y.com", "later", 0);
        let b = record("Conv B", 1000, "x@y.com", "earlier", 1);
        assert!(a.sort_key() < b.sort_key());
    }
}
