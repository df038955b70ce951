//! Timeline assembly: dedup, attachment resolution, and the final ordering.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::model::record::MessageRecord;
use crate::walker::index::AttachmentIndex;

/// Counters produced while assembling the timeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssembleStats {
    /// Exact-duplicate records removed (same conversation, timestamp,
    /// sender, and body — the signature of a doubly-extracted export).
    pub duplicates_removed: u64,
    /// Attachment names that matched a file in the index.
    pub attachments_resolved: u64,
    /// Attachment names left as plain text because nothing matched.
    pub attachments_unresolved: u64,
}

/// Build the final ordered timeline from all parsed records.
///
/// Duplicates are removed first (first occurrence in encounter order wins),
/// then attachment names are resolved against the index, then the whole set
/// is sorted by conversation, timestamp, and encounter order.
pub fn assemble(
    mut records: Vec<MessageRecord>,
    index: &AttachmentIndex,
) -> (Vec<MessageRecord>, AssembleStats) {
    let mut stats = AssembleStats::default();

    // Records arrive in encounter order, so retain keeps the first duplicate.
    let mut seen: HashSet<(String, DateTime<Utc>, String, String)> = HashSet::new();
    let before = records.len();
    records.retain(|r| {
        let (conv, ts, sender, body) = r.dedup_key();
        seen.insert((conv.to_string(), ts, sender.to_string(), body.to_string()))
    });
    stats.duplicates_removed = (before - records.len()) as u64;

    for record in &mut records {
        for attachment in &mut record.attachments {
            match index.resolve(&attachment.name) {
                Some(path) => {
                    attachment.resolved = Some(path.to_path_buf());
                    stats.attachments_resolved += 1;
                }
                None => {
                    warn!(
                        conversation = %record.conversation_id,
                        name = %attachment.name,
                        "Attachment not found in tree, leaving as plain text"
                    );
                    stats.attachments_unresolved += 1;
                }
            }
        }
    }

    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    debug!(
        records = records.len(),
        duplicates = stats.duplicates_removed,
        unresolved = stats.attachments_unresolved,
        "Timeline assembled"
    );

    (records, stats)
}
