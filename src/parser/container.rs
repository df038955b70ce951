//! Parse one `messages.json` container into message records.
//!
//! A container holds every message of one conversation under a top-level
//! `messages` array. One malformed message inside an otherwise valid
//! container is skipped with a warning; a container that is not the expected
//! shape at all fails as a whole.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::{ChatlineError, Result};
use crate::model::record::{AttachmentRef, MessageRecord};
use crate::model::sender::SenderAddress;

use super::datetime::parse_export_timestamp;

/// Result of parsing one container.
#[derive(Debug, Default)]
pub struct ContainerParse {
    /// Records in container order, with `sequence` already assigned.
    pub records: Vec<MessageRecord>,
    /// Messages skipped because their JSON did not match the schema.
    pub skipped_malformed: u64,
    /// Messages dropped because no timestamp could be recovered.
    pub dropped_no_timestamp: u64,
}

// Raw export schema. Unknown fields (topic_id, message_id, reactions, …) are
// ignored; everything else defaults so absent fields never fail a message.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMessage {
    creator: RawCreator,
    created_date: String,
    text: String,
    attached_files: Vec<RawAttachedFile>,
    upload_metadata: Vec<RawUploadMetadata>,
    previous_message_versions: Vec<RawPreviousVersion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCreator {
    email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAttachedFile {
    export_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawUploadMetadata {
    backend_upload_metadata: RawBackendUpload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBackendUpload {
    upload_ip: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPreviousVersion {
    created_date: String,
}

/// Read and parse one container file.
///
/// The conversation ID is the name of the directory holding the file —
/// structural context, never message content. `sequence_start` is the global
/// encounter order assigned to the first record.
pub fn parse_container(path: &Path, sequence_start: u64) -> Result<ContainerParse> {
    let raw = std::fs::read(path).map_err(|e| ChatlineError::io(path, e))?;
    let conversation_id = conversation_id_for(path);
    parse_messages(&raw, &conversation_id, sequence_start)
        .map_err(|reason| ChatlineError::parse(path, reason))
}

/// Derive the conversation ID from the container's location.
pub fn conversation_id_for(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<root>".to_string())
}

/// Parse raw container bytes.
///
/// Returns `Err` with a reason when the whole container is unrecognizable
/// (not a JSON object holding a `messages` array). Individual malformed
/// messages are counted and skipped.
pub fn parse_messages(
    raw: &[u8],
    conversation_id: &str,
    sequence_start: u64,
) -> std::result::Result<ContainerParse, String> {
    let value: serde_json::Value =
        serde_json::from_slice(raw).map_err(|e| format!("invalid JSON: {e}"))?;

    let messages = value
        .as_object()
        .and_then(|o| o.get("messages"))
        .and_then(|m| m.as_array())
        .ok_or_else(|| "missing top-level 'messages' array".to_string())?;

    let mut out = ContainerParse::default();
    let mut sequence = sequence_start;

    for (i, message) in messages.iter().enumerate() {
        let raw_msg: RawMessage = match serde_json::from_value(message.clone()) {
            Ok(m) => m,
            Err(e) => {
                warn!(
                    conversation = conversation_id,
                    message = i,
                    error = %e,
                    "Skipping malformed message"
                );
                out.skipped_malformed += 1;
                continue;
            }
        };

        let Some(timestamp_utc) = message_timestamp(&raw_msg) else {
            warn!(
                conversation = conversation_id,
                message = i,
                "Dropping message without a usable timestamp"
            );
            out.dropped_no_timestamp += 1;
            continue;
        };

        let attachments = raw_msg
            .attached_files
            .iter()
            .filter(|f| !f.export_name.is_empty())
            .map(|f| AttachmentRef::declared(&f.export_name))
            .collect();

        let source_ip = raw_msg
            .upload_metadata
            .first()
            .map(|m| m.backend_upload_metadata.upload_ip.as_str())
            .filter(|ip| !ip.is_empty())
            .map(str::to_string);

        out.records.push(MessageRecord {
            conversation_id: conversation_id.to_string(),
            timestamp_utc,
            sender: SenderAddress::parse(&raw_msg.creator.email),
            body: raw_msg.text,
            attachments,
            source_ip,
            sequence,
        });
        sequence += 1;
    }

    Ok(out)
}

/// Recover a message's send time.
///
/// Messages edited after an upload can carry an empty `created_date`, with
/// the real creation time stored on a previous version; the last non-empty
/// previous version wins, matching how the export orders them.
fn message_timestamp(msg: &RawMessage) -> Option<chrono::DateTime<chrono::Utc>> {
    let mut raw = msg.created_date.as_str();
    if raw.trim().is_empty() {
        for version in &msg.previous_message_versions {
            if !version.created_date.trim().is_empty() {
                raw = &version.created_date;
            }
        }
    }
    parse_export_timestamp(raw)
}
