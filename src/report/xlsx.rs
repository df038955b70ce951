//! XLSX serialization of the assembled timeline.
//!
//! One sheet, fixed header row, one row per record in the order provided —
//! the writer never re-sorts. Resolved attachments become `file://`
//! hyperlinks; unresolved names stay plain text.

use std::io::Write;
use std::path::Path;

use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatAlign, Url, Workbook, XlsxError,
};
use tracing::info;

use crate::config::ReportConfig;
use crate::error::{ChatlineError, Result};
use crate::model::record::MessageRecord;

/// Column headers, in output order.
const HEADERS: [&str; 6] = [
    "Conversation ID",
    "Timestamp (UTC)",
    "Sender",
    "Body",
    "Attachment",
    "IP Address",
];

/// Zero-based column indexes for the wide, wrapped columns.
const COL_BODY: u16 = 3;
const COL_ATTACHMENT: u16 = 4;

/// What the writer produced.
#[derive(Debug, Clone, Copy)]
pub struct ReportStats {
    /// Data rows written (header row excluded).
    pub rows: u64,
    /// Size of the workbook in bytes.
    pub bytes: u64,
}

/// Write the timeline workbook to `out_path`.
///
/// The workbook is serialized to memory first and moved into place through a
/// temp file in the destination directory, so a failed run never leaves a
/// truncated report behind.
pub fn write_report(
    records: &[MessageRecord],
    out_path: &Path,
    layout: &ReportConfig,
) -> Result<ReportStats> {
    let buffer = build_workbook(records, layout)
        .map_err(|e| ChatlineError::report(out_path, e.to_string()))?;

    let dir = out_path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".chatline-")
        .suffix(".xlsx")
        .tempfile_in(dir)
        .map_err(|e| ChatlineError::report(out_path, e.to_string()))?;
    tmp.write_all(&buffer)
        .map_err(|e| ChatlineError::report(out_path, e.to_string()))?;
    tmp.persist(out_path)
        .map_err(|e| ChatlineError::report(out_path, e.error.to_string()))?;

    info!(path = %out_path.display(), rows = records.len(), "Report written");

    Ok(ReportStats {
        rows: records.len() as u64,
        bytes: buffer.len() as u64,
    })
}

/// Serialize the workbook to a byte buffer.
fn build_workbook(
    records: &[MessageRecord],
    layout: &ReportConfig,
) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    // Pin the creation time so identical input yields identical bytes.
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Messages")?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::Black)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let wrap_format = Format::new().set_text_wrap();

    for (col, title) in HEADERS.iter().enumerate() {
        worksheet.write_with_format(0, col as u16, *title, &header_format)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write(row, 0, record.conversation_id.as_str())?;
        worksheet.write(
            row,
            1,
            record
                .timestamp_utc
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        )?;
        worksheet.write(row, 2, record.sender.display.as_str())?;
        worksheet.write_with_format(row, COL_BODY, record.body.as_str(), &wrap_format)?;

        write_attachment_cell(worksheet, row, record, &wrap_format)?;

        if let Some(ip) = &record.source_ip {
            worksheet.write(row, 5, ip.as_str())?;
        }
    }

    if layout.autofilter {
        worksheet.autofilter(0, 0, 0, (HEADERS.len() - 1) as u16)?;
    }
    if layout.freeze_header {
        worksheet.set_freeze_panes(1, 0)?;
    }

    worksheet.autofit();
    worksheet.set_column_width(COL_BODY, layout.body_width)?;
    worksheet.set_column_width(COL_ATTACHMENT, layout.attachment_width)?;

    workbook.save_to_buffer()
}

/// Write one attachment cell.
///
/// The cell text lists every declared name. When the first attachment
/// resolved, the cell links to that file; otherwise it stays plain text.
fn write_attachment_cell(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    record: &MessageRecord,
    wrap_format: &Format,
) -> std::result::Result<(), XlsxError> {
    if record.attachments.is_empty() {
        return Ok(());
    }

    let display = record
        .attachments
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    match record.attachments[0].resolved.as_deref() {
        Some(path) => {
            let url = Url::new(file_url(path)).set_text(display);
            worksheet.write_url_with_format(row, COL_ATTACHMENT, url, wrap_format)?;
        }
        None => {
            worksheet.write_with_format(row, COL_ATTACHMENT, display, wrap_format)?;
        }
    }
    Ok(())
}

/// Render an absolute path as a `file://` link target with forward slashes.
fn file_url(path: &Path) -> String {
    let mut s = path.to_string_lossy().replace('\\', "/");
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    format!("file://{s}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::AttachmentRef;
    use crate::model::sender::SenderAddress;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn sample_records() -> Vec<MessageRecord> {
        vec![
            MessageRecord {
                conversation_id: "Conv A".to_string(),
                timestamp_utc: Utc.with_ymd_and_hms(2024, 10, 25, 3, 20, 36).unwrap(),
                sender: SenderAddress::parse("alice@example.com"),
                body: "hello".to_string(),
                attachments: vec![AttachmentRef {
                    name: "photo.jpg".to_string(),
                    resolved: Some(PathBuf::from("/evidence/Conv A/photo.jpg")),
                }],
                source_ip: Some("203.0.113.7".to_string()),
                sequence: 0,
            },
            MessageRecord {
                conversation_id: "Conv A".to_string(),
                timestamp_utc: Utc.with_ymd_and_hms(2024, 10, 25, 3, 21, 0).unwrap(),
                sender: SenderAddress::parse("bob@example.com"),
                body: "hi back".to_string(),
                attachments: vec![AttachmentRef::declared("missing.png")],
                source_ip: None,
                sequence: 1,
            },
        ]
    }

    #[test]
    fn test_write_report_creates_workbook() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("chat_timeline.xlsx");
        let stats =
            write_report(&sample_records(), &out, &ReportConfig::default()).unwrap();
        assert_eq!(stats.rows, 2);
        let bytes = std::fs::read(&out).unwrap();
        assert_eq!(stats.bytes, bytes.len() as u64);
        // XLSX is a zip container.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_header_only_report_for_empty_timeline() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("chat_timeline.xlsx");
        let stats = write_report(&[], &out, &ReportConfig::default()).unwrap();
        assert_eq!(stats.rows, 0);
        assert!(out.exists());
    }

    #[test]
    fn test_identical_input_yields_identical_bytes() {
        let records = sample_records();
        let layout = ReportConfig::default();
        let a = build_workbook(&records, &layout).unwrap();
        let b = build_workbook(&records, &layout).unwrap();
        assert_eq!(a, b, "workbook output must be deterministic");
    }

    #[test]
    fn test_overwrite_existing_report() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("chat_timeline.xlsx");
        std::fs::write(&out, b"stale").unwrap();
        write_report(&sample_records(), &out, &ReportConfig::default()).unwrap();
        let bytes = std::fs::read(&out).unwrap();
        assert_ne!(bytes.as_slice(), b"stale");
    }

    #[test]
    fn test_file_url_forward_slashes() {
        assert_eq!(
            file_url(Path::new("/evidence/Conv A/photo.jpg")),
            "file:///evidence/Conv A/photo.jpg"
        );
    }
}
