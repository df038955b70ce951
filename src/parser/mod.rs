//! Container parsing: per-conversation `messages.json` extraction and the
//! export's timestamp format.

pub mod container;
pub mod datetime;
