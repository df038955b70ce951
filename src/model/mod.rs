//! Core data model types for chat messages, senders, and attachment references.

pub mod record;
pub mod sender;
