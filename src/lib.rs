//! `chatline` — flatten a Google Chat legal-export tree into one timeline.
//!
//! This crate provides the core library for walking an extracted data-return
//! tree, parsing per-conversation `messages.json` containers, and writing a
//! single sorted XLSX timeline with attachment links.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod timeline;
pub mod walker;
