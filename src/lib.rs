//! Tabstate - forensic decoder for persisted text-editor tab state
//!
//! Decodes the `NP` records an editor writes for every open tab, recovering
//! unsaved note content and the metadata of disk-backed files. Decoding is
//! pure and all-or-nothing: each buffer yields a [`DecodedRecord`] or a
//! [`DecodeError`] naming the field that failed.

#![deny(unsafe_code)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::multiple_crate_versions
)]

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod format;
pub mod report;
pub mod scan;

pub use error::{DecodeError, Field, ReadError, Result, TabStateError};
pub use format::{decode, DecodedRecord, RecordDecoder, SavedFile, UntitledNote, VarintReader};
