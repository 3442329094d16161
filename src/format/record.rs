//! Decoded record types

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::{FILE_HASH_LEN, FLAG_SAVED_FILE, FLAG_UNTITLED};

/// Tab state record decoded from one buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodedRecord {
    /// Note that only ever lived in the editor
    UntitledNote(UntitledNote),
    /// Note backed by a file on disk
    SavedFile(SavedFile),
    /// Known container with a variant flag this decoder does not handle
    Unrecognized {
        /// Raw variant flag
        flag: u64,
    },
}

impl DecodedRecord {
    /// Sequence number, if the variant was decoded
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        match self {
            Self::UntitledNote(note) => Some(note.sequence),
            Self::SavedFile(file) => Some(file.sequence),
            Self::Unrecognized { .. } => None,
        }
    }

    /// Raw variant flag
    #[must_use]
    pub fn flag(&self) -> u64 {
        match self {
            Self::UntitledNote(_) => FLAG_UNTITLED,
            Self::SavedFile(_) => FLAG_SAVED_FILE,
            Self::Unrecognized { flag } => *flag,
        }
    }

    /// Note content, if the variant was decoded
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::UntitledNote(note) => Some(&note.content),
            Self::SavedFile(file) => Some(&file.content),
            Self::Unrecognized { .. } => None,
        }
    }
}

/// In-memory note (flag 0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UntitledNote {
    /// Sequence number
    pub sequence: u64,
    /// Reserved byte after the flag, kept verbatim
    pub delimiter: u8,
    /// Selection start offset
    pub selection_start: u64,
    /// Selection end offset
    pub selection_end: u64,
    /// Word wrap enabled
    pub word_wrap: bool,
    /// Right-to-left reading order
    pub right_to_left: bool,
    /// Unicode control characters shown
    pub show_unicode_chars: bool,
    /// Opaque option bytes
    #[serde(serialize_with = "as_hex")]
    pub options: Vec<u8>,
    /// Note text with carriage returns normalized to line feeds
    pub content: String,
}

/// Disk-backed note (flag 1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    /// Sequence number
    pub sequence: u64,
    /// Path of the backing file
    pub path: String,
    /// Content length in code units recorded in the header
    pub content_length_declared: u64,
    /// Raw text encoding byte
    pub text_encoding_byte: u8,
    /// Raw line ending byte
    pub line_ending_byte: u8,
    /// File time in 100 ns ticks since 1601-01-01 UTC
    pub file_time: u64,
    /// File time as a calendar timestamp, when representable
    pub file_time_utc: Option<DateTime<Utc>>,
    /// SHA-256 of the backing file
    #[serde(serialize_with = "as_hex")]
    pub file_hash: [u8; FILE_HASH_LEN],
    /// Two bytes between the hash and the selection, kept verbatim
    #[serde(serialize_with = "as_hex")]
    pub reserved: [u8; 2],
    /// Selection start offset
    pub selection_start: u64,
    /// Selection end offset
    pub selection_end: u64,
    /// Word wrap enabled
    pub word_wrap: bool,
    /// Right-to-left reading order
    pub right_to_left: bool,
    /// Unicode control characters shown
    pub show_unicode_chars: bool,
    /// Opaque option bytes
    #[serde(serialize_with = "as_hex")]
    pub options: Vec<u8>,
    /// Unsaved buffer text with carriage returns normalized to line feeds
    pub content: String,
}

fn as_hex<S, T>(bytes: T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&hex::encode(bytes))
}
