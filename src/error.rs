//! Error types for tabstate

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

/// Result type for tabstate operations
pub type Result<T> = std::result::Result<T, TabStateError>;

/// Errors raised by a single cursor read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Fewer bytes remain than the read requires
    #[error("unexpected end of buffer at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Cursor offset where the read started
        offset: usize,
        /// Bytes the read needed
        needed: u64,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// Varint longer than 10 groups or wider than 64 bits
    #[error("varint at offset {offset} overflows 64 bits")]
    VarintOverflow {
        /// Cursor offset of the first varint byte
        offset: usize,
    },

    /// Length field exceeds the sanity ceiling
    #[error("length {requested} exceeds limit of {limit} bytes")]
    LengthTooLarge {
        /// Requested byte count
        requested: u64,
        /// Configured ceiling
        limit: u64,
    },

    /// Ill-formed UTF-16 sequence
    #[error("ill-formed UTF-16 text at offset {offset}")]
    InvalidText {
        /// Cursor offset of the text field
        offset: usize,
    },
}

/// Named field of a tab state record, used to attribute decode failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Sequence number following the signature
    Sequence,
    /// Variant flag
    Flag,
    /// Untitled-note delimiter byte
    Delimiter,
    /// Saved-file path length
    PathLength,
    /// Saved-file path text
    Path,
    /// Declared content length in the saved-file header
    ContentLengthDeclared,
    /// Text encoding byte
    TextEncoding,
    /// Line ending byte
    LineEnding,
    /// File time ticks
    FileTime,
    /// SHA-256 of the file on disk
    FileHash,
    /// Two reserved bytes after the hash
    Reserved,
    /// Selection start offset
    SelectionStart,
    /// Selection end offset
    SelectionEnd,
    /// Word wrap byte
    WordWrap,
    /// Right-to-left byte
    RightToLeft,
    /// Show unicode control characters byte
    ShowUnicodeChars,
    /// Option byte count
    OptionCount,
    /// Option bytes
    Options,
    /// Content length in UTF-16 code units
    ContentLength,
    /// Content text
    Content,
}

impl Field {
    /// Stable snake_case name of the field
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::Flag => "flag",
            Self::Delimiter => "delimiter",
            Self::PathLength => "path_length",
            Self::Path => "path",
            Self::ContentLengthDeclared => "content_length_declared",
            Self::TextEncoding => "text_encoding",
            Self::LineEnding => "line_ending",
            Self::FileTime => "file_time",
            Self::FileHash => "file_hash",
            Self::Reserved => "reserved",
            Self::SelectionStart => "selection_start",
            Self::SelectionEnd => "selection_end",
            Self::WordWrap => "word_wrap",
            Self::RightToLeft => "right_to_left",
            Self::ShowUnicodeChars => "show_unicode_chars",
            Self::OptionCount => "option_count",
            Self::Options => "options",
            Self::ContentLength => "content_length",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort the decode of one buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Buffer does not start with the `NP` signature
    #[error("bad signature: expected \"NP\", got {found:02x?}")]
    BadSignature {
        /// Up to the first two bytes of the buffer
        found: Vec<u8>,
    },

    /// A named field could not be read
    #[error("failed to read field `{field}`: {cause}")]
    FieldFailure {
        /// Field being read
        field: Field,
        /// Underlying read error
        #[source]
        cause: ReadError,
    },
}

impl DecodeError {
    /// Field that failed, if the signature was valid
    #[must_use]
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::BadSignature { .. } => None,
            Self::FieldFailure { field, .. } => Some(*field),
        }
    }

    /// Underlying cursor error, if any
    #[must_use]
    pub fn root_cause(&self) -> Option<&ReadError> {
        match self {
            Self::BadSignature { .. } => None,
            Self::FieldFailure { cause, .. } => Some(cause),
        }
    }
}

/// Errors that can occur in tabstate
#[derive(Debug, Error)]
pub enum TabStateError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Record could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// TabState directory missing or unusable
    #[error("TabState directory not found: {0}")]
    DirectoryNotFound(String),

    /// Report serialization failed
    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),
}
