//! Record decoder: signature check, variant dispatch and field sequences

use crate::error::{DecodeError, Field, ReadError};

use super::reader::VarintReader;
use super::record::{DecodedRecord, SavedFile, UntitledNote};
use super::{filetime, DEFAULT_MAX_FIELD_BYTES, FILE_MAGIC, FLAG_SAVED_FILE, FLAG_UNTITLED};

/// Decoder limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Ceiling for a single length-prefixed field in bytes
    pub max_field_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_field_bytes: DEFAULT_MAX_FIELD_BYTES,
        }
    }
}

/// Stateless decoder for tab state buffers
///
/// Each call borrows its buffer for the duration of the call only, so one
/// decoder can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordDecoder {
    limits: DecodeLimits,
}

/// Decode one buffer with default limits
///
/// # Errors
///
/// See [`RecordDecoder::decode`]
pub fn decode(buf: &[u8]) -> Result<DecodedRecord, DecodeError> {
    RecordDecoder::default().decode(buf)
}

/// Attach the field name to a read result
trait FieldContext<T> {
    fn field(self, field: Field) -> Result<T, DecodeError>;
}

impl<T> FieldContext<T> for Result<T, ReadError> {
    fn field(self, field: Field) -> Result<T, DecodeError> {
        self.map_err(|cause| DecodeError::FieldFailure { field, cause })
    }
}

/// Selection, view flags, options and content: the tail both variants share
struct ViewState {
    selection_start: u64,
    selection_end: u64,
    word_wrap: bool,
    right_to_left: bool,
    show_unicode_chars: bool,
    options: Vec<u8>,
    content: String,
}

impl RecordDecoder {
    /// Create a decoder with custom limits
    #[must_use]
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }

    /// Limits in effect
    #[must_use]
    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }

    /// Decode one buffer
    ///
    /// Unknown variant flags yield [`DecodedRecord::Unrecognized`] without
    /// reading past the flag.
    ///
    /// # Errors
    ///
    /// Returns `BadSignature` if the buffer does not start with `NP`, or
    /// `FieldFailure` naming the first field that could not be read
    pub fn decode(&self, buf: &[u8]) -> Result<DecodedRecord, DecodeError> {
        let mut reader = VarintReader::with_limit(buf, self.limits.max_field_bytes);
        match reader.read_array::<2>() {
            Ok(magic) if magic == FILE_MAGIC => {}
            _ => {
                return Err(DecodeError::BadSignature {
                    found: buf.iter().take(FILE_MAGIC.len()).copied().collect(),
                })
            }
        }

        let sequence = reader.read_varint().field(Field::Sequence)?;
        let flag = reader.read_varint().field(Field::Flag)?;

        match flag {
            FLAG_UNTITLED => Self::untitled_note(&mut reader, sequence)
                .map(DecodedRecord::UntitledNote),
            FLAG_SAVED_FILE => {
                Self::saved_file(&mut reader, sequence).map(DecodedRecord::SavedFile)
            }
            flag => Ok(DecodedRecord::Unrecognized { flag }),
        }
    }

    fn untitled_note(
        reader: &mut VarintReader<'_>,
        sequence: u64,
    ) -> Result<UntitledNote, DecodeError> {
        let delimiter = reader.read_u8().field(Field::Delimiter)?;
        let view = Self::view_state(reader)?;

        Ok(UntitledNote {
            sequence,
            delimiter,
            selection_start: view.selection_start,
            selection_end: view.selection_end,
            word_wrap: view.word_wrap,
            right_to_left: view.right_to_left,
            show_unicode_chars: view.show_unicode_chars,
            options: view.options,
            content: view.content,
        })
    }

    fn saved_file(
        reader: &mut VarintReader<'_>,
        sequence: u64,
    ) -> Result<SavedFile, DecodeError> {
        let path_length = reader.read_varint().field(Field::PathLength)?;
        let path = reader.read_utf16le_text(path_length).field(Field::Path)?;
        let content_length_declared = reader.read_varint().field(Field::ContentLengthDeclared)?;
        let text_encoding_byte = reader.read_u8().field(Field::TextEncoding)?;
        let line_ending_byte = reader.read_u8().field(Field::LineEnding)?;
        let file_time = reader.read_varint().field(Field::FileTime)?;
        let file_hash = reader.read_array().field(Field::FileHash)?;
        let reserved = reader.read_array().field(Field::Reserved)?;
        let view = Self::view_state(reader)?;

        Ok(SavedFile {
            sequence,
            path,
            content_length_declared,
            text_encoding_byte,
            line_ending_byte,
            file_time,
            file_time_utc: filetime::to_utc(file_time),
            file_hash,
            reserved,
            selection_start: view.selection_start,
            selection_end: view.selection_end,
            word_wrap: view.word_wrap,
            right_to_left: view.right_to_left,
            show_unicode_chars: view.show_unicode_chars,
            options: view.options,
            content: view.content,
        })
    }

    fn view_state(reader: &mut VarintReader<'_>) -> Result<ViewState, DecodeError> {
        let selection_start = reader.read_varint().field(Field::SelectionStart)?;
        let selection_end = reader.read_varint().field(Field::SelectionEnd)?;
        let word_wrap = reader.read_u8().field(Field::WordWrap)? != 0;
        let right_to_left = reader.read_u8().field(Field::RightToLeft)? != 0;
        let show_unicode_chars = reader.read_u8().field(Field::ShowUnicodeChars)? != 0;
        let option_count = reader.read_varint().field(Field::OptionCount)?;
        let options = reader.read_bytes(option_count).field(Field::Options)?.to_vec();
        let content_length = reader.read_varint().field(Field::ContentLength)?;
        let content = reader
            .read_utf16le_text(content_length)
            .field(Field::Content)?;

        Ok(ViewState {
            selection_start,
            selection_end,
            word_wrap,
            right_to_left,
            show_unicode_chars,
            options,
            content,
        })
    }
}
