//! Binary format of persisted tab state records
//!
//! ```text
//! offset 0  : 2 bytes  magic "NP"
//! offset 2  : varint   sequence number
//! offset .. : varint   flag (0 = untitled note, 1 = saved file)
//! ```
//!
//! The flag-specific field sequence follows; see [`RecordDecoder`].

mod decoder;
pub mod filetime;
mod reader;
mod record;

pub use decoder::{decode, DecodeLimits, RecordDecoder};
pub use reader::VarintReader;
pub use record::{DecodedRecord, SavedFile, UntitledNote};

/// File magic bytes: "NP"
pub const FILE_MAGIC: [u8; 2] = [0x4E, 0x50];

/// Flag value of an in-memory note that was never saved
pub const FLAG_UNTITLED: u64 = 0;

/// Flag value of a note backed by a file on disk
pub const FLAG_SAVED_FILE: u64 = 1;

/// Length of the file hash stored in saved-file records
pub const FILE_HASH_LEN: usize = 32;

/// Maximum number of 7-bit groups in a 64-bit varint
pub const VARINT_MAX_GROUPS: usize = 10;

/// Default ceiling for a single length-prefixed field (64 MiB)
pub const DEFAULT_MAX_FIELD_BYTES: u64 = 64 * 1024 * 1024;
