//! Human-readable and JSON rendering of scan results

use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::error::{DecodeError, Field};
use crate::format::DecodedRecord;
use crate::scan::{ScanEntry, ScanFailure};
use crate::Result;

const CONTENT_OPEN: &str = "=== Note Content ===";
const CONTENT_CLOSE: &str = "====================";

/// Render one entry in the console layout
#[must_use]
pub fn render_text(entry: &ScanEntry) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_entry(&mut out, entry);
    out
}

fn write_entry(out: &mut String, entry: &ScanEntry) -> fmt::Result {
    writeln!(out, "[*] Processing File: {}", entry.file_name)?;

    match &entry.outcome {
        Ok(DecodedRecord::UntitledNote(note)) => {
            writeln!(out, "|-> Type: Untitled Note")?;
            writeln!(out, "|-> Sequence: {}", note.sequence)?;
            write_content(out, &note.content)
        }
        Ok(DecodedRecord::SavedFile(file)) => {
            writeln!(out, "|-> Type: Saved File")?;
            writeln!(out, "|-> Sequence: {}", file.sequence)?;
            writeln!(out, "|-> Path: {}", file.path)?;
            writeln!(
                out,
                "|-> Content Length: {} code units",
                file.content_length_declared
            )?;
            match file.file_time_utc {
                Some(time) => writeln!(
                    out,
                    "|-> File time: {} UTC",
                    time.format("%Y-%m-%d %H:%M:%S")
                )?,
                None => writeln!(
                    out,
                    "|-> File time: {} ticks (out of range)",
                    file.file_time
                )?,
            }
            writeln!(out, "|-> File hash: {}", hex::encode(file.file_hash))?;
            write_content(out, &file.content)
        }
        Ok(DecodedRecord::Unrecognized { flag }) => {
            writeln!(out, "[-] Unknown TypeFlag encountered: {flag}")
        }
        Err(ScanFailure::Decode(e @ DecodeError::BadSignature { .. })) => {
            writeln!(out, "[-] File does not have the correct NP signature ({e})")
        }
        Err(e) => writeln!(out, "[!] Error reading file '{}': {e}", entry.file_name),
    }
}

fn write_content(out: &mut String, content: &str) -> fmt::Result {
    writeln!(out, "|-> Content: {} characters", content.chars().count())?;
    writeln!(out, "{CONTENT_OPEN}")?;
    writeln!(out, "{content}")?;
    writeln!(out, "{CONTENT_CLOSE}")
}

/// One entry as serialized to JSON
#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    file_name: &'a str,
    path: String,
    size: u64,
    sha256: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a DecodedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
}

#[derive(Debug, Serialize)]
struct JsonError {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<Field>,
    message: String,
}

impl From<&ScanFailure> for JsonError {
    fn from(failure: &ScanFailure) -> Self {
        let (kind, field) = match failure {
            ScanFailure::Io(_) => ("io", None),
            ScanFailure::TooLarge { .. } => ("too_large", None),
            ScanFailure::Decode(e) => match e.field() {
                Some(field) => ("field_failure", Some(field)),
                None => ("bad_signature", None),
            },
        };

        Self {
            kind,
            field,
            message: failure.to_string(),
        }
    }
}

impl<'a> From<&'a ScanEntry> for JsonEntry<'a> {
    fn from(entry: &'a ScanEntry) -> Self {
        Self {
            file_name: &entry.file_name,
            path: entry.path.display().to_string(),
            size: entry.size,
            sha256: entry.sha256.as_deref(),
            record: entry.outcome.as_ref().ok(),
            error: entry.outcome.as_ref().err().map(JsonError::from),
        }
    }
}

/// Render entries as a pretty-printed JSON array
///
/// # Errors
///
/// Returns error if serialization fails
pub fn render_json(entries: &[ScanEntry]) -> Result<String> {
    let view: Vec<JsonEntry<'_>> = entries.iter().map(JsonEntry::from).collect();
    Ok(serde_json::to_string_pretty(&view)?)
}
