//! Bounds-checked cursor over a borrowed record buffer

use crate::error::ReadError;

use super::{DEFAULT_MAX_FIELD_BYTES, VARINT_MAX_GROUPS};

/// Cursor over a byte slice decoding varints and length-prefixed fields
///
/// Every read either succeeds and advances the cursor, or fails and leaves
/// it where it was. The offset never moves past the end of the buffer.
#[derive(Debug, Clone)]
pub struct VarintReader<'a> {
    buf: &'a [u8],
    pos: usize,
    max_field_bytes: u64,
}

impl<'a> VarintReader<'a> {
    /// Create a reader at offset 0 with the default field ceiling
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_limit(buf, DEFAULT_MAX_FIELD_BYTES)
    }

    /// Create a reader with a custom ceiling for length-prefixed fields
    #[must_use]
    pub fn with_limit(buf: &'a [u8], max_field_bytes: u64) -> Self {
        Self {
            buf,
            pos: 0,
            max_field_bytes,
        }
    }

    /// Current cursor offset
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the cursor is at the end of the buffer
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn eof(&self, needed: u64) -> ReadError {
        ReadError::UnexpectedEof {
            offset: self.pos,
            needed,
            remaining: self.remaining(),
        }
    }

    /// Read one byte
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if the cursor is at the end
    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        let byte = *self.buf.get(self.pos).ok_or_else(|| self.eof(1))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read an unsigned base-128 varint, low-order group first
    ///
    /// Non-canonical encodings with trailing zero groups are accepted up to
    /// the 10-group ceiling.
    ///
    /// # Errors
    ///
    /// Returns `VarintOverflow` if the value needs more than 64 bits and
    /// `UnexpectedEof` if the buffer ends with the continuation bit set
    pub fn read_varint(&mut self) -> Result<u64, ReadError> {
        let start = self.pos;
        let mut value = 0u64;

        for group in 0..VARINT_MAX_GROUPS {
            let Some(&byte) = self.buf.get(start + group) else {
                return Err(ReadError::UnexpectedEof {
                    offset: start,
                    needed: group as u64 + 1,
                    remaining: self.remaining(),
                });
            };
            let chunk = u64::from(byte & 0x7F);

            // The tenth group holds only bit 63
            if group == VARINT_MAX_GROUPS - 1 && (chunk > 1 || byte & 0x80 != 0) {
                return Err(ReadError::VarintOverflow { offset: start });
            }

            value |= chunk << (7 * group);

            if byte & 0x80 == 0 {
                self.pos = start + group + 1;
                return Ok(value);
            }
        }

        Err(ReadError::VarintOverflow { offset: start })
    }

    /// Borrow the next `n` bytes
    ///
    /// # Errors
    ///
    /// Returns `LengthTooLarge` if `n` exceeds the field ceiling and
    /// `UnexpectedEof` if fewer than `n` bytes remain
    pub fn read_bytes(&mut self, n: u64) -> Result<&'a [u8], ReadError> {
        if n > self.max_field_bytes {
            return Err(ReadError::LengthTooLarge {
                requested: n,
                limit: self.max_field_bytes,
            });
        }
        let len = usize::try_from(n).map_err(|_| ReadError::LengthTooLarge {
            requested: n,
            limit: usize::MAX as u64,
        })?;
        if len > self.remaining() {
            return Err(self.eof(n));
        }

        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a fixed-size array, bypassing the field ceiling
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if fewer than `N` bytes remain
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        if N > self.remaining() {
            return Err(self.eof(N as u64));
        }

        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Read `code_units` UTF-16LE code units as text
    ///
    /// Every carriage return becomes a line feed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidText` on unpaired surrogates, or any error of
    /// [`read_bytes`](Self::read_bytes) for `2 * code_units` bytes
    pub fn read_utf16le_text(&mut self, code_units: u64) -> Result<String, ReadError> {
        let byte_len = code_units
            .checked_mul(2)
            .ok_or(ReadError::LengthTooLarge {
                requested: code_units,
                limit: self.max_field_bytes,
            })?;

        let start = self.pos;
        let bytes = self.read_bytes(byte_len)?;
        let units = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));

        match char::decode_utf16(units)
            .map(|c| c.map(|c| if c == '\r' { '\n' } else { c }))
            .collect::<Result<String, _>>()
        {
            Ok(text) => Ok(text),
            Err(_) => {
                self.pos = start;
                Err(ReadError::InvalidText { offset: start })
            }
        }
    }
}
