//! Bounds-checked sequential reader over an immutable byte buffer

use super::errors::{AuthDataField, WebAuthnError};

/// Read position over a borrowed buffer
///
/// Every read either returns exactly the requested bytes or fails with
/// [`WebAuthnError::TruncatedBuffer`] naming the field being read.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Take the next `n` bytes and advance past them
    ///
    /// # Errors
    /// Returns `TruncatedBuffer` if fewer than `n` bytes remain
    pub fn take_bytes(
        &mut self,
        n: usize,
        field: AuthDataField,
    ) -> Result<&'a [u8], WebAuthnError> {
        let available = self.buf.len() - self.pos;
        if available < n {
            return Err(WebAuthnError::TruncatedBuffer {
                field,
                needed: n,
                available,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Take exactly `N` bytes as an owned array
    ///
    /// # Errors
    /// Returns `TruncatedBuffer` if fewer than `N` bytes remain
    pub fn take_array<const N: usize>(
        &mut self,
        field: AuthDataField,
    ) -> Result<[u8; N], WebAuthnError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take_bytes(N, field)?);
        Ok(out)
    }

    /// # Errors
    /// Returns `TruncatedBuffer` if the buffer is exhausted
    pub fn take_u8(&mut self, field: AuthDataField) -> Result<u8, WebAuthnError> {
        let [byte] = self.take_array::<1>(field)?;
        Ok(byte)
    }

    /// # Errors
    /// Returns `TruncatedBuffer` if fewer than 2 bytes remain
    pub fn take_u16_be(&mut self, field: AuthDataField) -> Result<u16, WebAuthnError> {
        Ok(u16::from_be_bytes(self.take_array(field)?))
    }

    /// # Errors
    /// Returns `TruncatedBuffer` if fewer than 4 bytes remain
    pub fn take_u32_be(&mut self, field: AuthDataField) -> Result<u32, WebAuthnError> {
        Ok(u32::from_be_bytes(self.take_array(field)?))
    }

    /// All bytes from the current position to the end, without advancing
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}
