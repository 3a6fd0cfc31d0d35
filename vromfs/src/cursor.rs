use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Typed, bounds-checked reads over a borrowed byte slice.
///
/// All multi-byte integers in the container format are little-endian; this
/// cursor only ever reads LE, matching §9 of the format notes.
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn at(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.bytes.len().saturating_sub(self.pos);
        if len > available {
            return Err(Error::Truncated {
                offset: self.pos,
                needed: len,
                available,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    pub fn read_array4(&mut self) -> Result<[u8; 4]> {
        let slice = self.take(4)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let slice = self.take(2)?;
        Ok(LittleEndian::read_u16(slice))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let slice = self.take(4)?;
        Ok(LittleEndian::read_u32(slice))
    }

    /// Reads the rest of the buffer, consuming the cursor.
    pub fn read_remainder(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }
}

/// Reads a null-terminated byte string starting at `offset` within `bytes`.
/// Returns the string's bytes (excluding the terminator) and the offset of
/// the byte immediately after the terminator.
pub fn read_cstr(bytes: &[u8], offset: usize) -> Result<(&[u8], usize)> {
    let tail = bytes.get(offset..).ok_or(Error::Truncated {
        offset,
        needed: 1,
        available: 0,
    })?;
    match tail.iter().position(|&b| b == 0) {
        Some(len) => Ok((&tail[..len], offset + len + 1)),
        None => Err(Error::Truncated {
            offset,
            needed: tail.len() + 1,
            available: tail.len(),
        }),
    }
}

/// Reads a fixed-size array out of `bytes` at `offset`, bounds-checked.
pub fn read_fixed<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    let slice = bytes.get(offset..offset + N).ok_or(Error::Truncated {
        offset,
        needed: N,
        available: bytes.len().saturating_sub(offset),
    })?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}
