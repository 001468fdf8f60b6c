//! Cursor-based reader for response datagrams
//!
//! Query responses are flat little-endian payloads mixing fixed-width fields
//! with null-terminated strings, so decoding is a linear walk over the
//! buffer. The reader tracks the current offset and checks the remaining
//! length before every read, turning short packets into a typed
//! [`TruncatedPacket`] error instead of an index panic.

use thiserror::Error;

/// A mandatory field extended past the end of the datagram.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("packet truncated at offset {offset} while reading {field}")]
pub struct TruncatedPacket {
    /// Byte offset the failed read started at
    pub offset: usize,
    /// Which field was being decoded
    pub field: &'static str,
}

/// Sequential reader over one received datagram.
#[derive(Debug)]
pub struct PacketReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], TruncatedPacket> {
        if self.remaining() < n {
            return Err(TruncatedPacket {
                offset: self.pos,
                field,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Advances the cursor past `n` bytes without decoding them.
    pub fn skip(&mut self, n: usize, field: &'static str) -> Result<(), TruncatedPacket> {
        self.take(n, field).map(|_| ())
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, TruncatedPacket> {
        Ok(self.take(1, field)?[0])
    }

    pub fn read_u16_le(&mut self, field: &'static str) -> Result<u16, TruncatedPacket> {
        let b = self.take(2, field)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_i32_le(&mut self, field: &'static str) -> Result<i32, TruncatedPacket> {
        let b = self.take(4, field)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_f32_le(&mut self, field: &'static str) -> Result<f32, TruncatedPacket> {
        let b = self.take(4, field)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads up to the next 0x00 terminator and consumes it.
    ///
    /// Server-controlled strings are not guaranteed to be valid UTF-8, so
    /// invalid sequences are replaced rather than rejected.
    pub fn read_cstring(&mut self, field: &'static str) -> Result<String, TruncatedPacket> {
        let rest = &self.buf[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(TruncatedPacket {
                offset: self.pos,
                field,
            })?;
        let value = String::from_utf8_lossy(&rest[..end]).into_owned();
        self.pos += end + 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_read_fixed_width_fields() {
        let buf = [0x07, 0x34, 0x12, 0xFE, 0xFF, 0xFF, 0xFF];
        let mut reader = PacketReader::new(&buf);

        assert_eq!(reader.read_u8("byte").unwrap(), 0x07);
        assert_eq!(reader.read_u16_le("word").unwrap(), 0x1234);
        assert_eq!(reader.read_i32_le("dword").unwrap(), -2);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_f32_le() {
        let buf = 12.5f32.to_le_bytes();
        let mut reader = PacketReader::new(&buf);
        assert_approx_eq!(reader.read_f32_le("float").unwrap(), 12.5);
    }

    #[test]
    fn test_read_cstring() {
        let buf = b"de_dust2\0trailing";
        let mut reader = PacketReader::new(buf);

        assert_eq!(reader.read_cstring("map").unwrap(), "de_dust2");
        assert_eq!(reader.position(), 9);
        assert_eq!(reader.remaining(), 8);
    }

    #[test]
    fn test_read_empty_cstring() {
        let buf = [0x00, 0x41];
        let mut reader = PacketReader::new(&buf);

        assert_eq!(reader.read_cstring("name").unwrap(), "");
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_cstring_invalid_utf8_is_lossy() {
        let buf = [0x61, 0xFF, 0x62, 0x00];
        let mut reader = PacketReader::new(&buf);

        let value = reader.read_cstring("name").unwrap();
        assert_eq!(value, "a\u{FFFD}b");
    }

    #[test]
    fn test_missing_terminator_is_truncation() {
        let buf = b"no terminator here";
        let mut reader = PacketReader::new(buf);

        let err = reader.read_cstring("name").unwrap_err();
        assert_eq!(err.offset, 0);
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_fixed_width_past_end_is_truncation() {
        let buf = [0x01, 0x02];
        let mut reader = PacketReader::new(&buf);

        reader.read_u8("first").unwrap();
        let err = reader.read_i32_le("score").unwrap_err();
        assert_eq!(err.offset, 1);
        assert_eq!(err.field, "score");
        // Failed read must not move the cursor
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_skip_advances_cursor() {
        let buf = [0u8; 10];
        let mut reader = PacketReader::new(&buf);

        reader.skip(4, "header").unwrap();
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.remaining(), 6);

        let err = reader.skip(7, "body").unwrap_err();
        assert_eq!(err.offset, 4);
    }
}
