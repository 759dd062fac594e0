//! Extend Read and Write with some convenience methods for binary i/o
//!
use std::io::{self, Read, Write};

use unsigned_varint::{
    encode::{u64 as varint_encode_u64, u64_buffer as varint_u64_buffer},
    io::read_u64 as varint_read_u64,
};

use crate::errors::{Error, Result};

pub(crate) trait Serialize: Sized {
    /// Write self to a stream
    fn write_to(&self, stream: &mut impl Write) -> Result<()>;

    /// Read Self from a stream
    fn read_from(stream: &mut impl Read) -> Result<Self>;
}

pub(crate) trait ExtendedRead: Read {
    /// Read a byte from a stream
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Read a Big Endian encoded 16 bit unsigned integer from a stream
    fn read_u16(&mut self) -> io::Result<u16>;

    /// Read a Big Endian encoded 32 bit unsigned integer from a stream
    fn read_u32(&mut self) -> io::Result<u32>;

    /// Read a Big Endian encoded 32 bit signed integer from a stream
    fn read_i32(&mut self) -> io::Result<i32>;

    /// Read a Big Endian encoded 64 bit signed integer from a stream
    fn read_i64(&mut self) -> io::Result<i64>;

    /// Read a Big Endian encoded 32 bit float from a stream
    fn read_f32(&mut self) -> io::Result<f32>;

    /// Read a Big Endian encoded 64 bit float from a stream
    fn read_f64(&mut self) -> io::Result<f64>;

    /// Read a varint encoded length prefix from a stream
    fn read_length(&mut self) -> Result<usize>;

    /// Read a length prefixed byte string from a stream
    fn read_bytes(&mut self) -> Result<Vec<u8>>;

    /// Read a length prefixed UTF-8 string from a stream
    fn read_string(&mut self) -> Result<String>;
}

impl<R: Read> ExtendedRead for R {
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut buffer = [0; 1];
        self.read_exact(&mut buffer)?;

        Ok(buffer[0])
    }

    fn read_u16(&mut self) -> io::Result<u16> {
        let mut buffer = [0; 2];
        self.read_exact(&mut buffer)?;

        Ok(u16::from_be_bytes(buffer))
    }

    fn read_u32(&mut self) -> io::Result<u32> {
        let mut buffer = [0; 4];
        self.read_exact(&mut buffer)?;

        Ok(u32::from_be_bytes(buffer))
    }

    fn read_i32(&mut self) -> io::Result<i32> {
        let mut buffer = [0; 4];
        self.read_exact(&mut buffer)?;

        Ok(i32::from_be_bytes(buffer))
    }

    fn read_i64(&mut self) -> io::Result<i64> {
        let mut buffer = [0; 8];
        self.read_exact(&mut buffer)?;

        Ok(i64::from_be_bytes(buffer))
    }

    fn read_f32(&mut self) -> io::Result<f32> {
        let mut buffer = [0; 4];
        self.read_exact(&mut buffer)?;

        Ok(f32::from_be_bytes(buffer))
    }

    fn read_f64(&mut self) -> io::Result<f64> {
        let mut buffer = [0; 8];
        self.read_exact(&mut buffer)?;

        Ok(f64::from_be_bytes(buffer))
    }

    fn read_length(&mut self) -> Result<usize> {
        let length = varint_read_u64(&mut *self)
            .map_err(|err| Error::Load(format!("bad length prefix: {err}")))?;

        usize::try_from(length).map_err(|_| Error::Load(format!("length out of range: {length}")))
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let length = self.read_length()?;
        let mut buffer = vec![0; length];
        self.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;

        String::from_utf8(bytes).map_err(|err| Error::Load(err.to_string()))
    }
}

pub(crate) trait ExtendedWrite: Write {
    /// Write a byte to a stream
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Write a Big Endian encoded 16 bit unsigned integer to a stream
    fn write_u16(&mut self, word: u16) -> io::Result<()>;

    /// Write a Big Endian encoded 32 bit unsigned integer to a stream
    fn write_u32(&mut self, word: u32) -> io::Result<()>;

    /// Write a Big Endian encoded 32 bit signed integer to a stream
    fn write_i32(&mut self, word: i32) -> io::Result<()>;

    /// Write a Big Endian encoded 64 bit signed integer to a stream
    fn write_i64(&mut self, word: i64) -> io::Result<()>;

    /// Write a Big Endian encoded 32 bit float to a stream
    fn write_f32(&mut self, word: f32) -> io::Result<()>;

    /// Write a Big Endian encoded 64 bit float to a stream
    fn write_f64(&mut self, word: f64) -> io::Result<()>;

    /// Write a varint encoded length prefix to a stream
    fn write_length(&mut self, length: usize) -> io::Result<()>;

    /// Write a length prefixed byte string to a stream
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Write a length prefixed UTF-8 string to a stream
    fn write_string(&mut self, string: &str) -> io::Result<()>;
}

impl<W: Write> ExtendedWrite for W {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        let buffer = [byte];
        self.write_all(&buffer)?;

        Ok(())
    }

    fn write_u16(&mut self, word: u16) -> io::Result<()> {
        let buffer = word.to_be_bytes();
        self.write_all(&buffer)?;

        Ok(())
    }

    fn write_u32(&mut self, word: u32) -> io::Result<()> {
        let buffer = word.to_be_bytes();
        self.write_all(&buffer)?;

        Ok(())
    }

    fn write_i32(&mut self, word: i32) -> io::Result<()> {
        let buffer = word.to_be_bytes();
        self.write_all(&buffer)?;

        Ok(())
    }

    fn write_i64(&mut self, word: i64) -> io::Result<()> {
        let buffer = word.to_be_bytes();
        self.write_all(&buffer)?;

        Ok(())
    }

    fn write_f32(&mut self, word: f32) -> io::Result<()> {
        let buffer = word.to_be_bytes();
        self.write_all(&buffer)?;

        Ok(())
    }

    fn write_f64(&mut self, word: f64) -> io::Result<()> {
        let buffer = word.to_be_bytes();
        self.write_all(&buffer)?;

        Ok(())
    }

    fn write_length(&mut self, length: usize) -> io::Result<()> {
        let mut buffer = varint_u64_buffer();
        self.write_all(varint_encode_u64(length as u64, &mut buffer))?;

        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_length(bytes.len())?;
        self.write_all(bytes)?;

        Ok(())
    }

    fn write_string(&mut self, string: &str) -> io::Result<()> {
        self.write_bytes(string.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_all_of_it() -> Result<()> {
        let mut buffer: Vec<u8> = Vec::new();
        buffer.write_byte(42)?;
        buffer.write_u16(41968)?;
        buffer.write_u32(31441968)?;
        buffer.write_i32(-31441968)?;
        buffer.write_i64(-31441968314419)?;
        buffer.write_f32(3.141592)?;
        buffer.write_f64(6.283184)?;
        buffer.write_length(1 << 20)?;
        buffer.write_bytes(b"\x00\x01\x02")?;
        buffer.write_string("temperature")?;

        let mut buffer = Cursor::new(buffer);
        assert_eq!(buffer.read_byte()?, 42);
        assert_eq!(buffer.read_u16()?, 41968);
        assert_eq!(buffer.read_u32()?, 31441968);
        assert_eq!(buffer.read_i32()?, -31441968);
        assert_eq!(buffer.read_i64()?, -31441968314419);
        assert_eq!(buffer.read_f32()?, 3.141592);
        assert_eq!(buffer.read_f64()?, 6.283184);
        assert_eq!(buffer.read_length()?, 1 << 20);
        assert_eq!(buffer.read_bytes()?, b"\x00\x01\x02");
        assert_eq!(buffer.read_string()?, "temperature");

        Ok(())
    }

    #[test]
    fn truncated_string() {
        let mut buffer: Vec<u8> = Vec::new();
        buffer.write_length(12).unwrap();
        buffer.extend_from_slice(b"temp");

        let result = Cursor::new(buffer).read_string();
        assert!(matches!(result, Err(Error::IO(_))));
    }
}
