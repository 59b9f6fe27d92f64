//! Little-endian record reader
//!
//! Every read reports the asset path and byte offset on failure so corrupted
//! bundles can be tracked down from the log.

use super::AssetError;
use std::io::{Cursor, Read};

pub struct AssetReader<'a> {
    path: &'a str,
    cursor: Cursor<&'a [u8]>,
}

impl<'a> AssetReader<'a> {
    pub fn new(path: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            path,
            cursor: Cursor::new(bytes),
        }
    }

    pub fn path(&self) -> &str {
        self.path
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], AssetError> {
        let offset = self.cursor.position();
        let mut buf = [0u8; N];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| AssetError::Truncated {
                path: self.path.to_string(),
                offset,
            })?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, AssetError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, AssetError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, AssetError> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, AssetError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// NUL-terminated UTF-8 string
    pub fn read_cstring(&mut self) -> Result<String, AssetError> {
        let start = self.cursor.position();
        let mut bytes = Vec::new();
        loop {
            let b = self.read_u8()?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        String::from_utf8(bytes).map_err(|_| AssetError::MalformedString {
            path: self.path.to_string(),
            offset: start,
        })
    }

    /// Build an `InvalidValue` error for an enum/field this reader just decoded
    pub fn invalid(&self, field: &'static str, value: u32) -> AssetError {
        AssetError::InvalidValue {
            path: self.path.to_string(),
            field,
            value,
        }
    }
}
