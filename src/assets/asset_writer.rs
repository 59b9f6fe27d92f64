//! Little-endian record writer
//!
//! Mirror of `AssetReader`, used by bundle tooling and fixtures.

#[derive(Debug, Default, Clone)]
pub struct AssetWriter {
    bytes: Vec<u8>,
}

impl AssetWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_i16(&mut self, value: i16) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Writes the string followed by a NUL byte. Interior NULs are dropped.
    pub fn write_cstring(&mut self, value: &str) -> &mut Self {
        self.bytes.extend(value.bytes().filter(|b| *b != 0));
        self.bytes.push(0);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}
