//! Asset Module - static asset bundle access
//!
//! The core never decodes images or audio. It only reads small fixed-layout
//! binary records (map headers, layouts, events, blocksets, ...) through the
//! `AssetSource` collaborator.
//!
//! - asset_source.rs: where bytes come from
//! - asset_reader.rs: little-endian record reader
//! - asset_writer.rs: matching writer for tooling

pub mod asset_reader;
pub mod asset_source;
pub mod asset_writer;

pub use asset_reader::AssetReader;
pub use asset_source::{AssetSource, DirectoryAssetSource, MemoryAssetSource};
pub use asset_writer::AssetWriter;

/// Asset layer errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {path}")]
    NotFound { path: String },

    #[error("IO error reading {path}: {error}")]
    Io { path: String, error: String },

    #[error("Asset {path} truncated at byte {offset}")]
    Truncated { path: String, offset: u64 },

    #[error("Asset {path} has invalid {field} value {value}")]
    InvalidValue {
        path: String,
        field: &'static str,
        value: u32,
    },

    #[error("Asset {path} has malformed string at byte {offset}")]
    MalformedString { path: String, offset: u64 },
}

/// Asset paths by record kind. Ids are zero-padded to four digits.
pub mod paths {
    pub fn map(id: u16) -> String {
        format!("maps/{:04}.map", id)
    }

    pub fn layout(id: u16) -> String {
        format!("layouts/{:04}.layout", id)
    }

    pub fn events(id: u16) -> String {
        format!("events/{:04}.events", id)
    }

    pub fn details(id: u16) -> String {
        format!("details/{:04}.details", id)
    }

    pub fn encounters(id: u16) -> String {
        format!("encounters/{:04}.encounters", id)
    }

    pub fn encounter_table(id: u16) -> String {
        format!("encounter_tables/{:04}.table", id)
    }

    pub fn blockset(id: u16) -> String {
        format!("blocksets/{:04}.blockset", id)
    }
}
