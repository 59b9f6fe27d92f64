//! Blockset Cache Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in blockset_operations.rs

use crate::world::core::{BlocksetId, LayoutId, TextureHandle};
use rustc_hash::FxHashMap;

/// Decoded blockset record, before it enters the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocksetAsset {
    pub name: String,
    pub tiles_per_block: u8,
    /// One entry per block, `tiles_per_block` tile indices each
    pub blocks: Vec<Vec<u16>>,
}

/// A shared block inside a loaded blockset
#[derive(Debug, Clone)]
pub struct BlockData {
    pub tiles: Vec<u16>,
    /// Distinct layouts currently using this block
    pub owners: Vec<LayoutId>,
    /// Present exactly while `owners` is non-empty
    pub texture: Option<TextureHandle>,
}

/// A loaded blockset
#[derive(Debug, Clone)]
pub struct BlocksetData {
    pub id: BlocksetId,
    pub name: String,
    pub tiles_per_block: u8,
    pub blocks: Vec<BlockData>,
    pub ref_count: u32,
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default)]
pub struct BlocksetCacheStats {
    pub loads: u64,
    pub hits: u64,
    pub evictions: u64,
    pub live_textures: u32,
    pub textures_released: u64,
}

/// Blockset cache data
#[derive(Debug, Default)]
pub struct BlocksetCacheData {
    pub blocksets: FxHashMap<BlocksetId, BlocksetData>,
    pub next_texture: u32,
    pub stats: BlocksetCacheStats,
}
