//! Block/Tileset resource cache
//!
//! - blockset_data.rs: cache data, no methods
//! - blockset_operations.rs: load / reference / deref functions

pub mod blockset_data;
pub mod blockset_operations;

pub use blockset_data::{BlockData, BlocksetAsset, BlocksetCacheData, BlocksetCacheStats, BlocksetData};
pub use blockset_operations::{
    add_block_reference, block_owner_count, blockset_ref_count, create_blockset_cache,
    deduct_block_reference, deduct_blockset_reference, encode_blockset_asset, get_block,
    get_blockset, load_or_get, loaded_blockset_count, parse_blockset_asset,
};
