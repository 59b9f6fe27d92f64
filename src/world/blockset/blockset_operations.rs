//! Blockset Cache Operations - DOP Functions
//!
//! Blocksets are counted once per layout that loads them. Blocks are counted
//! per distinct owning layout; a block's texture exists only while it has an
//! owner. Only the logic thread calls into here.

use super::blockset_data::{BlockData, BlocksetAsset, BlocksetCacheData, BlocksetData};
use crate::assets::{paths, AssetError, AssetReader, AssetSource, AssetWriter};
use crate::error::{EngineError, EngineResult, ErrorContext};
use crate::world::core::{BlockKey, BlocksetId, LayoutId, TextureHandle};
use crate::world::error::state_error;

/// Create an empty cache
pub fn create_blockset_cache() -> BlocksetCacheData {
    BlocksetCacheData::default()
}

/// Decode a blockset record
pub fn parse_blockset_asset(path: &str, bytes: &[u8]) -> Result<BlocksetAsset, AssetError> {
    let mut reader = AssetReader::new(path, bytes);
    let name = reader.read_cstring()?;
    let block_count = reader.read_u16()?;
    let tiles_per_block = reader.read_u8()?;
    if tiles_per_block == 0 {
        return Err(reader.invalid("tiles_per_block", 0));
    }

    let mut blocks = Vec::with_capacity(block_count as usize);
    for _ in 0..block_count {
        let mut tiles = Vec::with_capacity(tiles_per_block as usize);
        for _ in 0..tiles_per_block {
            tiles.push(reader.read_u16()?);
        }
        blocks.push(tiles);
    }

    Ok(BlocksetAsset {
        name,
        tiles_per_block,
        blocks,
    })
}

/// Encode a blockset record
pub fn encode_blockset_asset(asset: &BlocksetAsset) -> Vec<u8> {
    let mut writer = AssetWriter::new();
    writer
        .write_cstring(&asset.name)
        .write_u16(asset.blocks.len() as u16)
        .write_u8(asset.tiles_per_block);
    for block in &asset.blocks {
        for i in 0..asset.tiles_per_block as usize {
            writer.write_u16(block.get(i).copied().unwrap_or(0));
        }
    }
    writer.finish()
}

/// Return the shared blockset, loading it on a miss. Either way the
/// blockset's reference count goes up by one.
pub fn load_or_get<'a>(
    cache: &'a mut BlocksetCacheData,
    assets: &dyn AssetSource,
    id: BlocksetId,
) -> EngineResult<&'a BlocksetData> {
    if cache.blocksets.contains_key(&id) {
        cache.stats.hits += 1;
    } else {
        let path = paths::blockset(id.0);
        let bytes = assets
            .load(&path)
            .with_context(|| format!("unknown blockset {}", id.0))?;
        let asset = parse_blockset_asset(&path, &bytes)?;
        log::debug!(
            "[blockset_operations::load_or_get] Loaded {} '{}' ({} blocks)",
            id,
            asset.name,
            asset.blocks.len()
        );

        let blocks = asset
            .blocks
            .into_iter()
            .map(|tiles| BlockData {
                tiles,
                owners: Vec::new(),
                texture: None,
            })
            .collect();
        cache.blocksets.insert(
            id,
            BlocksetData {
                id,
                name: asset.name,
                tiles_per_block: asset.tiles_per_block,
                blocks,
                ref_count: 0,
            },
        );
        cache.stats.loads += 1;
    }

    let blockset = cache
        .blocksets
        .get_mut(&id)
        .ok_or_else(|| EngineError::Internal {
            message: format!("{} vanished during load", id),
        })?;
    blockset.ref_count += 1;
    Ok(&*blockset)
}

/// Register `owner` as a user of `key`. Returns true when the owner was not
/// already registered; repeated uses by one owner count once.
pub fn add_block_reference(
    cache: &mut BlocksetCacheData,
    key: BlockKey,
    owner: LayoutId,
) -> EngineResult<bool> {
    let blockset = cache
        .blocksets
        .get_mut(&key.blockset)
        .ok_or_else(|| state_error(format!("{} loaded", key.blockset), "not loaded"))?;
    let block_count = blockset.blocks.len();
    let block = blockset
        .blocks
        .get_mut(key.block.0 as usize)
        .ok_or_else(|| EngineError::CorruptedData {
            reason: format!(
                "{} out of range ({} has {} blocks)",
                key, key.blockset, block_count
            ),
        })?;

    if block.owners.contains(&owner) {
        return Ok(false);
    }
    block.owners.push(owner);
    if block.texture.is_none() {
        block.texture = Some(TextureHandle(cache.next_texture));
        cache.next_texture = cache.next_texture.wrapping_add(1);
        cache.stats.live_textures += 1;
    }
    Ok(true)
}

/// Remove `owner` from `key`'s owners; the texture goes with the last owner
pub fn deduct_block_reference(
    cache: &mut BlocksetCacheData,
    key: BlockKey,
    owner: LayoutId,
) -> EngineResult<()> {
    let underflow = || EngineError::ReferenceUnderflow {
        resource: "block".to_string(),
        id: format!("{} by {}", key, owner),
    };
    let block = cache
        .blocksets
        .get_mut(&key.blockset)
        .and_then(|bs| bs.blocks.get_mut(key.block.0 as usize))
        .ok_or_else(underflow)?;
    let index = block
        .owners
        .iter()
        .position(|o| *o == owner)
        .ok_or_else(underflow)?;
    block.owners.swap_remove(index);

    if block.owners.is_empty() && block.texture.take().is_some() {
        cache.stats.live_textures = cache.stats.live_textures.saturating_sub(1);
        cache.stats.textures_released += 1;
    }
    Ok(())
}

/// Drop one blockset reference; evicts the blockset at zero
pub fn deduct_blockset_reference(cache: &mut BlocksetCacheData, id: BlocksetId) -> EngineResult<()> {
    let blockset = cache
        .blocksets
        .get_mut(&id)
        .filter(|bs| bs.ref_count > 0)
        .ok_or_else(|| EngineError::ReferenceUnderflow {
            resource: "blockset".to_string(),
            id: id.0.to_string(),
        })?;
    blockset.ref_count -= 1;
    if blockset.ref_count > 0 {
        return Ok(());
    }

    if let Some(evicted) = cache.blocksets.remove(&id) {
        let mut released = 0u32;
        for block in evicted.blocks {
            if block.texture.is_some() {
                if !block.owners.is_empty() {
                    log::warn!(
                        "[blockset_operations::deduct_blockset_reference] {} evicted while a block still had {} owner(s)",
                        id,
                        block.owners.len()
                    );
                }
                released += 1;
            }
        }
        cache.stats.live_textures = cache.stats.live_textures.saturating_sub(released);
        cache.stats.textures_released += released as u64;
        cache.stats.evictions += 1;
        log::debug!(
            "[blockset_operations::deduct_blockset_reference] Evicted {} '{}'",
            id,
            evicted.name
        );
    }
    Ok(())
}

pub fn get_blockset(cache: &BlocksetCacheData, id: BlocksetId) -> Option<&BlocksetData> {
    cache.blocksets.get(&id)
}

pub fn get_block(cache: &BlocksetCacheData, key: BlockKey) -> Option<&BlockData> {
    cache
        .blocksets
        .get(&key.blockset)
        .and_then(|bs| bs.blocks.get(key.block.0 as usize))
}

pub fn blockset_ref_count(cache: &BlocksetCacheData, id: BlocksetId) -> u32 {
    cache.blocksets.get(&id).map_or(0, |bs| bs.ref_count)
}

pub fn block_owner_count(cache: &BlocksetCacheData, key: BlockKey) -> usize {
    get_block(cache, key).map_or(0, |b| b.owners.len())
}

pub fn loaded_blockset_count(cache: &BlocksetCacheData) -> usize {
    cache.blocksets.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetSource;

    fn source_with_blockset(id: u16, blocks: usize) -> MemoryAssetSource {
        let mut source = MemoryAssetSource::new();
        let asset = BlocksetAsset {
            name: format!("tiles{}", id),
            tiles_per_block: 4,
            blocks: (0..blocks).map(|b| vec![b as u16; 4]).collect(),
        };
        source.insert(paths::blockset(id), encode_blockset_asset(&asset));
        source
    }

    #[test]
    fn test_load_or_get_counts_hits() {
        let source = source_with_blockset(1, 3);
        let mut cache = create_blockset_cache();

        let first = load_or_get(&mut cache, &source, BlocksetId(1)).expect("load");
        assert_eq!(first.name, "tiles1");
        assert_eq!(first.blocks.len(), 3);
        load_or_get(&mut cache, &source, BlocksetId(1)).expect("hit");

        assert_eq!(blockset_ref_count(&cache, BlocksetId(1)), 2);
        assert_eq!(cache.stats.loads, 1);
        assert_eq!(cache.stats.hits, 1);
    }

    #[test]
    fn test_unknown_blockset_is_corruption() {
        let source = MemoryAssetSource::new();
        let mut cache = create_blockset_cache();
        let err = load_or_get(&mut cache, &source, BlocksetId(42)).expect_err("must fail");
        assert!(matches!(err, EngineError::CorruptedData { .. }));
        assert_eq!(loaded_blockset_count(&cache), 0);
    }

    #[test]
    fn test_same_owner_counts_once() {
        let source = source_with_blockset(1, 2);
        let mut cache = create_blockset_cache();
        load_or_get(&mut cache, &source, BlocksetId(1)).expect("load");

        let key = BlockKey::new(1, 1);
        assert!(add_block_reference(&mut cache, key, LayoutId(7)).expect("add"));
        assert!(!add_block_reference(&mut cache, key, LayoutId(7)).expect("dup"));
        assert!(add_block_reference(&mut cache, key, LayoutId(8)).expect("second owner"));
        assert_eq!(block_owner_count(&cache, key), 2);
        assert_eq!(cache.stats.live_textures, 1);

        deduct_block_reference(&mut cache, key, LayoutId(7)).expect("deduct");
        assert!(get_block(&cache, key).and_then(|b| b.texture).is_some());
        deduct_block_reference(&mut cache, key, LayoutId(8)).expect("deduct");
        assert!(get_block(&cache, key).and_then(|b| b.texture).is_none());
        assert_eq!(cache.stats.live_textures, 0);
    }

    #[test]
    fn test_block_index_out_of_range() {
        let source = source_with_blockset(1, 2);
        let mut cache = create_blockset_cache();
        load_or_get(&mut cache, &source, BlocksetId(1)).expect("load");
        let err = add_block_reference(&mut cache, BlockKey::new(1, 5), LayoutId(1))
            .expect_err("out of range");
        assert!(matches!(err, EngineError::CorruptedData { .. }));
    }

    #[test]
    fn test_eviction_at_zero() {
        let source = source_with_blockset(2, 1);
        let mut cache = create_blockset_cache();
        load_or_get(&mut cache, &source, BlocksetId(2)).expect("load");
        load_or_get(&mut cache, &source, BlocksetId(2)).expect("hit");

        deduct_blockset_reference(&mut cache, BlocksetId(2)).expect("deduct");
        assert!(get_blockset(&cache, BlocksetId(2)).is_some());
        deduct_blockset_reference(&mut cache, BlocksetId(2)).expect("deduct");
        assert!(get_blockset(&cache, BlocksetId(2)).is_none());
        assert_eq!(cache.stats.evictions, 1);

        let err = deduct_blockset_reference(&mut cache, BlocksetId(2)).expect_err("underflow");
        assert!(matches!(err, EngineError::ReferenceUnderflow { .. }));
    }

    #[test]
    fn test_deduct_unknown_owner_is_underflow() {
        let source = source_with_blockset(1, 1);
        let mut cache = create_blockset_cache();
        load_or_get(&mut cache, &source, BlocksetId(1)).expect("load");
        let err = deduct_block_reference(&mut cache, BlockKey::new(1, 0), LayoutId(3))
            .expect_err("never added");
        assert!(matches!(err, EngineError::ReferenceUnderflow { .. }));
    }

    #[test]
    fn test_zero_tiles_per_block_rejected() {
        let bytes = {
            let mut w = AssetWriter::new();
            w.write_cstring("bad").write_u16(1).write_u8(0);
            w.finish()
        };
        assert!(matches!(
            parse_blockset_asset("blocksets/0001.blockset", &bytes),
            Err(AssetError::InvalidValue { field: "tiles_per_block", .. })
        ));
    }
}
