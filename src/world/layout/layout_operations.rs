//! Map Layout Operations - DOP Functions
//!
//! Layouts pull blocks through the blockset cache on creation and give every
//! reference back on deletion, blocks first, then blocksets.

use super::layout_data::{CellFlags, LayoutAsset, LayoutCell, MapLayoutData};
use crate::assets::{paths, AssetError, AssetReader, AssetSource, AssetWriter};
use crate::error::{EngineResult, ErrorContext};
use crate::world::blockset::{self, BlocksetCacheData};
use crate::world::core::{BlockKey, LayoutId, MapId};
use glam::IVec2;

const ELEVATION_MASK: u8 = 0x0F;
const BLOCKED_BIT: u8 = 0x10;

/// Elevation stored in a cell's flags
pub fn cell_elevation(cell: &LayoutCell) -> u8 {
    cell.flags.0 & ELEVATION_MASK
}

/// Whether the cell refuses normal movement
pub fn cell_is_blocked(cell: &LayoutCell) -> bool {
    cell.flags.0 & BLOCKED_BIT != 0
}

pub fn make_cell_flags(elevation: u8, blocked: bool) -> CellFlags {
    let mut raw = elevation & ELEVATION_MASK;
    if blocked {
        raw |= BLOCKED_BIT;
    }
    CellFlags(raw)
}

fn read_cell(reader: &mut AssetReader<'_>) -> Result<LayoutCell, AssetError> {
    let flags = CellFlags(reader.read_u8()?);
    let blockset = reader.read_u16()?;
    let block = reader.read_u16()?;
    Ok(LayoutCell {
        flags,
        block: BlockKey::new(blockset, block),
    })
}

fn write_cell(writer: &mut AssetWriter, cell: &LayoutCell) {
    writer
        .write_u8(cell.flags.0)
        .write_u16(cell.block.blockset.0)
        .write_u16(cell.block.block.0);
}

/// Decode a layout record
pub fn parse_layout_asset(path: &str, bytes: &[u8]) -> Result<LayoutAsset, AssetError> {
    let mut reader = AssetReader::new(path, bytes);
    let width = reader.read_u16()?;
    let height = reader.read_u16()?;
    if width == 0 {
        return Err(reader.invalid("width", 0));
    }
    if height == 0 {
        return Err(reader.invalid("height", 0));
    }

    let count = width as usize * height as usize;
    let mut cells = Vec::with_capacity(count);
    for _ in 0..count {
        cells.push(read_cell(&mut reader)?);
    }

    let border_width = reader.read_u8()?;
    let border_height = reader.read_u8()?;
    // A border is either absent or has both dimensions
    if (border_width == 0) != (border_height == 0) {
        return Err(reader.invalid(
            "border_size",
            (border_width as u32) << 8 | border_height as u32,
        ));
    }
    let border_count = border_width as usize * border_height as usize;
    let mut border = Vec::with_capacity(border_count);
    for _ in 0..border_count {
        border.push(read_cell(&mut reader)?);
    }

    Ok(LayoutAsset {
        width,
        height,
        cells,
        border_width,
        border_height,
        border,
    })
}

/// Encode a layout record
pub fn encode_layout_asset(asset: &LayoutAsset) -> Vec<u8> {
    let mut writer = AssetWriter::new();
    writer.write_u16(asset.width).write_u16(asset.height);
    for cell in &asset.cells {
        write_cell(&mut writer, cell);
    }
    writer
        .write_u8(asset.border_width)
        .write_u8(asset.border_height);
    for cell in &asset.border {
        write_cell(&mut writer, cell);
    }
    writer.finish()
}

/// Build the layout of `map`, resolving every main and border cell through
/// the blockset cache. Each distinct blockset is loaded once per layout.
pub fn create_layout(
    cache: &mut BlocksetCacheData,
    assets: &dyn AssetSource,
    map: MapId,
    owner: LayoutId,
) -> EngineResult<MapLayoutData> {
    let path = paths::layout(map.0);
    let bytes = assets
        .load(&path)
        .with_context(|| format!("layout of {}", map))?;
    let asset = parse_layout_asset(&path, &bytes)?;

    let mut layout = MapLayoutData {
        owner,
        map,
        size: IVec2::new(asset.width as i32, asset.height as i32),
        cells: asset.cells,
        border_size: IVec2::new(asset.border_width as i32, asset.border_height as i32),
        border: asset.border,
        used_blocksets: Vec::new(),
        used_blocks: Vec::new(),
    };

    if let Err(e) = resolve_blocks(cache, assets, &mut layout) {
        // Give back whatever was taken before the bad cell
        if let Err(release_err) = release_references(cache, &layout) {
            log::error!(
                "[layout_operations::create_layout] Rollback for {} failed: {}",
                map,
                release_err
            );
        }
        return Err(e);
    }

    log::debug!(
        "[layout_operations::create_layout] {} {}x{} border {}x{}: {} blocksets, {} blocks",
        map,
        layout.size.x,
        layout.size.y,
        layout.border_size.x,
        layout.border_size.y,
        layout.used_blocksets.len(),
        layout.used_blocks.len()
    );
    Ok(layout)
}

fn resolve_blocks(
    cache: &mut BlocksetCacheData,
    assets: &dyn AssetSource,
    layout: &mut MapLayoutData,
) -> EngineResult<()> {
    let keys: Vec<BlockKey> = layout
        .cells
        .iter()
        .chain(layout.border.iter())
        .map(|cell| cell.block)
        .collect();

    for key in keys {
        if !layout.used_blocksets.contains(&key.blockset) {
            blockset::load_or_get(cache, assets, key.blockset)?;
            layout.used_blocksets.push(key.blockset);
        }
        if blockset::add_block_reference(cache, key, layout.owner)? {
            layout.used_blocks.push(key);
        }
    }
    Ok(())
}

fn release_references(cache: &mut BlocksetCacheData, layout: &MapLayoutData) -> EngineResult<()> {
    for key in &layout.used_blocks {
        blockset::deduct_block_reference(cache, *key, layout.owner)?;
    }
    for id in &layout.used_blocksets {
        blockset::deduct_blockset_reference(cache, *id)?;
    }
    Ok(())
}

/// Cell at `pos`. Outside the main grid the border tiles seamlessly in every
/// direction; with no border there is nothing to return.
pub fn get_block(layout: &MapLayoutData, pos: IVec2) -> Option<&LayoutCell> {
    if is_in_bounds(layout, pos) {
        let index = (pos.y * layout.size.x + pos.x) as usize;
        return layout.cells.get(index);
    }

    let bw = layout.border_size.x;
    let bh = layout.border_size.y;
    if bw == 0 || bh == 0 {
        return None;
    }
    let bx = pos.x.rem_euclid(bw);
    let by = pos.y.rem_euclid(bh);
    layout.border.get((by * bw + bx) as usize)
}

pub fn is_in_bounds(layout: &MapLayoutData, pos: IVec2) -> bool {
    pos.x >= 0 && pos.y >= 0 && pos.x < layout.size.x && pos.y < layout.size.y
}

/// Release every block and blockset reference the layout holds. Consumes the
/// layout so it cannot be read afterwards.
pub fn delete_layout(layout: MapLayoutData, cache: &mut BlocksetCacheData) -> EngineResult<()> {
    release_references(cache, &layout)?;
    log::debug!(
        "[layout_operations::delete_layout] {} released {} blocks, {} blocksets",
        layout.map,
        layout.used_blocks.len(),
        layout.used_blocksets.len()
    );
    Ok(())
}
