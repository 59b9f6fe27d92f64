//! Map Layout Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in layout_operations.rs

use crate::world::core::{BlockKey, BlocksetId, LayoutId, MapId};
use glam::IVec2;

/// Per-cell flags byte: low nibble is elevation, bit 4 marks the cell blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct CellFlags(pub u8);

/// One layout cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutCell {
    pub flags: CellFlags,
    pub block: BlockKey,
}

/// Decoded layout record, before any block is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutAsset {
    pub width: u16,
    pub height: u16,
    /// Row-major, `width * height` cells
    pub cells: Vec<LayoutCell>,
    pub border_width: u8,
    pub border_height: u8,
    /// Row-major, `border_width * border_height` cells
    pub border: Vec<LayoutCell>,
}

/// A live layout holding references into the blockset cache
#[derive(Debug)]
pub struct MapLayoutData {
    pub owner: LayoutId,
    pub map: MapId,
    pub size: IVec2,
    pub cells: Vec<LayoutCell>,
    pub border_size: IVec2,
    pub border: Vec<LayoutCell>,
    /// Distinct blocksets this layout loaded, in first-use order
    pub used_blocksets: Vec<BlocksetId>,
    /// Distinct blocks this layout referenced, in first-use order
    pub used_blocks: Vec<BlockKey>,
}
