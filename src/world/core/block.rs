use serde::{Deserialize, Serialize};
use std::fmt;

/// Tileset identifier, as stored in layout cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BlocksetId(pub u16);

/// Index of a block inside its blockset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BlockIndex(pub u16);

/// Fully qualified block reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockKey {
    pub blockset: BlocksetId,
    pub block: BlockIndex,
}

impl BlockKey {
    pub const fn new(blockset: u16, block: u16) -> Self {
        Self {
            blockset: BlocksetId(blockset),
            block: BlockIndex(block),
        }
    }
}

/// Identity of a layout instance; blocks dedupe their owners by it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct LayoutId(pub u32);

/// Renderer-side backing resource of a block.
/// Issued by the blockset cache while a block has at least one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TextureHandle(pub u32);

impl fmt::Display for BlocksetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockset({})", self.0)
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({}:{})", self.blockset.0, self.block.0)
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Layout#{}", self.0)
    }
}
