use super::MapId;
use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an obj: owning map, block coordinate inside it, elevation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPos {
    pub map: MapId,
    pub block: IVec2,
    pub elevation: u8,
}

impl WorldPos {
    pub fn new(map: MapId, x: i32, y: i32, elevation: u8) -> Self {
        Self {
            map,
            block: IVec2::new(x, y),
            elevation,
        }
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) e{}",
            self.map, self.block.x, self.block.y, self.elevation
        )
    }
}
