//! Map Data - Pure DOP
//!
//! NO METHODS. Just data.
//! Loading and reference counting happen in registry_operations.rs and
//! lifecycle_operations.rs.

use crate::world::core::{CompassDirection, FacingDirection, FlagId, MapId, ObjId, WorldPos};
use crate::world::encounters::MapEncounters;
use crate::world::layout::MapLayoutData;
use glam::IVec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Directed adjacency to another map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapConnection {
    pub direction: CompassDirection,
    pub map: MapId,
    /// Lateral offset in blocks along the shared edge
    pub offset: i32,
}

/// Decoded map record: size header followed by connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapAsset {
    pub width: u16,
    pub height: u16,
    pub connections: Vec<MapConnection>,
}

/// Warp trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Warp {
    pub position: IVec2,
    pub elevation: u8,
    pub dest: WorldPos,
}

/// Object-spawn descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjEvent {
    pub id: ObjId,
    pub sprite: String,
    pub position: IVec2,
    pub elevation: u8,
    pub facing: FacingDirection,
    pub movement_type: u8,
    /// Set once this one-time obj has been resolved; suppresses the spawn
    pub flag: Option<FlagId>,
    pub script: Option<String>,
}

/// Scripted-tile trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTrigger {
    pub position: IVec2,
    pub elevation: u8,
    pub script: String,
}

/// Static events of a map, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapEvents {
    pub warps: Vec<Warp>,
    pub objs: Vec<ObjEvent>,
    pub triggers: Vec<ScriptTrigger>,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    None = 0,
    Rain = 1,
    Snow = 2,
    Sandstorm = 3,
    Fog = 4,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    Town = 0,
    City = 1,
    Route = 2,
    Cave = 3,
    Indoors = 4,
}

/// Presentation details of a map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDetails {
    pub name: String,
    pub music: u16,
    pub weather: Weather,
    pub kind: MapKind,
    pub allow_running: bool,
    pub show_name_popup: bool,
}

/// Loaded while the map is on screen or adjacent to it
#[derive(Debug)]
pub struct VisibleMapData {
    pub connections: Vec<MapConnection>,
    pub layout: MapLayoutData,
    pub events: MapEvents,
}

/// Loaded while the map is current or a pending warp target
#[derive(Debug, Clone)]
pub struct CurrentMapData {
    pub details: MapDetails,
    pub encounters: MapEncounters,
}

/// Registry entry of a map
#[derive(Debug)]
pub struct MapData {
    pub id: MapId,
    /// Width and height in blocks
    pub size: IVec2,
    pub ref_count: u32,
    /// Offset from the camera map; only meaningful while reachable from it
    pub block_offset: IVec2,
    pub visible: Option<VisibleMapData>,
    pub current: Option<CurrentMapData>,
    pub is_current: bool,
    pub is_warp_target: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MapRegistryStats {
    pub header_loads: u64,
    pub visible_loads: u64,
    pub current_loads: u64,
    pub evictions: u64,
}

/// Map registry data
#[derive(Debug, Default)]
pub struct MapRegistryData {
    pub maps: FxHashMap<MapId, MapData>,
    pub stats: MapRegistryStats,
}
