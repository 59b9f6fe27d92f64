//! World Data Types - Pure DOP
//!
//! NO METHODS. Just data.
//! One explicit context owns every cache and registry of the streaming
//! world; operations take it by `&mut`.

use crate::assets::AssetSource;
use crate::world::blockset::BlocksetCacheData;
use crate::world::core::MapId;
use crate::world::encounters::EncounterCacheData;
use crate::world::flags::FlagStore;
use crate::world::map::{MapRegistryData, Warp};
use crate::world::objs::ObjRegistryData;
use crate::EngineConfig;
use std::collections::VecDeque;

/// Warp waiting for its delay to run out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingWarp {
    pub warp: Warp,
    pub remaining_ticks: u32,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub steps_finished: usize,
    pub camera_map_changed: Option<(MapId, MapId)>,
    pub warp_queued: bool,
    pub warp_performed: bool,
    pub scripts_triggered: usize,
}

pub struct WorldData {
    pub config: EngineConfig,
    pub assets: Box<dyn AssetSource>,
    pub blocksets: BlocksetCacheData,
    pub encounter_tables: EncounterCacheData,
    pub maps: MapRegistryData,
    pub objs: ObjRegistryData,
    pub flags: FlagStore,
    /// Map the camera is on; root of the offset walk
    pub current_map: Option<MapId>,
    pub pending_warp: Option<PendingWarp>,
    /// Maps with visible data loaded, in load order
    pub visible_maps: Vec<MapId>,
    /// Result of the last offset walk, camera map first
    pub reachable_maps: Vec<MapId>,
    pub next_layout_id: u32,
    pub tick: u64,
    /// Script names queued by trigger tiles, for the script runtime
    pub pending_scripts: VecDeque<String>,
}

impl std::fmt::Debug for WorldData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldData")
            .field("config", &self.config)
            .field("assets", &"<AssetSource>")
            .field("loaded_blocksets", &self.blocksets.blocksets.len())
            .field("loaded_encounter_tables", &self.encounter_tables.tables.len())
            .field("loaded_maps", &self.maps.maps.len())
            .field("objs", &self.objs.len)
            .field("current_map", &self.current_map)
            .field("pending_warp", &self.pending_warp)
            .field("visible_maps", &self.visible_maps)
            .field("tick", &self.tick)
            .finish()
    }
}
