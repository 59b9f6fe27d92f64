//! Map Registry Operations - DOP Functions
//!
//! The registry knows every map that something currently points at. Looking
//! a map up reads only its size header; visible and current payloads are
//! loaded by the lifecycle controller.

use super::map_assets::parse_map_header;
use super::map_data::{
    CurrentMapData, MapData, MapDetails, MapEvents, MapRegistryData, VisibleMapData,
};
use crate::assets::{paths, AssetSource};
use crate::world::encounters::MapEncounters;
use crate::error::{EngineError, EngineResult, ErrorContext, OptionExt};
use crate::world::core::MapId;
use crate::world::error::{state_error, WorldErrorContext};
use crate::world::layout::MapLayoutData;
use glam::IVec2;

pub fn create_map_registry() -> MapRegistryData {
    MapRegistryData::default()
}

/// Registry entry for `id`, reading its header on a miss. Does not add a
/// reference.
pub fn load_or_get<'a>(
    registry: &'a mut MapRegistryData,
    assets: &dyn AssetSource,
    id: MapId,
) -> EngineResult<&'a mut MapData> {
    if !registry.maps.contains_key(&id) {
        let path = paths::map(id.0);
        let bytes = assets
            .load(&path)
            .with_context(|| format!("unknown map {}", id.0))?;
        let size = parse_map_header(&path, &bytes)?;
        log::debug!(
            "[registry_operations::load_or_get] Registered {} ({}x{})",
            id,
            size.x,
            size.y
        );
        registry.maps.insert(
            id,
            MapData {
                id,
                size,
                ref_count: 0,
                block_offset: IVec2::ZERO,
                visible: None,
                current: None,
                is_current: false,
                is_warp_target: false,
            },
        );
        registry.stats.header_loads += 1;
    }

    registry
        .maps
        .get_mut(&id)
        .ok_or_engine(|| EngineError::Internal {
            message: format!("{} vanished during load", id),
        })
}

/// Returns the new count
pub fn add_reference(registry: &mut MapRegistryData, id: MapId) -> EngineResult<u32> {
    let map = registry.maps.get_mut(&id).world_context("map", id)?;
    map.ref_count += 1;
    Ok(map.ref_count)
}

pub fn get_map(registry: &MapRegistryData, id: MapId) -> Option<&MapData> {
    registry.maps.get(&id)
}

pub fn map_ref_count(registry: &MapRegistryData, id: MapId) -> u32 {
    registry.maps.get(&id).map_or(0, |m| m.ref_count)
}

pub fn loaded_map_count(registry: &MapRegistryData) -> usize {
    registry.maps.len()
}

pub fn is_visible_loaded(registry: &MapRegistryData, id: MapId) -> bool {
    registry.maps.get(&id).map_or(false, |m| m.visible.is_some())
}

pub fn is_current_loaded(registry: &MapRegistryData, id: MapId) -> bool {
    registry.maps.get(&id).map_or(false, |m| m.current.is_some())
}

fn visible_data(registry: &MapRegistryData, id: MapId) -> EngineResult<&VisibleMapData> {
    let map = registry.maps.get(&id).world_context("map", id)?;
    map.visible
        .as_ref()
        .ok_or_else(|| state_error(format!("{} visible data loaded", id), "not loaded"))
}

fn current_data(registry: &MapRegistryData, id: MapId) -> EngineResult<&CurrentMapData> {
    let map = registry.maps.get(&id).world_context("map", id)?;
    map.current
        .as_ref()
        .ok_or_else(|| state_error(format!("{} current data loaded", id), "not loaded"))
}

pub fn get_layout(registry: &MapRegistryData, id: MapId) -> EngineResult<&MapLayoutData> {
    visible_data(registry, id).map(|v| &v.layout)
}

pub fn get_events(registry: &MapRegistryData, id: MapId) -> EngineResult<&MapEvents> {
    visible_data(registry, id).map(|v| &v.events)
}

pub fn get_details(registry: &MapRegistryData, id: MapId) -> EngineResult<&MapDetails> {
    current_data(registry, id).map(|c| &c.details)
}

pub fn get_encounters(registry: &MapRegistryData, id: MapId) -> EngineResult<&MapEncounters> {
    current_data(registry, id).map(|c| &c.encounters)
}

/// Whether `block` (relative to `map`) lies inside the map's grid
pub fn contains_block(map: &MapData, block: IVec2) -> bool {
    block.x >= 0 && block.y >= 0 && block.x < map.size.x && block.y < map.size.y
}
