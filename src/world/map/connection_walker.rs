//! Connection Graph Walker
//!
//! Lays out every map reachable from the camera map in one block-space
//! whose origin is the camera map's top-left block.

use super::map_data::{MapConnection, MapRegistryData};
use crate::world::core::{CompassDirection, MapId};
use glam::IVec2;
use rustc_hash::FxHashSet;

/// Offset of a connection's target relative to the map holding it
pub fn connection_offset(con: &MapConnection, this_size: IVec2, target_size: IVec2) -> IVec2 {
    match con.direction {
        CompassDirection::South => IVec2::new(con.offset, this_size.y),
        CompassDirection::North => IVec2::new(con.offset, -target_size.y),
        CompassDirection::West => IVec2::new(-target_size.x, con.offset),
        CompassDirection::East => IVec2::new(this_size.x, con.offset),
    }
}

/// Recompute `block_offset` for every map reachable from `camera_map`.
/// Returns the reachable maps in visit order, camera map first.
pub fn recompute_block_offsets(maps: &mut MapRegistryData, camera_map: MapId) -> Vec<MapId> {
    let mut visited = FxHashSet::default();
    let mut order = Vec::new();
    recurse_block_offsets(maps, camera_map, IVec2::ZERO, &mut visited, &mut order);
    log::debug!(
        "[connection_walker::recompute_block_offsets] {} maps reachable from {}",
        order.len(),
        camera_map
    );
    order
}

/// Assign `offset` to `id` and descend through its connections. Only maps
/// with visible data have connections to descend into; each map is visited
/// once, so cycles terminate.
pub fn recurse_block_offsets(
    maps: &mut MapRegistryData,
    id: MapId,
    offset: IVec2,
    visited: &mut FxHashSet<MapId>,
    order: &mut Vec<MapId>,
) {
    if !visited.insert(id) {
        return;
    }
    let size = match maps.maps.get_mut(&id) {
        Some(map) => {
            map.block_offset = offset;
            map.size
        }
        None => return,
    };
    order.push(id);

    let Some(visible) = maps.maps.get(&id).and_then(|m| m.visible.as_ref()) else {
        return;
    };
    let targets: Vec<(MapId, IVec2)> = visible
        .connections
        .iter()
        .filter_map(|con| {
            let target = maps.maps.get(&con.map)?;
            Some((con.map, offset + connection_offset(con, size, target.size)))
        })
        .collect();

    for (target, target_offset) in targets {
        recurse_block_offsets(maps, target, target_offset, visited, order);
    }
}
