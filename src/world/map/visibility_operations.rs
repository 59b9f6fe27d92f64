//! Visibility tracking
//!
//! The viewport is a rectangle of blocks centered on the camera, expressed
//! in the current map's block space. Every reachable map overlapping it is
//! visible, and the current map always is.

use super::lifecycle_operations::{on_map_no_longer_visible, on_map_now_visible, recompute_offsets};
use crate::constants::limits::MAX_VISIBILITY_PASSES;
use crate::error::{EngineError, EngineResult};
use crate::world::core::MapId;
use crate::world::data_types::WorldData;
use crate::world::objs::camera_pos;
use glam::IVec2;

/// Whether two half-open block rectangles overlap
pub fn rects_intersect(a_min: IVec2, a_size: IVec2, b_min: IVec2, b_size: IVec2) -> bool {
    let a_max = a_min + a_size;
    let b_max = b_min + b_size;
    a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
}

/// Viewport origin and size in the current map's block space
pub fn viewport_rect(world: &WorldData) -> Option<(IVec2, IVec2)> {
    let current = world.current_map?;
    let current_map = world.maps.maps.get(&current)?;
    let size = IVec2::new(
        world.config.viewport_width as i32,
        world.config.viewport_height as i32,
    );

    let center = camera_pos(&world.objs)
        .filter(|pos| world.reachable_maps.contains(&pos.map))
        .and_then(|pos| {
            world
                .maps
                .maps
                .get(&pos.map)
                .map(|map| map.block_offset + pos.block)
        })
        .unwrap_or(current_map.size / 2);

    Some((center - size / 2, size))
}

/// Maps that should have visible data right now, current map first
pub fn desired_visible_maps(world: &WorldData) -> Vec<MapId> {
    let Some(current) = world.current_map else {
        return Vec::new();
    };
    let Some((view_min, view_size)) = viewport_rect(world) else {
        return Vec::new();
    };

    let mut desired = vec![current];
    for &id in &world.reachable_maps {
        if id == current {
            continue;
        }
        let Some(map) = world.maps.maps.get(&id) else {
            continue;
        };
        if rects_intersect(map.block_offset, map.size, view_min, view_size) {
            desired.push(id);
        }
    }
    desired
}

/// Bring the set of visible maps in line with the viewport. New maps load
/// before old ones unload so shared blocksets stay resident. Loading a map
/// registers its neighbours, so passes repeat until nothing changes.
pub fn update_visible_maps(world: &mut WorldData) -> EngineResult<()> {
    if world.current_map.is_none() {
        return Ok(());
    }

    for pass in 0..MAX_VISIBILITY_PASSES {
        recompute_offsets(world);
        let desired = desired_visible_maps(world);

        let entering: Vec<MapId> = desired
            .iter()
            .copied()
            .filter(|id| !world.visible_maps.contains(id))
            .collect();
        let leaving: Vec<MapId> = world
            .visible_maps
            .iter()
            .copied()
            .filter(|id| !desired.contains(id))
            .collect();

        if entering.is_empty() && leaving.is_empty() {
            if pass > 0 {
                log::debug!(
                    "[visibility_operations::update_visible_maps] Stable after {} passes: {:?}",
                    pass,
                    world.visible_maps
                );
            }
            return Ok(());
        }

        for id in entering {
            on_map_now_visible(world, id)?;
        }
        for id in leaving {
            on_map_no_longer_visible(world, id)?;
        }
    }

    Err(EngineError::Internal {
        message: format!(
            "visible map set did not settle after {} passes",
            MAX_VISIBILITY_PASSES
        ),
    })
}
