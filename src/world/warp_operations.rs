//! Warp Operations - DOP Functions
//!
//! A warp is queued when the player steps on it. The destination map is
//! held with its current data from that moment, then the warp is performed
//! once the configured delay has run out.

use crate::error::EngineResult;
use crate::world::data_types::{PendingWarp, WorldData};
use crate::world::error::state_error;
use crate::world::map::{
    on_current_map, on_no_longer_current_map, on_no_longer_warping_map, on_warping_map,
    update_visible_maps, Warp,
};
use crate::world::objs::{get_obj_mut, MovementState};

/// Hold the destination and start the delay
pub fn queue_warp(world: &mut WorldData, warp: Warp) -> EngineResult<()> {
    if world.pending_warp.is_some() {
        return Err(state_error("no pending warp", "warp already pending"));
    }
    on_warping_map(world, warp.dest.map)?;
    world.pending_warp = Some(PendingWarp {
        warp,
        remaining_ticks: world.config.warp_delay_ticks,
    });
    log::info!(
        "[warp_operations::queue_warp] Warp to {} in {} ticks",
        warp.dest,
        world.config.warp_delay_ticks
    );
    Ok(())
}

/// Drop a pending warp without performing it
pub fn cancel_warp(world: &mut WorldData) -> EngineResult<()> {
    let pending = world
        .pending_warp
        .take()
        .ok_or_else(|| state_error("pending warp", "none"))?;
    on_no_longer_warping_map(world, pending.warp.dest.map)?;
    log::info!(
        "[warp_operations::cancel_warp] Cancelled warp to {}",
        pending.warp.dest
    );
    Ok(())
}

/// Move the player and camera to the destination and make it current
pub fn perform_warp(world: &mut WorldData) -> EngineResult<()> {
    let pending = world
        .pending_warp
        .take()
        .ok_or_else(|| state_error("pending warp", "none"))?;
    let dest = pending.warp.dest;

    let previous = world.current_map;
    if previous != Some(dest.map) {
        if let Err(e) = on_current_map(world, dest.map) {
            log::error!(
                "[warp_operations::perform_warp] Cannot enter {}: {}",
                dest,
                e
            );
            on_no_longer_warping_map(world, dest.map)?;
            return Err(e);
        }
    }

    let movers = [world.objs.camera_attached, world.objs.camera];
    for handle in movers.into_iter().flatten() {
        if let Some(obj) = get_obj_mut(&mut world.objs, handle) {
            obj.pos = dest;
            obj.movement = MovementState::Idle;
            obj.queue.clear();
        }
    }

    if let Some(previous) = previous.filter(|p| *p != dest.map) {
        on_no_longer_current_map(world, previous)?;
    }
    on_no_longer_warping_map(world, dest.map)?;
    update_visible_maps(world)?;

    log::info!("[warp_operations::perform_warp] Warped to {}", dest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::world::core::WorldPos;
    use crate::world::map::{get_map, is_current_loaded, map_ref_count};
    use crate::assets::paths;
    use crate::world::objs::{camera_pos, get_obj};
    use crate::world::test_fixtures::{fixture_config, fixture_source, fixture_world, HOUSE, TOWN};
    use crate::world::world_operations::{create_world, init_world_at, teardown_world};
    use glam::IVec2;

    fn house_warp() -> Warp {
        Warp {
            position: IVec2::new(2, 2),
            elevation: 0,
            dest: WorldPos::new(HOUSE, 1, 2, 0),
        }
    }

    #[test]
    fn test_queue_preloads_current_data() {
        let mut world = fixture_world();
        init_world_at(&mut world, WorldPos::new(TOWN, 2, 1, 0)).expect("init");
        queue_warp(&mut world, house_warp()).expect("queue");

        assert!(is_current_loaded(&world.maps, HOUSE));
        assert_eq!(map_ref_count(&world.maps, HOUSE), 1);
        assert!(matches!(
            queue_warp(&mut world, house_warp()),
            Err(EngineError::StateError { .. })
        ));
    }

    #[test]
    fn test_cancel_releases_target() {
        let mut world = fixture_world();
        init_world_at(&mut world, WorldPos::new(TOWN, 2, 1, 0)).expect("init");
        queue_warp(&mut world, house_warp()).expect("queue");
        cancel_warp(&mut world).expect("cancel");
        assert!(get_map(&world.maps, HOUSE).is_none());
        assert!(world.pending_warp.is_none());
    }

    #[test]
    fn test_perform_without_pending_warp() {
        let mut world = fixture_world();
        assert!(matches!(
            perform_warp(&mut world),
            Err(EngineError::StateError { .. })
        ));
    }

    #[test]
    fn test_failed_warp_releases_target_and_stays_put() {
        let mut source = fixture_source();
        source.remove(&paths::layout(HOUSE.0)).expect("house layout");
        let mut world = create_world(fixture_config(), Box::new(source));
        let player = init_world_at(&mut world, WorldPos::new(TOWN, 2, 1, 0)).expect("init");
        queue_warp(&mut world, house_warp()).expect("queue");

        assert!(matches!(
            perform_warp(&mut world),
            Err(EngineError::CorruptedData { .. })
        ));
        assert!(world.pending_warp.is_none());
        assert!(get_map(&world.maps, HOUSE).is_none());
        assert_eq!(world.current_map, Some(TOWN));
        assert_eq!(
            get_obj(&world.objs, player).map(|o| o.pos),
            Some(WorldPos::new(TOWN, 2, 1, 0))
        );
        assert_eq!(camera_pos(&world.objs), Some(WorldPos::new(TOWN, 2, 1, 0)));

        teardown_world(&mut world).expect("teardown leaves nothing behind");
    }

    #[test]
    fn test_warp_within_same_map() {
        let mut world = fixture_world();
        init_world_at(&mut world, WorldPos::new(TOWN, 2, 1, 0)).expect("init");
        queue_warp(
            &mut world,
            Warp {
                position: IVec2::new(2, 1),
                elevation: 0,
                dest: WorldPos::new(TOWN, 5, 5, 0),
            },
        )
        .expect("queue");
        assert_eq!(map_ref_count(&world.maps, TOWN), 2);

        perform_warp(&mut world).expect("warp");
        assert_eq!(world.current_map, Some(TOWN));
        let town = get_map(&world.maps, TOWN).expect("town");
        assert!(town.is_current);
        assert!(!town.is_warp_target);
        assert!(is_current_loaded(&world.maps, TOWN));
    }
}
