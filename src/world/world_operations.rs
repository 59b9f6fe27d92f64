//! World Operations - Pure DOP Functions
//!
//! This is the PUBLIC API for the streaming world.
//! Create a world, place the player, tick it, tear it down.
//!
//! This is what the logic thread and games call directly.

use super::data_types::{TickReport, WorldData};
use super::warp_operations::{perform_warp, queue_warp};
use crate::assets::AssetSource;
use crate::error::{EngineError, EngineResult};
use crate::world::blockset::{create_blockset_cache, loaded_blockset_count};
use crate::world::core::{FacingDirection, ObjId, WorldPos};
use crate::world::encounters::create_encounter_cache;
use crate::world::error::state_error;
use crate::world::flags::create_flag_store;
use crate::world::layout::{get_block, LayoutCell};
use crate::world::map::{
    contains_block, create_map_registry, is_visible_loaded, on_current_map,
    on_map_no_longer_visible, on_no_longer_current_map, on_no_longer_warping_map,
    update_visible_maps,
};
use crate::world::objs::{
    advance_objs, attach_camera, camera_pos, create_obj_registry, get_obj, get_obj_mut,
    insert_obj, new_obj, obj_count, obj_handles, remove_obj, spawn_camera, ObjHandle, ObjKind,
};
use crate::EngineConfig;
use std::collections::VecDeque;

// ============================================================================
// CREATION
// ============================================================================

/// Empty world; nothing is loaded until `init_world_at`
pub fn create_world(config: EngineConfig, assets: Box<dyn AssetSource>) -> WorldData {
    let flags = create_flag_store(config.flag_capacity);
    WorldData {
        config,
        assets,
        blocksets: create_blockset_cache(),
        encounter_tables: create_encounter_cache(),
        maps: create_map_registry(),
        objs: create_obj_registry(),
        flags,
        current_map: None,
        pending_warp: None,
        visible_maps: Vec::new(),
        reachable_maps: Vec::new(),
        next_layout_id: 0,
        tick: 0,
        pending_scripts: VecDeque::new(),
    }
}

// ============================================================================
// INIT / TEARDOWN
// ============================================================================

/// Spawn the player at `pos` with the camera attached, make `pos.map`
/// current and load whatever the viewport covers. Returns the player.
pub fn init_world_at(world: &mut WorldData, pos: WorldPos) -> EngineResult<ObjHandle> {
    if world.current_map.is_some() || world.objs.camera.is_some() {
        return Err(state_error("uninitialized world", "world already initialized"));
    }

    let player = insert_obj(
        &mut world.objs,
        new_obj(ObjId::PLAYER, ObjKind::Player, pos, FacingDirection::South),
    );
    let camera = spawn_camera(&mut world.objs, pos)?;
    attach_camera(&mut world.objs, player)?;

    if let Err(e) = on_current_map(world, pos.map) {
        remove_obj(&mut world.objs, camera);
        remove_obj(&mut world.objs, player);
        return Err(e);
    }
    update_visible_maps(world)?;

    log::info!(
        "[world_operations::init_world_at] World initialized at {}, {} maps visible",
        pos,
        world.visible_maps.len()
    );
    Ok(player)
}

/// Unload everything and check that every cache drained
pub fn teardown_world(world: &mut WorldData) -> EngineResult<()> {
    if let Some(pending) = world.pending_warp.take() {
        on_no_longer_warping_map(world, pending.warp.dest.map)?;
    }
    if let Some(current) = world.current_map {
        on_no_longer_current_map(world, current)?;
    }
    for id in world.visible_maps.clone() {
        if is_visible_loaded(&world.maps, id) {
            on_map_no_longer_visible(world, id)?;
        }
    }
    for handle in obj_handles(&world.objs) {
        remove_obj(&mut world.objs, handle);
    }
    world.pending_scripts.clear();
    world.reachable_maps.clear();

    let mut leaks = Vec::new();
    if !world.maps.maps.is_empty() {
        leaks.push(format!("{} maps", world.maps.maps.len()));
    }
    if loaded_blockset_count(&world.blocksets) > 0 {
        leaks.push(format!("{} blocksets", loaded_blockset_count(&world.blocksets)));
    }
    if !world.encounter_tables.tables.is_empty() {
        leaks.push(format!(
            "{} encounter tables",
            world.encounter_tables.tables.len()
        ));
    }
    if obj_count(&world.objs) > 0 {
        leaks.push(format!("{} objs", obj_count(&world.objs)));
    }
    if !leaks.is_empty() {
        return Err(EngineError::Internal {
            message: format!("teardown left resources loaded: {}", leaks.join(", ")),
        });
    }

    log::info!(
        "[world_operations::teardown_world] Teardown complete after {} ticks",
        world.tick
    );
    Ok(())
}

// ============================================================================
// TICK
// ============================================================================

/// One logic tick
pub fn tick_world(world: &mut WorldData) -> EngineResult<TickReport> {
    world.tick += 1;
    let mut report = TickReport {
        tick: world.tick,
        ..TickReport::default()
    };

    let finished = advance_objs(
        &mut world.objs,
        world.config.walk_step_ticks,
        world.config.run_step_ticks,
    )?;
    report.steps_finished = finished.len();
    for &handle in &finished {
        reparent_obj(world, handle);
    }
    follow_camera(world);

    if let (Some(current), Some(camera)) = (world.current_map, camera_pos(&world.objs)) {
        if camera.map != current {
            on_current_map(world, camera.map)?;
            on_no_longer_current_map(world, current)?;
            report.camera_map_changed = Some((current, camera.map));
        }
    }
    update_visible_maps(world)?;

    if let Some(player) = world.objs.camera_attached {
        if finished.contains(&player) {
            check_step_events(world, player, &mut report)?;
        }
    }

    let warp_due = match world.pending_warp.as_mut() {
        Some(pending) if pending.remaining_ticks == 0 => true,
        Some(pending) => {
            pending.remaining_ticks -= 1;
            false
        }
        None => false,
    };
    if warp_due {
        perform_warp(world)?;
        report.warp_performed = true;
    }

    Ok(report)
}

/// Move an obj that stepped off its map onto the visible map it now
/// stands on. Objs in a border area keep their map.
fn reparent_obj(world: &mut WorldData, handle: ObjHandle) {
    let Some(pos) = get_obj(&world.objs, handle).map(|obj| obj.pos) else {
        return;
    };
    let Some(map) = world.maps.maps.get(&pos.map) else {
        return;
    };
    if contains_block(map, pos.block) || !world.reachable_maps.contains(&pos.map) {
        return;
    }
    let absolute = map.block_offset + pos.block;

    let target = world.reachable_maps.iter().find_map(|&id| {
        let m = world.maps.maps.get(&id)?;
        let stands_on = id != pos.map
            && m.visible.is_some()
            && contains_block(m, absolute - m.block_offset);
        stands_on.then_some((id, m.block_offset))
    });
    let Some((target, target_offset)) = target else {
        return;
    };

    if let Some(obj) = get_obj_mut(&mut world.objs, handle) {
        obj.pos.map = target;
        obj.pos.block = absolute - target_offset;
        log::debug!(
            "[world_operations::reparent_obj] {} moved to {}",
            obj.id,
            obj.pos
        );
    }
}

fn follow_camera(world: &mut WorldData) {
    let (Some(camera), Some(target)) = (world.objs.camera, world.objs.camera_attached) else {
        return;
    };
    let Some(pos) = get_obj(&world.objs, target).map(|obj| obj.pos) else {
        return;
    };
    if let Some(camera) = get_obj_mut(&mut world.objs, camera) {
        camera.pos = pos;
    }
}

/// Warps and script triggers under the player's new position
fn check_step_events(
    world: &mut WorldData,
    player: ObjHandle,
    report: &mut TickReport,
) -> EngineResult<()> {
    let Some(pos) = get_obj(&world.objs, player).map(|obj| obj.pos) else {
        return Ok(());
    };
    let Some(visible) = world.maps.maps.get(&pos.map).and_then(|m| m.visible.as_ref()) else {
        return Ok(());
    };
    // Elevation 0 on an event matches any elevation
    let under_player = |position, elevation: u8| {
        position == pos.block && (elevation == 0 || elevation == pos.elevation)
    };

    let warp = visible
        .events
        .warps
        .iter()
        .find(|w| under_player(w.position, w.elevation))
        .copied();
    let scripts: Vec<String> = visible
        .events
        .triggers
        .iter()
        .filter(|t| under_player(t.position, t.elevation))
        .map(|t| t.script.clone())
        .collect();

    report.scripts_triggered = scripts.len();
    for script in scripts {
        log::debug!(
            "[world_operations::check_step_events] Trigger '{}' at {}",
            script,
            pos
        );
        world.pending_scripts.push_back(script);
    }

    if let Some(warp) = warp {
        if world.pending_warp.is_some() {
            log::warn!(
                "[world_operations::check_step_events] Ignoring warp at {}, one is already pending",
                pos
            );
        } else {
            queue_warp(world, warp)?;
            report.warp_queued = true;
        }
    }
    Ok(())
}

// ============================================================================
// QUERIES
// ============================================================================

/// The obj the camera follows
pub fn player_handle(world: &WorldData) -> Option<ObjHandle> {
    world.objs.camera_attached
}

/// Layout cell at `pos`, border included; None if the map is not visible
pub fn block_at(world: &WorldData, pos: WorldPos) -> Option<LayoutCell> {
    let visible = world.maps.maps.get(&pos.map)?.visible.as_ref()?;
    get_block(&visible.layout, pos.block).copied()
}

/// Hand the queued trigger scripts to the script runtime
pub fn take_pending_scripts(world: &mut WorldData) -> Vec<String> {
    world.pending_scripts.drain(..).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::MapId;
    use crate::world::flags::{clear_flag, set_flag};
    use crate::world::map::{get_map, map_ref_count, on_map_no_longer_visible, on_map_now_visible};
    use crate::world::objs::{find_obj, iter_objs, queue_movement, MovementCommand};
    use crate::world::test_fixtures::{
        fixture_world, FIELD, HOUSE, ITEM_FLAG, ITEM_OBJ, ROUTE, ROUTE_SIGN, TOWN, TOWN_WARP,
    };
    use glam::IVec2;

    fn walk(world: &mut WorldData, player: ObjHandle, direction: FacingDirection) {
        queue_movement(&mut world.objs, player, MovementCommand::Walk(direction)).expect("queue");
    }

    #[test]
    fn test_init_spawns_player_and_camera() {
        let mut world = fixture_world();
        let player = init_world_at(&mut world, WorldPos::new(TOWN, 3, 5, 0)).expect("init");

        assert_eq!(player_handle(&world), Some(player));
        assert_eq!(camera_pos(&world.objs), Some(WorldPos::new(TOWN, 3, 5, 0)));
        assert_eq!(world.visible_maps, vec![TOWN, ROUTE, FIELD]);
        // Player, camera, lass, item ball, youngster
        assert_eq!(obj_count(&world.objs), 5);
        assert!(find_obj(&world.objs, TOWN, ITEM_OBJ).is_some());
    }

    #[test]
    fn test_init_twice_rejected() {
        let mut world = fixture_world();
        init_world_at(&mut world, WorldPos::new(TOWN, 3, 5, 0)).expect("init");
        assert!(matches!(
            init_world_at(&mut world, WorldPos::new(TOWN, 3, 5, 0)),
            Err(EngineError::StateError { .. })
        ));
    }

    #[test]
    fn test_init_on_unknown_map_cleans_up() {
        let mut world = fixture_world();
        assert!(init_world_at(&mut world, WorldPos::new(MapId(40), 0, 0, 0)).is_err());
        assert_eq!(obj_count(&world.objs), 0);
        assert!(world.objs.camera.is_none());
    }

    #[test]
    fn test_walking_across_connection_changes_current_map() {
        let mut world = fixture_world();
        let player = init_world_at(&mut world, WorldPos::new(TOWN, 3, 5, 0)).expect("init");

        walk(&mut world, player, FacingDirection::South);
        let report = tick_world(&mut world).expect("tick");
        assert_eq!(report.steps_finished, 1);
        assert_eq!(report.camera_map_changed, Some((TOWN, ROUTE)));

        let pos = get_obj(&world.objs, player).expect("player").pos;
        assert_eq!(pos.map, ROUTE);
        assert_eq!(pos.block, IVec2::new(3, 0));
        assert_eq!(camera_pos(&world.objs).map(|p| p.map), Some(ROUTE));
        assert_eq!(world.current_map, Some(ROUTE));
        assert_eq!(world.reachable_maps[0], ROUTE);
        // Town is still on screen, just north of the camera
        assert!(is_visible_loaded(&world.maps, TOWN));
        assert_eq!(get_map(&world.maps, TOWN).expect("town").block_offset, IVec2::new(0, -6));
        assert!(!get_map(&world.maps, TOWN).expect("town").is_current);
    }

    #[test]
    fn test_trigger_queues_script() {
        let mut world = fixture_world();
        let player =
            init_world_at(&mut world, WorldPos::new(ROUTE, ROUTE_SIGN.x, ROUTE_SIGN.y - 1, 0))
                .expect("init");
        walk(&mut world, player, FacingDirection::South);
        let report = tick_world(&mut world).expect("tick");
        assert_eq!(report.scripts_triggered, 1);
        assert_eq!(take_pending_scripts(&mut world), vec!["route_sign".to_string()]);
        assert!(world.pending_scripts.is_empty());
    }

    #[test]
    fn test_warp_after_delay() {
        let mut world = fixture_world();
        let player = init_world_at(
            &mut world,
            WorldPos::new(TOWN, TOWN_WARP.x, TOWN_WARP.y - 1, 0),
        )
        .expect("init");
        walk(&mut world, player, FacingDirection::South);

        let report = tick_world(&mut world).expect("tick 1");
        assert!(report.warp_queued);
        assert!(!report.warp_performed);
        assert_eq!(map_ref_count(&world.maps, HOUSE), 1);
        assert!(!tick_world(&mut world).expect("tick 2").warp_performed);
        assert!(tick_world(&mut world).expect("tick 3").warp_performed);

        let pos = get_obj(&world.objs, player).expect("player").pos;
        assert_eq!(pos, WorldPos::new(HOUSE, 1, 2, 0));
        assert_eq!(world.current_map, Some(HOUSE));
        assert_eq!(world.visible_maps, vec![HOUSE]);
        assert_eq!(map_ref_count(&world.maps, HOUSE), 1);
        assert!(get_map(&world.maps, TOWN).is_none());
        assert!(get_map(&world.maps, ROUTE).is_none());
        // Player, camera, mom
        assert_eq!(obj_count(&world.objs), 3);
    }

    #[test]
    fn test_event_obj_that_left_home_is_not_duplicated() {
        let mut world = fixture_world();
        init_world_at(&mut world, WorldPos::new(TOWN, 3, 5, 0)).expect("init");
        let lass = find_obj(&world.objs, TOWN, ObjId(1)).expect("lass");
        for _ in 0..5 {
            walk(&mut world, lass, FacingDirection::South);
        }
        for _ in 0..10 {
            tick_world(&mut world).expect("tick");
        }
        let pos = get_obj(&world.objs, lass).expect("lass").pos;
        assert_eq!(pos, WorldPos::new(ROUTE, 1, 0, 0));

        on_map_no_longer_visible(&mut world, TOWN).expect("hide town");
        on_map_now_visible(&mut world, TOWN).expect("show town");

        let lasses: Vec<WorldPos> = iter_objs(&world.objs)
            .filter(|(_, obj)| obj.id == ObjId(1))
            .map(|(_, obj)| obj.pos)
            .collect();
        assert_eq!(lasses, vec![WorldPos::new(ROUTE, 1, 0, 0)]);
        assert!(find_obj(&world.objs, TOWN, ITEM_OBJ).is_some());
    }

    #[test]
    fn test_flag_cleared_spawns_on_reload() {
        let mut world = fixture_world();
        set_flag(&mut world.flags, ITEM_FLAG);
        init_world_at(&mut world, WorldPos::new(TOWN, 2, 1, 0)).expect("init");
        assert!(find_obj(&world.objs, TOWN, ITEM_OBJ).is_none());
        teardown_world(&mut world).expect("teardown");

        clear_flag(&mut world.flags, ITEM_FLAG);
        init_world_at(&mut world, WorldPos::new(TOWN, 2, 1, 0)).expect("re-init");
        assert!(find_obj(&world.objs, TOWN, ITEM_OBJ).is_some());
    }

    #[test]
    fn test_teardown_after_play_drains_every_cache() {
        let mut world = fixture_world();
        let player = init_world_at(&mut world, WorldPos::new(TOWN, 3, 4, 0)).expect("init");
        for _ in 0..4 {
            walk(&mut world, player, FacingDirection::South);
        }
        walk(&mut world, player, FacingDirection::East);
        for _ in 0..6 {
            tick_world(&mut world).expect("tick");
        }
        assert_eq!(world.current_map, Some(ROUTE));

        teardown_world(&mut world).expect("teardown");
        assert!(world.maps.maps.is_empty());
        assert_eq!(loaded_blockset_count(&world.blocksets), 0);
        assert!(world.encounter_tables.tables.is_empty());
        assert_eq!(obj_count(&world.objs), 0);
        assert!(world.current_map.is_none());
    }

    #[test]
    fn test_block_at_reads_border() {
        let mut world = fixture_world();
        init_world_at(&mut world, WorldPos::new(HOUSE, 1, 1, 0)).expect("init");
        let inside = block_at(&world, WorldPos::new(HOUSE, 1, 1, 0)).expect("inside");
        let border = block_at(&world, WorldPos::new(HOUSE, -1, -1, 0)).expect("border");
        assert!(!crate::world::layout::cell_is_blocked(&inside));
        assert!(crate::world::layout::cell_is_blocked(&border));
        assert!(block_at(&world, WorldPos::new(TOWN, 0, 0, 0)).is_none());
    }
}
