//! Map Lifecycle Operations - DOP Functions
//!
//! A map's reference count is the number of visible maps connecting to it,
//! plus one while it is current, plus one while it is a pending warp target.
//! The three sources add up independently. Reaching zero evicts the map and
//! everything it still holds.

use super::connection_walker::recompute_block_offsets;
use super::map_assets::{parse_map_asset, parse_map_details, parse_map_events};
use super::map_data::{CurrentMapData, MapData, MapEvents, VisibleMapData};
use super::registry_operations::{add_reference, load_or_get};
use crate::assets::paths;
use crate::error::{EngineError, EngineResult, ErrorContext};
use crate::world::core::{LayoutId, MapId};
use crate::world::data_types::WorldData;
use crate::world::encounters::{self, parse_map_encounters, MapEncounters};
use crate::world::error::{state_error, WorldErrorContext};
use crate::world::layout::{create_layout, delete_layout};
use crate::world::objs::{create_event_objs, delete_event_objs};

fn map_mut(world: &mut WorldData, id: MapId) -> EngineResult<&mut MapData> {
    world.maps.maps.get_mut(&id).world_context("map", id)
}

/// Re-run the offset walk from the current map
pub fn recompute_offsets(world: &mut WorldData) {
    match world.current_map {
        Some(current) => {
            world.reachable_maps = recompute_block_offsets(&mut world.maps, current);
        }
        None => world.reachable_maps.clear(),
    }
}

fn register_and_reference(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    load_or_get(&mut world.maps, world.assets.as_ref(), id)?;
    add_reference(&mut world.maps, id)?;
    Ok(())
}

fn release_maps(world: &mut WorldData, targets: &[MapId]) -> EngineResult<()> {
    for &target in targets {
        deduct_map_reference(world, target)?;
    }
    Ok(())
}

/// Drop one reference to `id`, evicting the map at zero
pub fn deduct_map_reference(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let map = world
        .maps
        .maps
        .get_mut(&id)
        .filter(|m| m.ref_count > 0)
        .ok_or_else(|| EngineError::ReferenceUnderflow {
            resource: "map".to_string(),
            id: id.to_string(),
        })?;
    map.ref_count -= 1;
    if map.ref_count == 0 {
        evict_map(world, id)?;
    }
    Ok(())
}

fn evict_map(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let Some(map) = world.maps.maps.remove(&id) else {
        return Ok(());
    };
    world.maps.stats.evictions += 1;
    world.reachable_maps.retain(|m| *m != id);

    if let Some(current) = map.current {
        encounters::release_tables(&mut world.encounter_tables, &current.encounters)?;
    }
    if let Some(visible) = map.visible {
        unload_visible_data(world, id, visible)?;
    }
    log::info!("[lifecycle_operations::evict_map] Evicted {}", id);
    Ok(())
}

fn load_events(world: &WorldData, id: MapId) -> EngineResult<MapEvents> {
    let path = paths::events(id.0);
    let bytes = world
        .assets
        .load(&path)
        .with_context(|| format!("events of {}", id))?;
    Ok(parse_map_events(&path, &bytes)?)
}

fn load_visible_data(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    if !world.maps.maps.contains_key(&id) {
        return Err(EngineError::ResourceNotFound {
            resource_type: "map".to_string(),
            id: id.to_string(),
        });
    }

    let path = paths::map(id.0);
    let bytes = world
        .assets
        .load(&path)
        .with_context(|| format!("connections of {}", id))?;
    let asset = parse_map_asset(&path, &bytes)?;

    let mut referenced = Vec::with_capacity(asset.connections.len());
    for con in &asset.connections {
        if let Err(e) = register_and_reference(world, con.map) {
            release_maps(world, &referenced)?;
            return Err(e);
        }
        referenced.push(con.map);
    }

    let owner = LayoutId(world.next_layout_id);
    world.next_layout_id = world.next_layout_id.wrapping_add(1);
    let layout = match create_layout(&mut world.blocksets, world.assets.as_ref(), id, owner) {
        Ok(layout) => layout,
        Err(e) => {
            release_maps(world, &referenced)?;
            return Err(e);
        }
    };

    let events = match load_events(world, id) {
        Ok(events) => events,
        Err(e) => {
            delete_layout(layout, &mut world.blocksets)?;
            release_maps(world, &referenced)?;
            return Err(e);
        }
    };

    let spawned = create_event_objs(&mut world.objs, id, &events, &world.flags);
    let map = map_mut(world, id)?;
    map.visible = Some(VisibleMapData {
        connections: asset.connections,
        layout,
        events,
    });
    world.maps.stats.visible_loads += 1;
    world.visible_maps.push(id);

    log::info!(
        "[lifecycle_operations::load_visible_data] {} visible: {} connections, {} objs spawned",
        id,
        referenced.len(),
        spawned
    );
    Ok(())
}

fn unload_visible_data(world: &mut WorldData, id: MapId, visible: VisibleMapData) -> EngineResult<()> {
    let removed = delete_event_objs(&mut world.objs, id);
    world.visible_maps.retain(|m| *m != id);
    delete_layout(visible.layout, &mut world.blocksets)?;

    // Connection targets last: releasing one may cascade into further evictions
    let targets: Vec<MapId> = visible.connections.iter().map(|c| c.map).collect();
    release_maps(world, &targets)?;

    log::info!(
        "[lifecycle_operations::unload_visible_data] {} no longer visible, {} objs removed",
        id,
        removed
    );
    Ok(())
}

fn load_current_data(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let details_path = paths::details(id.0);
    let bytes = world
        .assets
        .load(&details_path)
        .with_context(|| format!("details of {}", id))?;
    let details = parse_map_details(&details_path, &bytes)?;

    let encounters_path = paths::encounters(id.0);
    let bytes = world
        .assets
        .load(&encounters_path)
        .with_context(|| format!("encounters of {}", id))?;
    let encounters: MapEncounters = parse_map_encounters(&encounters_path, &bytes)?;
    encounters::retain_tables(&mut world.encounter_tables, world.assets.as_ref(), &encounters)?;

    log::debug!(
        "[lifecycle_operations::load_current_data] {} '{}' ({} encounter entries)",
        id,
        details.name,
        encounters.entries.len()
    );
    let map = map_mut(world, id)?;
    map.current = Some(CurrentMapData {
        details,
        encounters,
    });
    world.maps.stats.current_loads += 1;
    Ok(())
}

fn ensure_current_data(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let loaded = world
        .maps
        .maps
        .get(&id)
        .world_context("map", id)?
        .current
        .is_some();
    if loaded {
        return Ok(());
    }
    load_current_data(world, id)
}

fn discard_current_data(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let current = map_mut(world, id)?.current.take();
    if let Some(current) = current {
        encounters::release_tables(&mut world.encounter_tables, &current.encounters)?;
        log::debug!(
            "[lifecycle_operations::discard_current_data] Discarded current data of {}",
            id
        );
    }
    Ok(())
}

/// Load visible data for a registered map. No-op when already loaded.
pub fn on_map_now_visible(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let map = world.maps.maps.get(&id).world_context("map", id)?;
    if map.visible.is_some() {
        log::warn!(
            "[lifecycle_operations::on_map_now_visible] {} is already visible",
            id
        );
        return Ok(());
    }
    load_visible_data(world, id)?;
    recompute_offsets(world);
    Ok(())
}

/// Drop visible data. No-op when the map is unknown or not visible.
pub fn on_map_no_longer_visible(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let visible = world.maps.maps.get_mut(&id).and_then(|m| m.visible.take());
    let Some(visible) = visible else {
        log::warn!(
            "[lifecycle_operations::on_map_no_longer_visible] {} is not visible",
            id
        );
        return Ok(());
    };
    unload_visible_data(world, id, visible)?;
    recompute_offsets(world);
    Ok(())
}

/// Make `id` the current map: one reference, visible and current data
/// loaded, offsets recomputed from it
pub fn on_current_map(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let map = load_or_get(&mut world.maps, world.assets.as_ref(), id)?;
    if map.is_current {
        return Err(state_error(
            format!("{} not current", id),
            "already current",
        ));
    }
    map.ref_count += 1;
    map.is_current = true;
    let needs_visible = map.visible.is_none();

    let mut loaded = Ok(());
    if needs_visible {
        loaded = load_visible_data(world, id);
    }
    if loaded.is_ok() {
        loaded = ensure_current_data(world, id);
    }
    if let Err(e) = loaded {
        map_mut(world, id)?.is_current = false;
        deduct_map_reference(world, id)?;
        return Err(e);
    }

    world.current_map = Some(id);
    recompute_offsets(world);
    log::info!("[lifecycle_operations::on_current_map] {} is now current", id);
    Ok(())
}

pub fn on_no_longer_current_map(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let map = map_mut(world, id)?;
    if !map.is_current {
        return Err(state_error(format!("{} current", id), "not current"));
    }
    map.is_current = false;
    if !map.is_warp_target {
        discard_current_data(world, id)?;
    }
    if world.current_map == Some(id) {
        world.current_map = None;
    }
    deduct_map_reference(world, id)?;
    recompute_offsets(world);
    log::info!(
        "[lifecycle_operations::on_no_longer_current_map] {} is no longer current",
        id
    );
    Ok(())
}

/// Hold `id` as a warp destination: one reference and its current data,
/// whether or not it is visible
pub fn on_warping_map(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let map = load_or_get(&mut world.maps, world.assets.as_ref(), id)?;
    if map.is_warp_target {
        return Err(state_error(
            format!("{} not a warp target", id),
            "already a warp target",
        ));
    }
    map.ref_count += 1;
    map.is_warp_target = true;

    if let Err(e) = ensure_current_data(world, id) {
        map_mut(world, id)?.is_warp_target = false;
        deduct_map_reference(world, id)?;
        return Err(e);
    }
    log::info!("[lifecycle_operations::on_warping_map] Holding {} for a warp", id);
    Ok(())
}

pub fn on_no_longer_warping_map(world: &mut WorldData, id: MapId) -> EngineResult<()> {
    let map = map_mut(world, id)?;
    if !map.is_warp_target {
        return Err(state_error(format!("{} warp target", id), "not a warp target"));
    }
    map.is_warp_target = false;
    if !map.is_current {
        discard_current_data(world, id)?;
    }
    deduct_map_reference(world, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::blockset::loaded_blockset_count;
    use crate::world::map::registry_operations::{get_map, is_current_loaded, is_visible_loaded, map_ref_count};
    use crate::world::objs::obj_count;
    use crate::world::test_fixtures::{fixture_world, FIELD, HOUSE, ROUTE, TOWN};

    #[test]
    fn test_current_map_loads_both_payloads() {
        let mut world = fixture_world();
        on_current_map(&mut world, TOWN).expect("town current");

        assert!(is_visible_loaded(&world.maps, TOWN));
        assert!(is_current_loaded(&world.maps, TOWN));
        assert_eq!(world.current_map, Some(TOWN));
        // Town connects south to the route, which is registered but not visible
        assert_eq!(map_ref_count(&world.maps, ROUTE), 1);
        assert!(!is_visible_loaded(&world.maps, ROUTE));
        assert_eq!(world.reachable_maps, vec![TOWN, ROUTE]);
    }

    #[test]
    fn test_balanced_sequence_leaves_nothing_loaded() {
        let mut world = fixture_world();
        on_current_map(&mut world, TOWN).expect("town current");
        on_map_now_visible(&mut world, ROUTE).expect("route visible");
        on_map_now_visible(&mut world, FIELD).expect("field visible");
        on_warping_map(&mut world, HOUSE).expect("house warp");

        on_no_longer_warping_map(&mut world, HOUSE).expect("house released");
        on_map_no_longer_visible(&mut world, FIELD).expect("field hidden");
        on_map_no_longer_visible(&mut world, ROUTE).expect("route hidden");
        on_no_longer_current_map(&mut world, TOWN).expect("town released");

        assert!(world.maps.maps.is_empty());
        assert_eq!(loaded_blockset_count(&world.blocksets), 0);
        assert!(world.encounter_tables.tables.is_empty());
        assert_eq!(obj_count(&world.objs), 0);
        assert!(world.visible_maps.is_empty());
    }

    /// Map refs, blockset refs with per-block owner counts, table refs, objs,
    /// visible maps
    type Snapshot = (
        Vec<(u16, u32)>,
        Vec<(u16, u32, Vec<usize>)>,
        Vec<(u16, u32)>,
        usize,
        Vec<u16>,
    );

    fn refcount_snapshot(world: &WorldData) -> Snapshot {
        let mut maps: Vec<(u16, u32)> = world
            .maps
            .maps
            .values()
            .map(|m| (m.id.0, m.ref_count))
            .collect();
        maps.sort_unstable();
        let mut blocksets: Vec<(u16, u32, Vec<usize>)> = world
            .blocksets
            .blocksets
            .values()
            .map(|b| {
                let owners = b.blocks.iter().map(|block| block.owners.len()).collect();
                (b.id.0, b.ref_count, owners)
            })
            .collect();
        blocksets.sort_unstable();
        let mut tables: Vec<(u16, u32)> = world
            .encounter_tables
            .tables
            .iter()
            .map(|(id, cached)| (id.0, cached.ref_count))
            .collect();
        tables.sort_unstable();
        let mut visible: Vec<u16> = world.visible_maps.iter().map(|id| id.0).collect();
        visible.sort_unstable();
        (maps, blocksets, tables, obj_count(&world.objs), visible)
    }

    #[test]
    fn test_balanced_sequence_mid_session_restores_counts() {
        let mut world = fixture_world();
        on_current_map(&mut world, TOWN).expect("town current");
        on_map_now_visible(&mut world, ROUTE).expect("route visible");
        let before = refcount_snapshot(&world);

        on_map_now_visible(&mut world, FIELD).expect("field visible");
        on_warping_map(&mut world, HOUSE).expect("house warp");
        on_current_map(&mut world, ROUTE).expect("route current");
        on_no_longer_current_map(&mut world, TOWN).expect("town released");
        on_current_map(&mut world, TOWN).expect("town current again");
        on_no_longer_current_map(&mut world, ROUTE).expect("route released");
        on_no_longer_warping_map(&mut world, HOUSE).expect("house released");
        on_map_no_longer_visible(&mut world, FIELD).expect("field hidden");

        assert_eq!(refcount_snapshot(&world), before);
        assert_eq!(world.current_map, Some(TOWN));
        assert!(get_map(&world.maps, HOUSE).is_none());
        assert!(is_current_loaded(&world.maps, TOWN));
        assert!(!is_current_loaded(&world.maps, ROUTE));
    }

    #[test]
    fn test_repeated_now_visible_spawns_once() {
        let mut world = fixture_world();
        on_current_map(&mut world, TOWN).expect("town current");
        let objs = obj_count(&world.objs);
        on_map_now_visible(&mut world, TOWN).expect("again");
        on_map_now_visible(&mut world, TOWN).expect("and again");
        assert_eq!(obj_count(&world.objs), objs);
        assert_eq!(world.maps.stats.visible_loads, 1);
    }

    #[test]
    fn test_no_longer_visible_on_unknown_map_is_noop() {
        let mut world = fixture_world();
        on_map_no_longer_visible(&mut world, MapId(77)).expect("noop");
        on_current_map(&mut world, TOWN).expect("town current");
        on_map_no_longer_visible(&mut world, ROUTE).expect("route never visible");
        assert_eq!(map_ref_count(&world.maps, ROUTE), 1);
    }

    #[test]
    fn test_now_visible_requires_registration() {
        let mut world = fixture_world();
        assert!(matches!(
            on_map_now_visible(&mut world, ROUTE),
            Err(EngineError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_warp_target_keeps_current_data_after_currency_ends() {
        let mut world = fixture_world();
        on_warping_map(&mut world, HOUSE).expect("house warp");
        on_current_map(&mut world, HOUSE).expect("house current");
        assert_eq!(map_ref_count(&world.maps, HOUSE), 2);

        on_no_longer_current_map(&mut world, HOUSE).expect("house not current");
        assert!(is_current_loaded(&world.maps, HOUSE));
        on_no_longer_warping_map(&mut world, HOUSE).expect("house released");
        assert!(get_map(&world.maps, HOUSE).is_none());
    }

    #[test]
    fn test_lifecycle_misuse_is_reported() {
        let mut world = fixture_world();
        on_current_map(&mut world, TOWN).expect("town current");
        assert!(matches!(
            on_current_map(&mut world, TOWN),
            Err(EngineError::StateError { .. })
        ));
        assert!(matches!(
            on_no_longer_warping_map(&mut world, TOWN),
            Err(EngineError::StateError { .. })
        ));
        assert!(matches!(
            deduct_map_reference(&mut world, MapId(77)),
            Err(EngineError::ReferenceUnderflow { .. })
        ));
    }

    #[test]
    fn test_connection_cycle_unloads_cleanly() {
        let mut world = fixture_world();
        on_current_map(&mut world, TOWN).expect("town current");
        on_map_now_visible(&mut world, ROUTE).expect("route visible");
        // Route connects back north to town
        assert_eq!(map_ref_count(&world.maps, TOWN), 2);

        on_no_longer_current_map(&mut world, TOWN).expect("town released");
        assert!(get_map(&world.maps, TOWN).is_some());
        on_map_no_longer_visible(&mut world, TOWN).expect("town hidden");

        // Dropping town's connection evicted the route, whose own connection
        // back to town took town down with it
        assert!(world.maps.maps.is_empty());
        assert_eq!(loaded_blockset_count(&world.blocksets), 0);
    }
}
