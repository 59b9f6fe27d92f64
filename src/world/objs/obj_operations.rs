//! Obj Registry Operations - DOP Functions
//!
//! Slots are reused through a free list; every reuse bumps the slot's
//! generation so stale handles stop resolving.

use super::obj_data::{ObjData, ObjHandle, ObjKind, ObjRegistryData, ObjSlot, MovementState};
use crate::error::EngineResult;
use crate::world::core::{FacingDirection, MapId, ObjId, WorldPos};
use crate::world::error::state_error;
use crate::world::flags::{self, FlagStore};
use crate::world::map::MapEvents;
use std::collections::VecDeque;

pub fn create_obj_registry() -> ObjRegistryData {
    ObjRegistryData::default()
}

pub fn new_obj(id: ObjId, kind: ObjKind, pos: WorldPos, facing: FacingDirection) -> ObjData {
    ObjData {
        id,
        kind,
        pos,
        facing,
        movement: MovementState::Idle,
        queue: VecDeque::new(),
    }
}

/// Append `obj` at the end of the registry order
pub fn insert_obj(registry: &mut ObjRegistryData, obj: ObjData) -> ObjHandle {
    let index = match registry.free.pop() {
        Some(index) => index,
        None => {
            registry.slots.push(ObjSlot::default());
            (registry.slots.len() - 1) as u32
        }
    };

    let tail = registry.tail;
    let slot = &mut registry.slots[index as usize];
    slot.obj = Some(obj);
    slot.prev = tail;
    slot.next = None;
    let generation = slot.generation;

    match tail {
        Some(tail) => registry.slots[tail as usize].next = Some(index),
        None => registry.head = Some(index),
    }
    registry.tail = Some(index);
    registry.len += 1;

    ObjHandle { index, generation }
}

fn slot_is_live(registry: &ObjRegistryData, handle: ObjHandle) -> bool {
    registry
        .slots
        .get(handle.index as usize)
        .map_or(false, |s| s.generation == handle.generation && s.obj.is_some())
}

/// Unlink and return the obj behind `handle`. Stale handles return None.
pub fn remove_obj(registry: &mut ObjRegistryData, handle: ObjHandle) -> Option<ObjData> {
    if !slot_is_live(registry, handle) {
        return None;
    }

    let (prev, next, obj) = {
        let slot = &mut registry.slots[handle.index as usize];
        let obj = slot.obj.take();
        slot.generation = slot.generation.wrapping_add(1);
        (slot.prev.take(), slot.next.take(), obj)
    };

    match prev {
        Some(prev) => registry.slots[prev as usize].next = next,
        None => registry.head = next,
    }
    match next {
        Some(next) => registry.slots[next as usize].prev = prev,
        None => registry.tail = prev,
    }

    registry.free.push(handle.index);
    registry.len -= 1;

    if registry.camera == Some(handle) {
        registry.camera = None;
    }
    if registry.camera_attached == Some(handle) {
        registry.camera_attached = None;
    }

    obj
}

pub fn get_obj(registry: &ObjRegistryData, handle: ObjHandle) -> Option<&ObjData> {
    registry
        .slots
        .get(handle.index as usize)
        .filter(|s| s.generation == handle.generation)
        .and_then(|s| s.obj.as_ref())
}

pub fn get_obj_mut(registry: &mut ObjRegistryData, handle: ObjHandle) -> Option<&mut ObjData> {
    registry
        .slots
        .get_mut(handle.index as usize)
        .filter(|s| s.generation == handle.generation)
        .and_then(|s| s.obj.as_mut())
}

pub fn obj_count(registry: &ObjRegistryData) -> usize {
    registry.len
}

/// Iterator over live objs in registry order
pub struct ObjIter<'a> {
    registry: &'a ObjRegistryData,
    cursor: Option<u32>,
}

impl<'a> Iterator for ObjIter<'a> {
    type Item = (ObjHandle, &'a ObjData);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let slot = &self.registry.slots[index as usize];
        self.cursor = slot.next;
        let obj = slot.obj.as_ref()?;
        Some((
            ObjHandle {
                index,
                generation: slot.generation,
            },
            obj,
        ))
    }
}

pub fn iter_objs(registry: &ObjRegistryData) -> ObjIter<'_> {
    ObjIter {
        registry,
        cursor: registry.head,
    }
}

/// Handles in registry order, for passes that mutate while walking
pub fn obj_handles(registry: &ObjRegistryData) -> Vec<ObjHandle> {
    iter_objs(registry).map(|(handle, _)| handle).collect()
}

pub fn find_obj(registry: &ObjRegistryData, map: MapId, id: ObjId) -> Option<ObjHandle> {
    iter_objs(registry)
        .find(|(_, obj)| obj.id == id && obj.pos.map == map)
        .map(|(handle, _)| handle)
}

/// Live event obj spawned from `home`'s events with `id`, wherever it walked
pub fn find_event_obj(registry: &ObjRegistryData, home: MapId, id: ObjId) -> Option<ObjHandle> {
    iter_objs(registry)
        .find(|(_, obj)| {
            obj.id == id && matches!(&obj.kind, ObjKind::Event { home: h, .. } if *h == home)
        })
        .map(|(handle, _)| handle)
}

pub fn objs_on_map(registry: &ObjRegistryData, map: MapId) -> Vec<ObjHandle> {
    iter_objs(registry)
        .filter(|(_, obj)| obj.pos.map == map)
        .map(|(handle, _)| handle)
        .collect()
}

/// Spawn the camera. Only one may exist.
pub fn spawn_camera(registry: &mut ObjRegistryData, pos: WorldPos) -> EngineResult<ObjHandle> {
    if registry.camera.is_some() {
        return Err(state_error("no camera", "camera already spawned"));
    }
    let handle = insert_obj(
        registry,
        new_obj(ObjId::CAMERA, ObjKind::Camera, pos, FacingDirection::South),
    );
    registry.camera = Some(handle);
    Ok(handle)
}

/// Make the camera follow `target`
pub fn attach_camera(registry: &mut ObjRegistryData, target: ObjHandle) -> EngineResult<()> {
    if registry.camera.is_none() {
        return Err(state_error("camera spawned", "no camera"));
    }
    if get_obj(registry, target).is_none() {
        return Err(state_error("live attach target", "stale obj handle"));
    }
    registry.camera_attached = Some(target);
    Ok(())
}

pub fn camera_pos(registry: &ObjRegistryData) -> Option<WorldPos> {
    registry
        .camera
        .and_then(|handle| get_obj(registry, handle))
        .map(|obj| obj.pos)
}

/// Spawn one obj per event descriptor of `map`, skipping descriptors whose
/// flag is set. Returns the number spawned.
pub fn create_event_objs(
    registry: &mut ObjRegistryData,
    map: MapId,
    events: &MapEvents,
    flag_store: &FlagStore,
) -> usize {
    let mut spawned = 0;
    for event in &events.objs {
        if let Some(flag) = event.flag {
            if flags::get_flag(flag_store, flag) {
                log::debug!(
                    "[obj_operations::create_event_objs] {} on {} suppressed by flag {}",
                    event.id,
                    map,
                    flag.0
                );
                continue;
            }
        }
        if find_event_obj(registry, map, event.id).is_some() {
            log::debug!(
                "[obj_operations::create_event_objs] {} from {} still alive elsewhere",
                event.id,
                map
            );
            continue;
        }

        let kind = ObjKind::Event {
            home: map,
            sprite: event.sprite.clone(),
            movement_type: event.movement_type,
            flag: event.flag,
            script: event.script.clone(),
        };
        let pos = WorldPos {
            map,
            block: event.position,
            elevation: event.elevation,
        };
        insert_obj(registry, new_obj(event.id, kind, pos, event.facing));
        spawned += 1;
    }
    spawned
}

/// Remove every obj on `map` except the camera and the obj it follows.
/// Returns the number removed.
pub fn delete_event_objs(registry: &mut ObjRegistryData, map: MapId) -> usize {
    let mut removed = 0;
    for handle in objs_on_map(registry, map) {
        if Some(handle) == registry.camera || Some(handle) == registry.camera_attached {
            continue;
        }
        if remove_obj(registry, handle).is_some() {
            removed += 1;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::FlagId;
    use crate::world::flags::{create_flag_store, set_flag};
    use crate::world::map::ObjEvent;
    use glam::IVec2;

    fn event(id: u16, flag: Option<FlagId>) -> ObjEvent {
        ObjEvent {
            id: ObjId(id),
            sprite: "youngster".to_string(),
            position: IVec2::new(id as i32, 1),
            elevation: 0,
            facing: FacingDirection::South,
            movement_type: 0,
            flag,
            script: None,
        }
    }

    fn player(map: u16) -> ObjData {
        new_obj(
            ObjId::PLAYER,
            ObjKind::Player,
            WorldPos::new(MapId(map), 0, 0, 0),
            FacingDirection::South,
        )
    }

    #[test]
    fn test_insert_remove_keeps_order() {
        let mut registry = create_obj_registry();
        let a = insert_obj(&mut registry, player(1));
        let b = insert_obj(&mut registry, player(2));
        let c = insert_obj(&mut registry, player(3));

        assert!(remove_obj(&mut registry, b).is_some());
        assert_eq!(obj_handles(&registry), vec![a, c]);

        assert!(remove_obj(&mut registry, a).is_some());
        assert!(remove_obj(&mut registry, c).is_some());
        assert_eq!(obj_count(&registry), 0);
        assert!(registry.head.is_none());
        assert!(registry.tail.is_none());
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut registry = create_obj_registry();
        let a = insert_obj(&mut registry, player(1));
        remove_obj(&mut registry, a);
        let b = insert_obj(&mut registry, player(2));

        assert_eq!(a.index, b.index);
        assert_ne!(a.generation, b.generation);
        assert!(get_obj(&registry, a).is_none());
        assert!(remove_obj(&mut registry, a).is_none());
        assert_eq!(get_obj(&registry, b).map(|o| o.pos.map), Some(MapId(2)));
    }

    #[test]
    fn test_flag_gated_spawn() {
        let mut registry = create_obj_registry();
        let mut flag_store = create_flag_store(16);
        set_flag(&mut flag_store, FlagId(3));

        let events = MapEvents {
            warps: Vec::new(),
            objs: vec![event(1, None), event(2, Some(FlagId(3)))],
            triggers: Vec::new(),
        };
        assert_eq!(create_event_objs(&mut registry, MapId(1), &events, &flag_store), 1);
        assert!(find_obj(&registry, MapId(1), ObjId(1)).is_some());
        assert!(find_obj(&registry, MapId(1), ObjId(2)).is_none());
    }

    #[test]
    fn test_camera_and_attached_survive_delete() {
        let mut registry = create_obj_registry();
        let flag_store = create_flag_store(16);
        let player = insert_obj(&mut registry, player(1));
        spawn_camera(&mut registry, WorldPos::new(MapId(1), 0, 0, 0)).expect("camera");
        attach_camera(&mut registry, player).expect("attach");

        let events = MapEvents {
            warps: Vec::new(),
            objs: vec![event(1, None), event(2, None)],
            triggers: Vec::new(),
        };
        create_event_objs(&mut registry, MapId(1), &events, &flag_store);
        assert_eq!(obj_count(&registry), 4);

        assert_eq!(delete_event_objs(&mut registry, MapId(1)), 2);
        assert_eq!(obj_count(&registry), 2);
        assert!(registry.camera.is_some());
        assert_eq!(registry.camera_attached, Some(player));
    }

    #[test]
    fn test_wandered_event_obj_not_respawned() {
        let mut registry = create_obj_registry();
        let flag_store = create_flag_store(16);
        let events = MapEvents {
            warps: Vec::new(),
            objs: vec![event(1, None), event(2, None)],
            triggers: Vec::new(),
        };
        create_event_objs(&mut registry, MapId(1), &events, &flag_store);

        let walker = find_obj(&registry, MapId(1), ObjId(1)).expect("walker");
        get_obj_mut(&mut registry, walker).expect("live").pos = WorldPos::new(MapId(2), 1, 0, 0);

        assert_eq!(delete_event_objs(&mut registry, MapId(1)), 1);
        assert_eq!(create_event_objs(&mut registry, MapId(1), &events, &flag_store), 1);

        let ones = iter_objs(&registry).filter(|(_, o)| o.id == ObjId(1)).count();
        assert_eq!(ones, 1);
        assert_eq!(find_event_obj(&registry, MapId(1), ObjId(1)), Some(walker));
        assert!(find_obj(&registry, MapId(1), ObjId(2)).is_some());
    }

    #[test]
    fn test_second_camera_rejected() {
        let mut registry = create_obj_registry();
        spawn_camera(&mut registry, WorldPos::new(MapId(1), 0, 0, 0)).expect("camera");
        assert!(spawn_camera(&mut registry, WorldPos::new(MapId(1), 0, 0, 0)).is_err());
    }
}
