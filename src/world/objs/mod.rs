//! World objs: camera, player and event objs in one ordered arena

pub mod movement_operations;
pub mod obj_data;
pub mod obj_operations;

pub use movement_operations::{
    advance_obj, advance_objs, begin_movement, movement_code, movement_from_code, pop_movement,
    queue_movement, queue_movement_codes,
};
pub use obj_data::{MovementCommand, MovementState, ObjData, ObjHandle, ObjKind, ObjRegistryData, ObjSlot};
pub use obj_operations::{
    attach_camera, camera_pos, create_event_objs, create_obj_registry, delete_event_objs,
    find_event_obj, find_obj, get_obj, get_obj_mut, insert_obj, iter_objs, new_obj, obj_count,
    obj_handles, objs_on_map, remove_obj, spawn_camera, ObjIter,
};
