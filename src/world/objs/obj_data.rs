//! Obj Data - Pure DOP
//!
//! NO METHODS. Just data.
//! Arena bookkeeping lives in obj_operations.rs, movement in
//! movement_operations.rs.

use crate::world::core::{FacingDirection, FlagId, MapId, ObjId, WorldPos};
use glam::IVec2;
use std::collections::VecDeque;

/// Generation-checked reference to an arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjHandle {
    pub index: u32,
    pub generation: u32,
}

/// What an obj is; replaces downcasting on a base obj type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjKind {
    Camera,
    Player,
    Event {
        /// Map whose events spawned it; survives re-parenting
        home: MapId,
        sprite: String,
        movement_type: u8,
        flag: Option<FlagId>,
        script: Option<String>,
    },
}

/// Scripted movement command. Codes 0-7 face, 8-15 walk, 16-23 run, each
/// block ordered like `FacingDirection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementCommand {
    Face(FacingDirection),
    Walk(FacingDirection),
    Run(FacingDirection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementState {
    #[default]
    Idle,
    /// Block coordinates relative to the obj's map at the time the step began
    Moving {
        from: IVec2,
        to: IVec2,
        elapsed: u32,
        total: u32,
    },
}

#[derive(Debug, Clone)]
pub struct ObjData {
    pub id: ObjId,
    pub kind: ObjKind,
    pub pos: WorldPos,
    pub facing: FacingDirection,
    pub movement: MovementState,
    pub queue: VecDeque<MovementCommand>,
}

/// Arena slot. `prev`/`next` thread live slots in registry order.
#[derive(Debug, Clone, Default)]
pub struct ObjSlot {
    pub generation: u32,
    pub obj: Option<ObjData>,
    pub prev: Option<u32>,
    pub next: Option<u32>,
}

/// All live objs: arena slots, free list, and an ordering list with O(1)
/// removal
#[derive(Debug, Clone, Default)]
pub struct ObjRegistryData {
    pub slots: Vec<ObjSlot>,
    pub free: Vec<u32>,
    pub head: Option<u32>,
    pub tail: Option<u32>,
    pub len: usize,
    pub camera: Option<ObjHandle>,
    /// Obj the camera follows; survives map unloads like the camera does
    pub camera_attached: Option<ObjHandle>,
}
