//! Scripted movement
//!
//! Scripts feed raw movement codes; objs consume one command per tick once
//! their previous step has finished.

use super::obj_data::{MovementCommand, MovementState, ObjData, ObjHandle, ObjRegistryData};
use super::obj_operations::{get_obj_mut, obj_handles};
use crate::error::EngineResult;
use crate::world::core::{FacingDirection, ObjId};
use crate::world::error::{MovementError, WorldErrorContext};

const CODES_PER_KIND: u8 = 8;

/// Decode a raw movement code for `obj`
pub fn movement_from_code(obj: ObjId, code: u8) -> Result<MovementCommand, MovementError> {
    let direction = FacingDirection::from_u8(code % CODES_PER_KIND)
        .ok_or(MovementError::UnknownCode { obj, code })?;
    match code / CODES_PER_KIND {
        0 => Ok(MovementCommand::Face(direction)),
        1 => Ok(MovementCommand::Walk(direction)),
        2 => Ok(MovementCommand::Run(direction)),
        _ => Err(MovementError::UnknownCode { obj, code }),
    }
}

pub fn movement_code(command: MovementCommand) -> u8 {
    match command {
        MovementCommand::Face(d) => d as u8,
        MovementCommand::Walk(d) => CODES_PER_KIND + d as u8,
        MovementCommand::Run(d) => 2 * CODES_PER_KIND + d as u8,
    }
}

pub fn queue_movement(
    registry: &mut ObjRegistryData,
    handle: ObjHandle,
    command: MovementCommand,
) -> EngineResult<()> {
    let obj = get_obj_mut(registry, handle).world_context("obj", handle.index)?;
    obj.queue.push_back(command);
    Ok(())
}

/// Queue a script's raw codes. Nothing is queued if any code is unknown.
pub fn queue_movement_codes(
    registry: &mut ObjRegistryData,
    handle: ObjHandle,
    codes: &[u8],
) -> EngineResult<()> {
    let obj = get_obj_mut(registry, handle).world_context("obj", handle.index)?;
    let id = obj.id;
    let commands = codes
        .iter()
        .map(|&code| movement_from_code(id, code))
        .collect::<Result<Vec<_>, _>>()?;
    obj.queue.extend(commands);
    Ok(())
}

pub fn pop_movement(obj: &mut ObjData) -> Result<MovementCommand, MovementError> {
    obj.queue
        .pop_front()
        .ok_or(MovementError::EmptyQueue { obj: obj.id })
}

/// Start executing `command`
pub fn begin_movement(obj: &mut ObjData, command: MovementCommand, walk_ticks: u32, run_ticks: u32) {
    let (direction, total) = match command {
        MovementCommand::Face(direction) => {
            obj.facing = direction;
            return;
        }
        MovementCommand::Walk(direction) => (direction, walk_ticks),
        MovementCommand::Run(direction) => (direction, run_ticks),
    };
    obj.facing = direction;
    obj.movement = MovementState::Moving {
        from: obj.pos.block,
        to: obj.pos.block + direction.delta(),
        elapsed: 0,
        total: total.max(1),
    };
}

/// Advance `obj` by one tick. Returns true when a step finished this tick.
pub fn advance_obj(obj: &mut ObjData, walk_ticks: u32, run_ticks: u32) -> EngineResult<bool> {
    if obj.movement == MovementState::Idle && !obj.queue.is_empty() {
        let command = pop_movement(obj)?;
        begin_movement(obj, command, walk_ticks, run_ticks);
    }

    if let MovementState::Moving {
        from,
        to,
        elapsed,
        total,
    } = obj.movement
    {
        let elapsed = elapsed + 1;
        if elapsed >= total {
            obj.pos.block = to;
            obj.movement = MovementState::Idle;
            return Ok(true);
        }
        obj.movement = MovementState::Moving {
            from,
            to,
            elapsed,
            total,
        };
    }
    Ok(false)
}

/// Advance every obj in registry order. Returns the objs that finished a
/// step this tick.
pub fn advance_objs(
    registry: &mut ObjRegistryData,
    walk_ticks: u32,
    run_ticks: u32,
) -> EngineResult<Vec<ObjHandle>> {
    let mut finished = Vec::new();
    for handle in obj_handles(registry) {
        if Some(handle) == registry.camera {
            continue;
        }
        if let Some(obj) = get_obj_mut(registry, handle) {
            if advance_obj(obj, walk_ticks, run_ticks)? {
                finished.push(handle);
            }
        }
    }
    Ok(finished)
}
