//! Streaming World Module
//!
//! Map streaming, shared block caching and obj lifecycle for a tile world.
//!
//! # Architecture Overview
//!
//! - **Core**: Ids, positions, directions, block keys
//! - **Blockset**: Reference-counted blockset and block cache
//! - **Layout**: Per-map block grid with border fill
//! - **Encounters**: Reference-counted encounter table cache
//! - **Map**: Registry, lifecycle, connection offsets, visibility
//! - **Objs**: Ordered obj arena and scripted movement
//!
//! # Design Principles
//!
//! 1. **One context**: `WorldData` owns every cache; no globals
//! 2. **DOP architecture**: `*_data.rs` holds data, `*_operations.rs` transforms it
//! 3. **Counted lifetimes**: everything shared is released on its last deref

pub mod blockset;
pub mod core;
pub mod data_types;
pub mod encounters;
pub mod error;
pub mod flags;
pub mod layout;
pub mod map;
pub mod objs;
pub mod warp_operations;
pub mod world_operations;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export core types for convenience
pub use core::{
    BlockIndex, BlockKey, BlocksetId, CompassDirection, FacingDirection, FlagId, LayoutId, MapId,
    ObjId, TextureHandle, WorldPos,
};

pub use data_types::{PendingWarp, TickReport, WorldData};
pub use error::{MovementError, WorldErrorContext, WorldResult};
pub use flags::{clear_flag, create_flag_store, get_flag, set_flag, FlagStore};
pub use objs::{MovementCommand, ObjData, ObjHandle, ObjKind};
pub use warp_operations::{cancel_warp, perform_warp, queue_warp};
pub use world_operations::{
    block_at, create_world, init_world_at, player_handle, take_pending_scripts, teardown_world,
    tick_world,
};
