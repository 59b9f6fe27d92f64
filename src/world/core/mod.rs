//! Core world data types and fundamental structures
//!
//! Identifiers, directions and positions shared by every world subsystem.

mod block;
mod direction;
mod ids;
mod position;

pub use block::{BlockIndex, BlockKey, BlocksetId, LayoutId, TextureHandle};
pub use direction::{CompassDirection, FacingDirection};
pub use ids::{FlagId, MapId, ObjId};
pub use position::WorldPos;
