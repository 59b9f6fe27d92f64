//! Fixed-rate logic thread and render pass over one shared world
//!
//! - runtime_data.rs: shared world type, thread handle, frame view
//! - runtime_operations.rs: start / stop / render functions
//! - renderer_interface.rs: the renderer collaborator

pub mod renderer_interface;
pub mod runtime_data;
pub mod runtime_operations;

pub use renderer_interface::WorldRenderer;
pub use runtime_data::{FrameView, LogicStats, LogicThreadData, SharedWorld, VisibleMapView};
pub use runtime_operations::{
    build_frame_view, create_shared_world, frame_block_at, logic_stats, render_pass,
    start_logic_thread, stop_logic_thread,
};
