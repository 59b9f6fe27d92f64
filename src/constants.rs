//! Engine-wide constants
//!
//! Defaults feed `EngineConfig::default()`; limits bound what
//! `EngineConfig::validate()` accepts.

/// Timing defaults
pub mod timing {
    /// Logic ticks per second
    pub const TICK_RATE_HZ: u32 = 60;
    pub const RENDER_INTERVAL_MS: u64 = 16;
    /// Ticks a walking step takes
    pub const WALK_STEP_TICKS: u32 = 16;
    /// Ticks a running step takes
    pub const RUN_STEP_TICKS: u32 = 8;
    /// Ticks between stepping on a warp and arriving
    pub const WARP_DELAY_TICKS: u32 = 30;
}

/// Viewport defaults, in blocks
pub mod viewport {
    pub const WIDTH: u32 = 15;
    pub const HEIGHT: u32 = 10;
}

/// Validation limits
pub mod limits {
    pub const MAX_TICK_RATE_HZ: u32 = 1000;
    pub const MAX_VIEWPORT_BLOCKS: u32 = 256;
    pub const MAX_STEP_TICKS: u32 = 600;
    pub const MAX_WARP_DELAY_TICKS: u32 = 3600;
    /// Flag ids are u16
    pub const MAX_FLAGS: usize = 1 << 16;
    /// Visibility passes before the map set is declared unstable
    pub const MAX_VISIBILITY_PASSES: usize = 16;
}

/// Flag store default
pub const DEFAULT_FLAG_CAPACITY: usize = 2048;

/// Default asset directory
pub const DEFAULT_ASSET_ROOT: &str = "assets";
