// Tilestream Engine - Data-Oriented Programming (DOP) Architecture
//
// Map streaming, shared block caching and obj lifecycle for a 2D tile world.
// - Data lives in *_data.rs structs with no methods
// - *_operations modules transform it with free functions
// - WorldData is the single context every operation works on
//
// For new code, prefer:
// - world::world_operations for init / tick / teardown
// - world::map for map lifecycle
// - runtime for the logic thread and render pass

// Constants module
pub mod constants;

// Core engine modules
pub mod assets;
pub mod error;
pub mod runtime;
pub mod world;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use assets::{AssetError, AssetSource, DirectoryAssetSource, MemoryAssetSource};
pub use error::{EngineError, EngineResult, ErrorContext, OptionExt};
pub use runtime::{
    render_pass, start_logic_thread, stop_logic_thread, FrameView, LogicStats, LogicThreadData,
    SharedWorld, WorldRenderer,
};
pub use world::{
    create_world, init_world_at, teardown_world, tick_world, MapId, ObjId, TickReport, WorldData,
    WorldPos,
};

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Logic ticks per second
    pub tick_rate_hz: u32,
    pub render_interval_ms: u64,
    /// Viewport size in blocks
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub walk_step_ticks: u32,
    pub run_step_ticks: u32,
    pub warp_delay_ticks: u32,
    /// Initial flag store size; the store grows past it on demand
    pub flag_capacity: usize,
    /// Root directory for `DirectoryAssetSource`
    pub asset_root: PathBuf,
}

impl EngineConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)
            .map_err(|e| anyhow::anyhow!("EngineConfig: invalid TOML: {}", e))?;
        Ok(config)
    }

    /// Read, parse and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("EngineConfig: cannot read {}: {}", path.display(), e))?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        log::info!("[EngineConfig::load] Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        use crate::constants::limits;

        // Validate timing
        if self.tick_rate_hz == 0 {
            return Err(anyhow::anyhow!("EngineConfig: tick_rate_hz cannot be 0"));
        }
        if self.tick_rate_hz > limits::MAX_TICK_RATE_HZ {
            return Err(anyhow::anyhow!(
                "EngineConfig: tick_rate_hz {} exceeds maximum of {}. {}",
                self.tick_rate_hz,
                limits::MAX_TICK_RATE_HZ,
                self.suggest_safe_config()
            ));
        }
        if self.render_interval_ms == 0 {
            return Err(anyhow::anyhow!("EngineConfig: render_interval_ms cannot be 0"));
        }

        // Validate viewport
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(anyhow::anyhow!(
                "EngineConfig: viewport dimensions cannot be 0 ({}x{})",
                self.viewport_width,
                self.viewport_height
            ));
        }
        if self.viewport_width > limits::MAX_VIEWPORT_BLOCKS
            || self.viewport_height > limits::MAX_VIEWPORT_BLOCKS
        {
            return Err(anyhow::anyhow!(
                "EngineConfig: viewport {}x{} too large (max {}x{}). {}",
                self.viewport_width,
                self.viewport_height,
                limits::MAX_VIEWPORT_BLOCKS,
                limits::MAX_VIEWPORT_BLOCKS,
                self.suggest_safe_config()
            ));
        }

        // Validate movement
        for (name, ticks) in [
            ("walk_step_ticks", self.walk_step_ticks),
            ("run_step_ticks", self.run_step_ticks),
        ] {
            if ticks == 0 {
                return Err(anyhow::anyhow!("EngineConfig: {} cannot be 0", name));
            }
            if ticks > limits::MAX_STEP_TICKS {
                return Err(anyhow::anyhow!(
                    "EngineConfig: {} {} exceeds maximum of {}",
                    name,
                    ticks,
                    limits::MAX_STEP_TICKS
                ));
            }
        }
        if self.run_step_ticks > self.walk_step_ticks {
            return Err(anyhow::anyhow!(
                "EngineConfig: run_step_ticks {} is slower than walk_step_ticks {}",
                self.run_step_ticks,
                self.walk_step_ticks
            ));
        }
        if self.warp_delay_ticks > limits::MAX_WARP_DELAY_TICKS {
            return Err(anyhow::anyhow!(
                "EngineConfig: warp_delay_ticks {} exceeds maximum of {}",
                self.warp_delay_ticks,
                limits::MAX_WARP_DELAY_TICKS
            ));
        }

        // Validate flags
        if self.flag_capacity > limits::MAX_FLAGS {
            return Err(anyhow::anyhow!(
                "EngineConfig: flag_capacity {} exceeds the {} addressable flags",
                self.flag_capacity,
                limits::MAX_FLAGS
            ));
        }

        log::info!(
            "[EngineConfig] Validation: tick_rate={}Hz, viewport={}x{}, walk={} run={} ticks",
            self.tick_rate_hz,
            self.viewport_width,
            self.viewport_height,
            self.walk_step_ticks,
            self.run_step_ticks
        );
        Ok(())
    }

    /// Time between logic ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.tick_rate_hz.max(1) as u64)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }

    /// Suggest safe configuration parameters
    pub fn suggest_safe_config(&self) -> String {
        use crate::constants::{timing, viewport};

        let mut suggestions = Vec::new();
        suggestions.push("Common safe configurations:".to_string());
        suggestions.push(format!(
            "  - tick_rate_hz={}, viewport={}x{} (handheld screen)",
            timing::TICK_RATE_HZ,
            viewport::WIDTH,
            viewport::HEIGHT
        ));
        suggestions.push(format!(
            "  - tick_rate_hz={}, viewport=32x18 (widescreen)",
            timing::TICK_RATE_HZ
        ));
        suggestions.push(format!(
            "  - walk_step_ticks={}, run_step_ticks={}",
            timing::WALK_STEP_TICKS,
            timing::RUN_STEP_TICKS
        ));

        suggestions.join("\n")
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        use crate::constants::{timing, viewport};

        Self {
            tick_rate_hz: timing::TICK_RATE_HZ,
            render_interval_ms: timing::RENDER_INTERVAL_MS,
            viewport_width: viewport::WIDTH,
            viewport_height: viewport::HEIGHT,
            walk_step_ticks: timing::WALK_STEP_TICKS,
            run_step_ticks: timing::RUN_STEP_TICKS,
            warp_delay_ticks: timing::WARP_DELAY_TICKS,
            flag_capacity: constants::DEFAULT_FLAG_CAPACITY,
            asset_root: PathBuf::from(constants::DEFAULT_ASSET_ROOT),
        }
    }
}
