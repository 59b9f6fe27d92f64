//! Runtime Data - Pure DOP
//!
//! NO METHODS. Just data.
//! Thread control lives in runtime_operations.rs

use crate::world::blockset::BlocksetCacheData;
use crate::world::core::{MapId, WorldPos};
use crate::world::layout::MapLayoutData;
use crate::world::objs::ObjData;
use crate::world::WorldData;
use crossbeam_channel::Sender;
use glam::IVec2;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// The world behind the one coarse lock the logic and render loops share
pub type SharedWorld = Arc<Mutex<WorldData>>;

#[derive(Debug, Clone, Default)]
pub struct LogicStats {
    pub ticks: u64,
    /// Ticks that took longer than the tick interval
    pub overruns: u64,
    pub last_tick_duration: Duration,
    pub max_tick_duration: Duration,
    /// Error that stopped the thread, if any
    pub last_error: Option<String>,
    pub running: bool,
}

/// Handle to a running logic thread
#[derive(Debug)]
pub struct LogicThreadData {
    pub shutdown_tx: Sender<()>,
    pub worker_thread: Option<JoinHandle<()>>,
    pub stats: Arc<Mutex<LogicStats>>,
    pub tick_interval: Duration,
}

/// One visible map as the renderer sees it
#[derive(Debug, Clone, Copy)]
pub struct VisibleMapView<'a> {
    pub id: MapId,
    /// Block offset from the current map
    pub offset: IVec2,
    pub layout: &'a MapLayoutData,
}

/// Read-only snapshot handed to the renderer for one frame
#[derive(Debug)]
pub struct FrameView<'a> {
    pub tick: u64,
    pub camera: Option<WorldPos>,
    /// Viewport origin and size in the current map's block space
    pub viewport: Option<(IVec2, IVec2)>,
    /// Current map first
    pub maps: Vec<VisibleMapView<'a>>,
    /// Registry order
    pub objs: Vec<&'a ObjData>,
    pub blocksets: &'a BlocksetCacheData,
}
