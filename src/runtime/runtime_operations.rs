//! Runtime Operations - DOP Functions
//!
//! A dedicated logic thread ticks the world at a fixed rate. Rendering
//! locks the same world once per frame and reads it through a `FrameView`.

use super::renderer_interface::WorldRenderer;
use super::runtime_data::{FrameView, LogicStats, LogicThreadData, SharedWorld, VisibleMapView};
use crate::error::{EngineError, EngineResult};
use crate::world::layout::{get_block, LayoutCell};
use crate::world::map::viewport_rect;
use crate::world::objs::{camera_pos, iter_objs};
use crate::world::{tick_world, WorldData};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use glam::IVec2;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub fn create_shared_world(world: WorldData) -> SharedWorld {
    Arc::new(Mutex::new(world))
}

/// Start ticking `world` every `tick_interval` on its own thread
pub fn start_logic_thread(world: SharedWorld, tick_interval: Duration) -> EngineResult<LogicThreadData> {
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
    let stats = Arc::new(Mutex::new(LogicStats {
        running: true,
        ..LogicStats::default()
    }));
    let worker_stats = Arc::clone(&stats);

    let worker_thread = thread::Builder::new()
        .name("tilestream-logic".to_string())
        .spawn(move || {
            logic_loop(world, tick_interval, shutdown_rx, worker_stats);
        })
        .map_err(|e| EngineError::ThreadError {
            thread: "tilestream-logic".to_string(),
            error: e.to_string(),
        })?;

    log::info!(
        "[runtime_operations::start_logic_thread] Logic thread started, interval {:?}",
        tick_interval
    );
    Ok(LogicThreadData {
        shutdown_tx,
        worker_thread: Some(worker_thread),
        stats,
        tick_interval,
    })
}

fn logic_loop(
    world: SharedWorld,
    tick_interval: Duration,
    shutdown_rx: Receiver<()>,
    stats: Arc<Mutex<LogicStats>>,
) {
    let mut next_tick = Instant::now() + tick_interval;
    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        match shutdown_rx.recv_timeout(wait) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let started = Instant::now();
        let result = {
            let mut world = world.lock();
            tick_world(&mut world)
        };
        let elapsed = started.elapsed();

        {
            let mut stats = stats.lock();
            stats.ticks += 1;
            stats.last_tick_duration = elapsed;
            stats.max_tick_duration = stats.max_tick_duration.max(elapsed);
            if elapsed > tick_interval {
                stats.overruns += 1;
            }
            if let Err(e) = &result {
                log::error!("[runtime_operations::logic_loop] Fatal tick error: {}", e);
                stats.last_error = Some(e.to_string());
            }
        }
        if result.is_err() {
            break;
        }

        next_tick += tick_interval;
        // Fell behind; resume from now instead of bursting
        let now = Instant::now();
        if next_tick < now {
            next_tick = now;
        }
    }

    stats.lock().running = false;
    log::info!("[runtime_operations::logic_loop] Logic thread stopped");
}

/// Signal the logic thread and wait for it. Returns the final stats.
pub fn stop_logic_thread(data: &mut LogicThreadData) -> EngineResult<LogicStats> {
    // The thread may already have stopped on an error and dropped its receiver
    let _ = data.shutdown_tx.try_send(());

    if let Some(handle) = data.worker_thread.take() {
        handle.join().map_err(|_| EngineError::ThreadError {
            thread: "tilestream-logic".to_string(),
            error: "logic thread panicked".to_string(),
        })?;
    }
    Ok(logic_stats(data))
}

pub fn logic_stats(data: &LogicThreadData) -> LogicStats {
    data.stats.lock().clone()
}

/// Snapshot of what the renderer needs this frame
pub fn build_frame_view(world: &WorldData) -> FrameView<'_> {
    let maps = world
        .reachable_maps
        .iter()
        .filter_map(|id| {
            let map = world.maps.maps.get(id)?;
            let visible = map.visible.as_ref()?;
            Some(VisibleMapView {
                id: *id,
                offset: map.block_offset,
                layout: &visible.layout,
            })
        })
        .collect();

    FrameView {
        tick: world.tick,
        camera: camera_pos(&world.objs),
        viewport: viewport_rect(world),
        maps,
        objs: iter_objs(&world.objs).map(|(_, obj)| obj).collect(),
        blocksets: &world.blocksets,
    }
}

/// Cell at `absolute` (current map block space). Outside every visible map
/// the current map's border fills in.
pub fn frame_block_at<'a>(frame: &FrameView<'a>, absolute: IVec2) -> Option<&'a LayoutCell> {
    let covering = frame.maps.iter().find(|view| {
        let local = absolute - view.offset;
        local.x >= 0 && local.y >= 0 && local.x < view.layout.size.x && local.y < view.layout.size.y
    });
    match covering {
        Some(view) => get_block(view.layout, absolute - view.offset),
        None => {
            let current = frame.maps.first()?;
            get_block(current.layout, absolute - current.offset)
        }
    }
}

/// Lock the world once and hand a frame to `renderer`
pub fn render_pass(world: &SharedWorld, renderer: &mut dyn WorldRenderer) -> EngineResult<()> {
    let world = world.lock();
    let frame = build_frame_view(&world);
    renderer.render_frame(&frame)
}
