//! Walk the player out of a town and down a route while the logic thread
//! streams maps in and out. Renders the viewport as text.
//!
//! Run with `RUST_LOG=info cargo run --example walk_demo`

use anyhow::Result;
use glam::IVec2;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tilestream_engine::assets::{paths, MemoryAssetSource};
use tilestream_engine::runtime::{create_shared_world, frame_block_at, logic_stats};
use tilestream_engine::world::blockset::{encode_blockset_asset, BlocksetAsset};
use tilestream_engine::world::encounters::{encode_map_encounters, MapEncounters};
use tilestream_engine::world::layout::{
    cell_is_blocked, encode_layout_asset, make_cell_flags, LayoutAsset, LayoutCell,
};
use tilestream_engine::world::map::{
    encode_map_asset, encode_map_details, encode_map_events, MapAsset, MapConnection, MapDetails,
    MapEvents, MapKind, Weather,
};
use tilestream_engine::world::objs::{get_obj, queue_movement_codes, MovementState};
use tilestream_engine::world::{player_handle, BlockKey, CompassDirection, ObjKind};
use tilestream_engine::{
    create_world, init_world_at, render_pass, start_logic_thread, stop_logic_thread,
    teardown_world, EngineConfig, EngineResult, FrameView, MapId, WorldPos, WorldRenderer,
};

const TOWN: MapId = MapId(1);
const ROUTE: MapId = MapId(2);
const WALK_SOUTH: u8 = 8;

struct TextRenderer {
    last_tick: Option<u64>,
}

impl WorldRenderer for TextRenderer {
    fn render_frame(&mut self, frame: &FrameView<'_>) -> EngineResult<()> {
        if self.last_tick == Some(frame.tick) {
            return Ok(());
        }
        self.last_tick = Some(frame.tick);
        let Some((origin, size)) = frame.viewport else {
            return Ok(());
        };

        let mut rows = Vec::new();
        for y in 0..size.y {
            let mut row = String::new();
            for x in 0..size.x {
                let absolute = origin + IVec2::new(x, y);
                let glyph = match frame_block_at(frame, absolute) {
                    Some(cell) if cell_is_blocked(cell) => '#',
                    Some(cell) if cell.block.blockset.0 == 2 => '"',
                    Some(_) => '.',
                    None => ' ',
                };
                row.push(glyph);
            }
            rows.push(row);
        }

        for obj in &frame.objs {
            let Some(view) = frame.maps.iter().find(|m| m.id == obj.pos.map) else {
                continue;
            };
            let at = obj.pos.block + view.offset - origin;
            if at.x < 0 || at.y < 0 || at.x >= size.x || at.y >= size.y {
                continue;
            }
            let glyph = match obj.kind {
                ObjKind::Camera => continue,
                ObjKind::Player => '@',
                ObjKind::Event { .. } => 'o',
            };
            let row = &mut rows[at.y as usize];
            row.replace_range(at.x as usize..at.x as usize + 1, &glyph.to_string());
        }

        let maps: Vec<String> = frame.maps.iter().map(|m| m.id.to_string()).collect();
        println!("tick {} | visible: {}", frame.tick, maps.join(", "));
        for row in rows {
            println!("  {}", row);
        }
        Ok(())
    }
}

fn layout(width: u16, height: u16, blockset: u16) -> LayoutAsset {
    let cell = |blocked: bool| LayoutCell {
        flags: make_cell_flags(0, blocked),
        block: BlockKey::new(blockset, 0),
    };
    LayoutAsset {
        width,
        height,
        cells: vec![cell(false); width as usize * height as usize],
        border_width: 2,
        border_height: 2,
        border: vec![cell(true); 4],
    }
}

fn add_map(source: &mut MemoryAssetSource, id: MapId, map: MapAsset, blockset: u16, name: &str) {
    let details = MapDetails {
        name: name.to_string(),
        music: 0,
        weather: Weather::None,
        kind: MapKind::Route,
        allow_running: true,
        show_name_popup: true,
    };
    let layout = layout(map.width, map.height, blockset);
    source.insert(paths::layout(id.0), encode_layout_asset(&layout));
    source.insert(paths::map(id.0), encode_map_asset(&map));
    source.insert(paths::events(id.0), encode_map_events(&MapEvents::default()));
    source.insert(paths::details(id.0), encode_map_details(&details));
    source.insert(paths::encounters(id.0), encode_map_encounters(&MapEncounters::default()));
}

fn demo_assets() -> MemoryAssetSource {
    let mut source = MemoryAssetSource::new();
    for (id, name) in [(1, "town"), (2, "grass")] {
        let blockset = BlocksetAsset {
            name: name.to_string(),
            tiles_per_block: 4,
            blocks: vec![vec![0, 1, 2, 3]],
        };
        source.insert(paths::blockset(id), encode_blockset_asset(&blockset));
    }

    add_map(
        &mut source,
        TOWN,
        MapAsset {
            width: 10,
            height: 8,
            connections: vec![MapConnection {
                direction: CompassDirection::South,
                map: ROUTE,
                offset: 2,
            }],
        },
        1,
        "Town",
    );
    add_map(
        &mut source,
        ROUTE,
        MapAsset {
            width: 6,
            height: 24,
            connections: vec![MapConnection {
                direction: CompassDirection::North,
                map: TOWN,
                offset: -2,
            }],
        },
        2,
        "Route",
    );
    source
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig {
        tick_rate_hz: 30,
        walk_step_ticks: 4,
        ..EngineConfig::default()
    };
    config.validate()?;
    let tick_interval = config.tick_interval();
    let render_interval = config.render_interval();

    let mut world = create_world(config, Box::new(demo_assets()));
    let player = init_world_at(&mut world, WorldPos::new(TOWN, 4, 2, 0))?;
    queue_movement_codes(&mut world.objs, player, &[WALK_SOUTH; 20])?;

    let shared = create_shared_world(world);
    let mut logic = start_logic_thread(Arc::clone(&shared), tick_interval)?;
    let mut renderer = TextRenderer { last_tick: None };

    loop {
        render_pass(&shared, &mut renderer)?;
        let idle = {
            let world = shared.lock();
            player_handle(&world)
                .and_then(|handle| get_obj(&world.objs, handle))
                .map_or(true, |obj| obj.queue.is_empty() && obj.movement == MovementState::Idle)
        };
        if idle || !logic_stats(&logic).running {
            break;
        }
        thread::sleep(render_interval.max(Duration::from_millis(100)));
    }

    let stats = stop_logic_thread(&mut logic)?;
    println!(
        "logic ran {} ticks ({} overruns, worst {:?})",
        stats.ticks, stats.overruns, stats.max_tick_duration
    );
    if let Some(error) = stats.last_error {
        anyhow::bail!("logic thread failed: {}", error);
    }

    let mut world = shared.lock();
    println!("maps loaded before teardown: {}", world.maps.maps.len());
    teardown_world(&mut world)?;
    Ok(())
}
