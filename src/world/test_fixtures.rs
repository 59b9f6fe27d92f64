//! Small four-map world shared by the world tests
//!
//! ```text
//!  +------+
//!  | TOWN |  6x6, blockset 1
//!  +------+-----+
//!  |ROUTE |       6x10, blocksets 1 + 2, connects back north to TOWN
//!  |      |FIELD| 4x4 at east offset 2, blockset 2
//!  +------+-----+
//!  HOUSE: 4x4, blockset 3, reached by warp from TOWN (2, 2)
//! ```

use crate::assets::{paths, MemoryAssetSource};
use crate::world::blockset::encode_blockset_asset;
use crate::world::blockset::BlocksetAsset;
use crate::world::core::{BlockKey, CompassDirection, FacingDirection, FlagId, MapId, ObjId, WorldPos};
use crate::world::data_types::WorldData;
use crate::world::encounters::{
    encode_encounter_table, encode_map_encounters, EncounterEntry, EncounterMethod, EncounterSlot,
    EncounterTable, EncounterTableId, MapEncounters,
};
use crate::world::layout::{encode_layout_asset, make_cell_flags, LayoutAsset, LayoutCell};
use crate::world::map::{
    encode_map_asset, encode_map_details, encode_map_events, MapAsset, MapConnection, MapDetails,
    MapEvents, MapKind, ObjEvent, ScriptTrigger, Warp, Weather,
};
use crate::world::world_operations::create_world;
use crate::EngineConfig;
use glam::IVec2;

pub const TOWN: MapId = MapId(1);
pub const ROUTE: MapId = MapId(2);
pub const FIELD: MapId = MapId(3);
pub const HOUSE: MapId = MapId(4);

/// Flag gating the item ball in town
pub const ITEM_FLAG: FlagId = FlagId(5);
pub const ITEM_OBJ: ObjId = ObjId(2);
pub const TOWN_WARP: IVec2 = IVec2::new(2, 2);
pub const ROUTE_SIGN: IVec2 = IVec2::new(3, 1);

pub fn fixture_config() -> EngineConfig {
    EngineConfig {
        walk_step_ticks: 1,
        run_step_ticks: 1,
        warp_delay_ticks: 2,
        ..EngineConfig::default()
    }
}

fn layout(width: u16, height: u16, pick: impl Fn(i32, i32) -> BlockKey) -> LayoutAsset {
    let mut cells = Vec::new();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            cells.push(LayoutCell {
                flags: make_cell_flags(0, false),
                block: pick(x, y),
            });
        }
    }
    let border_block = pick(0, 0);
    LayoutAsset {
        width,
        height,
        cells,
        border_width: 2,
        border_height: 2,
        border: vec![
            LayoutCell {
                flags: make_cell_flags(0, true),
                block: border_block,
            };
            4
        ],
    }
}

fn blockset(name: &str, blocks: usize) -> BlocksetAsset {
    BlocksetAsset {
        name: name.to_string(),
        tiles_per_block: 4,
        blocks: (0..blocks)
            .map(|b| (0..4).map(|t| (b * 4 + t) as u16).collect())
            .collect(),
    }
}

fn con(direction: CompassDirection, map: MapId, offset: i32) -> MapConnection {
    MapConnection {
        direction,
        map,
        offset,
    }
}

fn details(name: &str, kind: MapKind) -> MapDetails {
    MapDetails {
        name: name.to_string(),
        music: 1,
        weather: Weather::None,
        kind,
        allow_running: kind != MapKind::Indoors,
        show_name_popup: true,
    }
}

fn grass(table: u16) -> EncounterEntry {
    EncounterEntry {
        method: EncounterMethod::Grass,
        rate: 20,
        table: EncounterTableId(table),
    }
}

fn obj_event(id: ObjId, sprite: &str, x: i32, y: i32, flag: Option<FlagId>) -> ObjEvent {
    ObjEvent {
        id,
        sprite: sprite.to_string(),
        position: IVec2::new(x, y),
        elevation: 0,
        facing: FacingDirection::South,
        movement_type: 0,
        flag,
        script: None,
    }
}

fn add_map(
    source: &mut MemoryAssetSource,
    id: MapId,
    map: MapAsset,
    layout: LayoutAsset,
    events: MapEvents,
    details: MapDetails,
    encounters: MapEncounters,
) {
    source.insert(paths::map(id.0), encode_map_asset(&map));
    source.insert(paths::layout(id.0), encode_layout_asset(&layout));
    source.insert(paths::events(id.0), encode_map_events(&events));
    source.insert(paths::details(id.0), encode_map_details(&details));
    source.insert(paths::encounters(id.0), encode_map_encounters(&encounters));
}

pub fn fixture_source() -> MemoryAssetSource {
    let mut source = MemoryAssetSource::new();

    source.insert(paths::blockset(1), encode_blockset_asset(&blockset("town", 4)));
    source.insert(paths::blockset(2), encode_blockset_asset(&blockset("field", 2)));
    source.insert(paths::blockset(3), encode_blockset_asset(&blockset("house", 2)));

    let table = |species: u16| EncounterTable {
        slots: vec![EncounterSlot {
            species,
            min_level: 2,
            max_level: 5,
            chance: 100,
        }],
    };
    source.insert(paths::encounter_table(1), encode_encounter_table(&table(16)));
    source.insert(paths::encounter_table(2), encode_encounter_table(&table(129)));

    add_map(
        &mut source,
        TOWN,
        MapAsset {
            width: 6,
            height: 6,
            connections: vec![con(CompassDirection::South, ROUTE, 0)],
        },
        layout(6, 6, |x, y| BlockKey::new(1, ((x + y) % 4) as u16)),
        MapEvents {
            warps: vec![Warp {
                position: TOWN_WARP,
                elevation: 0,
                dest: WorldPos::new(HOUSE, 1, 2, 0),
            }],
            objs: vec![
                obj_event(ObjId(1), "lass", 1, 1, None),
                obj_event(ITEM_OBJ, "item_ball", 4, 4, Some(ITEM_FLAG)),
            ],
            triggers: Vec::new(),
        },
        details("Pallet", MapKind::Town),
        MapEncounters::default(),
    );

    add_map(
        &mut source,
        ROUTE,
        MapAsset {
            width: 6,
            height: 10,
            connections: vec![
                con(CompassDirection::North, TOWN, 0),
                con(CompassDirection::East, FIELD, 2),
            ],
        },
        layout(6, 10, |x, y| {
            if y >= 5 {
                BlockKey::new(2, (x % 2) as u16)
            } else {
                BlockKey::new(1, 0)
            }
        }),
        MapEvents {
            warps: Vec::new(),
            objs: vec![obj_event(ObjId(3), "youngster", 2, 5, None)],
            triggers: vec![ScriptTrigger {
                position: ROUTE_SIGN,
                elevation: 0,
                script: "route_sign".to_string(),
            }],
        },
        details("Route 1", MapKind::Route),
        MapEncounters {
            entries: vec![grass(1)],
        },
    );

    add_map(
        &mut source,
        FIELD,
        MapAsset {
            width: 4,
            height: 4,
            connections: vec![con(CompassDirection::West, ROUTE, -2)],
        },
        layout(4, 4, |_, _| BlockKey::new(2, 1)),
        MapEvents::default(),
        details("Tall Grass", MapKind::Route),
        MapEncounters {
            entries: vec![
                grass(1),
                EncounterEntry {
                    method: EncounterMethod::Fishing,
                    rate: 10,
                    table: EncounterTableId(2),
                },
            ],
        },
    );

    add_map(
        &mut source,
        HOUSE,
        MapAsset {
            width: 4,
            height: 4,
            connections: Vec::new(),
        },
        layout(4, 4, |x, _| BlockKey::new(3, (x % 2) as u16)),
        MapEvents {
            warps: vec![Warp {
                position: IVec2::new(1, 3),
                elevation: 0,
                dest: WorldPos::new(TOWN, 2, 3, 0),
            }],
            objs: vec![obj_event(ObjId(1), "mom", 2, 1, None)],
            triggers: Vec::new(),
        },
        details("Player's House", MapKind::Indoors),
        MapEncounters::default(),
    );

    source
}

pub fn fixture_world() -> WorldData {
    create_world(fixture_config(), Box::new(fixture_source()))
}
