//! Map record codecs
//!
//! The map record starts with the block-grid size so the registry can read
//! the header without decoding connections.

use super::map_data::{
    MapAsset, MapConnection, MapDetails, MapEvents, MapKind, ObjEvent, ScriptTrigger, Warp,
    Weather,
};
use crate::assets::{AssetError, AssetReader, AssetWriter};
use crate::world::core::{CompassDirection, FacingDirection, FlagId, MapId, ObjId, WorldPos};
use glam::IVec2;

const DETAILS_ALLOW_RUNNING: u8 = 0x01;
const DETAILS_SHOW_NAME_POPUP: u8 = 0x02;

/// Width and height only
pub fn parse_map_header(path: &str, bytes: &[u8]) -> Result<IVec2, AssetError> {
    let mut reader = AssetReader::new(path, bytes);
    let width = reader.read_u16()?;
    let height = reader.read_u16()?;
    if width == 0 {
        return Err(reader.invalid("width", 0));
    }
    if height == 0 {
        return Err(reader.invalid("height", 0));
    }
    Ok(IVec2::new(width as i32, height as i32))
}

pub fn parse_map_asset(path: &str, bytes: &[u8]) -> Result<MapAsset, AssetError> {
    let size = parse_map_header(path, bytes)?;
    let mut reader = AssetReader::new(path, bytes);
    reader.read_u16()?;
    reader.read_u16()?;

    let count = reader.read_u8()?;
    let mut connections = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let raw_direction = reader.read_u8()?;
        let direction = CompassDirection::from_u8(raw_direction)
            .ok_or_else(|| reader.invalid("direction", raw_direction as u32))?;
        let map = MapId(reader.read_u16()?);
        let offset = reader.read_i16()? as i32;
        connections.push(MapConnection {
            direction,
            map,
            offset,
        });
    }

    Ok(MapAsset {
        width: size.x as u16,
        height: size.y as u16,
        connections,
    })
}

pub fn encode_map_asset(asset: &MapAsset) -> Vec<u8> {
    let mut writer = AssetWriter::new();
    writer
        .write_u16(asset.width)
        .write_u16(asset.height)
        .write_u8(asset.connections.len() as u8);
    for con in &asset.connections {
        writer
            .write_u8(con.direction as u8)
            .write_u16(con.map.0)
            .write_i16(con.offset as i16);
    }
    writer.finish()
}

fn read_position(reader: &mut AssetReader<'_>) -> Result<IVec2, AssetError> {
    let x = reader.read_u16()? as i32;
    let y = reader.read_u16()? as i32;
    Ok(IVec2::new(x, y))
}

fn optional_string(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn parse_map_events(path: &str, bytes: &[u8]) -> Result<MapEvents, AssetError> {
    let mut reader = AssetReader::new(path, bytes);

    let warp_count = reader.read_u8()?;
    let mut warps = Vec::with_capacity(warp_count as usize);
    for _ in 0..warp_count {
        let position = read_position(&mut reader)?;
        let elevation = reader.read_u8()?;
        let dest_map = MapId(reader.read_u16()?);
        let dest_block = read_position(&mut reader)?;
        let dest_elevation = reader.read_u8()?;
        warps.push(Warp {
            position,
            elevation,
            dest: WorldPos {
                map: dest_map,
                block: dest_block,
                elevation: dest_elevation,
            },
        });
    }

    let obj_count = reader.read_u8()?;
    let mut objs = Vec::with_capacity(obj_count as usize);
    for _ in 0..obj_count {
        let id = ObjId(reader.read_u16()?);
        if id == ObjId::CAMERA || id == ObjId::PLAYER {
            return Err(reader.invalid("obj_id", id.0 as u32));
        }
        let sprite = reader.read_cstring()?;
        let position = read_position(&mut reader)?;
        let elevation = reader.read_u8()?;
        let raw_facing = reader.read_u8()?;
        let facing = FacingDirection::from_u8(raw_facing)
            .ok_or_else(|| reader.invalid("facing", raw_facing as u32))?;
        let movement_type = reader.read_u8()?;
        let flag = FlagId::from_raw(reader.read_u16()?);
        let script = optional_string(reader.read_cstring()?);
        objs.push(ObjEvent {
            id,
            sprite,
            position,
            elevation,
            facing,
            movement_type,
            flag,
            script,
        });
    }

    let trigger_count = reader.read_u8()?;
    let mut triggers = Vec::with_capacity(trigger_count as usize);
    for _ in 0..trigger_count {
        let position = read_position(&mut reader)?;
        let elevation = reader.read_u8()?;
        let script = reader.read_cstring()?;
        triggers.push(ScriptTrigger {
            position,
            elevation,
            script,
        });
    }

    Ok(MapEvents {
        warps,
        objs,
        triggers,
    })
}

pub fn encode_map_events(events: &MapEvents) -> Vec<u8> {
    let mut writer = AssetWriter::new();

    writer.write_u8(events.warps.len() as u8);
    for warp in &events.warps {
        writer
            .write_u16(warp.position.x as u16)
            .write_u16(warp.position.y as u16)
            .write_u8(warp.elevation)
            .write_u16(warp.dest.map.0)
            .write_u16(warp.dest.block.x as u16)
            .write_u16(warp.dest.block.y as u16)
            .write_u8(warp.dest.elevation);
    }

    writer.write_u8(events.objs.len() as u8);
    for obj in &events.objs {
        writer
            .write_u16(obj.id.0)
            .write_cstring(&obj.sprite)
            .write_u16(obj.position.x as u16)
            .write_u16(obj.position.y as u16)
            .write_u8(obj.elevation)
            .write_u8(obj.facing as u8)
            .write_u8(obj.movement_type)
            .write_u16(obj.flag.map_or(FlagId::NONE_RAW, |f| f.0))
            .write_cstring(obj.script.as_deref().unwrap_or(""));
    }

    writer.write_u8(events.triggers.len() as u8);
    for trigger in &events.triggers {
        writer
            .write_u16(trigger.position.x as u16)
            .write_u16(trigger.position.y as u16)
            .write_u8(trigger.elevation)
            .write_cstring(&trigger.script);
    }

    writer.finish()
}

fn weather_from_u8(value: u8) -> Option<Weather> {
    match value {
        0 => Some(Weather::None),
        1 => Some(Weather::Rain),
        2 => Some(Weather::Snow),
        3 => Some(Weather::Sandstorm),
        4 => Some(Weather::Fog),
        _ => None,
    }
}

fn kind_from_u8(value: u8) -> Option<MapKind> {
    match value {
        0 => Some(MapKind::Town),
        1 => Some(MapKind::City),
        2 => Some(MapKind::Route),
        3 => Some(MapKind::Cave),
        4 => Some(MapKind::Indoors),
        _ => None,
    }
}

pub fn parse_map_details(path: &str, bytes: &[u8]) -> Result<MapDetails, AssetError> {
    let mut reader = AssetReader::new(path, bytes);
    let name = reader.read_cstring()?;
    let music = reader.read_u16()?;
    let raw_weather = reader.read_u8()?;
    let weather =
        weather_from_u8(raw_weather).ok_or_else(|| reader.invalid("weather", raw_weather as u32))?;
    let raw_kind = reader.read_u8()?;
    let kind = kind_from_u8(raw_kind).ok_or_else(|| reader.invalid("kind", raw_kind as u32))?;
    let flags = reader.read_u8()?;
    Ok(MapDetails {
        name,
        music,
        weather,
        kind,
        allow_running: flags & DETAILS_ALLOW_RUNNING != 0,
        show_name_popup: flags & DETAILS_SHOW_NAME_POPUP != 0,
    })
}

pub fn encode_map_details(details: &MapDetails) -> Vec<u8> {
    let mut flags = 0u8;
    if details.allow_running {
        flags |= DETAILS_ALLOW_RUNNING;
    }
    if details.show_name_popup {
        flags |= DETAILS_SHOW_NAME_POPUP;
    }
    let mut writer = AssetWriter::new();
    writer
        .write_cstring(&details.name)
        .write_u16(details.music)
        .write_u8(details.weather as u8)
        .write_u8(details.kind as u8)
        .write_u8(flags);
    writer.finish()
}
