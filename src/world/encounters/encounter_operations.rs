//! Encounter Operations - DOP Functions
//!
//! Tables are shared between maps and counted the same way blocksets are:
//! one reference per map whose current data names the table.

use super::encounter_data::{
    CachedEncounterTable, EncounterCacheData, EncounterEntry, EncounterMethod, EncounterSlot,
    EncounterTable, EncounterTableId, MapEncounters,
};
use crate::assets::{paths, AssetError, AssetReader, AssetSource, AssetWriter};
use crate::error::{EngineError, EngineResult, ErrorContext};

pub fn create_encounter_cache() -> EncounterCacheData {
    EncounterCacheData::default()
}

fn method_from_u8(value: u8) -> Option<EncounterMethod> {
    match value {
        0 => Some(EncounterMethod::Grass),
        1 => Some(EncounterMethod::Surf),
        2 => Some(EncounterMethod::Fishing),
        _ => None,
    }
}

/// Decode a map's encounter record
pub fn parse_map_encounters(path: &str, bytes: &[u8]) -> Result<MapEncounters, AssetError> {
    let mut reader = AssetReader::new(path, bytes);
    let count = reader.read_u8()?;
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let raw_method = reader.read_u8()?;
        let method =
            method_from_u8(raw_method).ok_or_else(|| reader.invalid("method", raw_method as u32))?;
        let rate = reader.read_u8()?;
        let table = EncounterTableId(reader.read_u16()?);
        entries.push(EncounterEntry {
            method,
            rate,
            table,
        });
    }
    Ok(MapEncounters { entries })
}

pub fn encode_map_encounters(encounters: &MapEncounters) -> Vec<u8> {
    let mut writer = AssetWriter::new();
    writer.write_u8(encounters.entries.len() as u8);
    for entry in &encounters.entries {
        writer
            .write_u8(entry.method as u8)
            .write_u8(entry.rate)
            .write_u16(entry.table.0);
    }
    writer.finish()
}

/// Decode an encounter table record
pub fn parse_encounter_table(path: &str, bytes: &[u8]) -> Result<EncounterTable, AssetError> {
    let mut reader = AssetReader::new(path, bytes);
    let count = reader.read_u8()?;
    let mut slots = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let species = reader.read_u16()?;
        let min_level = reader.read_u8()?;
        let max_level = reader.read_u8()?;
        if min_level > max_level {
            return Err(reader.invalid("min_level", min_level as u32));
        }
        let chance = reader.read_u8()?;
        slots.push(EncounterSlot {
            species,
            min_level,
            max_level,
            chance,
        });
    }
    Ok(EncounterTable { slots })
}

pub fn encode_encounter_table(table: &EncounterTable) -> Vec<u8> {
    let mut writer = AssetWriter::new();
    writer.write_u8(table.slots.len() as u8);
    for slot in &table.slots {
        writer
            .write_u16(slot.species)
            .write_u8(slot.min_level)
            .write_u8(slot.max_level)
            .write_u8(slot.chance);
    }
    writer.finish()
}

/// Shared table, loaded on a miss; adds one reference either way
pub fn load_or_get<'a>(
    cache: &'a mut EncounterCacheData,
    assets: &dyn AssetSource,
    id: EncounterTableId,
) -> EngineResult<&'a EncounterTable> {
    if !cache.tables.contains_key(&id) {
        let path = paths::encounter_table(id.0);
        let bytes = assets
            .load(&path)
            .with_context(|| format!("unknown encounter table {}", id.0))?;
        let table = parse_encounter_table(&path, &bytes)?;
        cache.tables.insert(
            id,
            CachedEncounterTable {
                table,
                ref_count: 0,
            },
        );
        cache.loads += 1;
    }

    let cached = cache
        .tables
        .get_mut(&id)
        .ok_or_else(|| EngineError::Internal {
            message: format!("encounter table {} vanished during load", id.0),
        })?;
    cached.ref_count += 1;
    Ok(&cached.table)
}

/// Drop one table reference; evicts at zero
pub fn deduct_reference(cache: &mut EncounterCacheData, id: EncounterTableId) -> EngineResult<()> {
    let cached = cache
        .tables
        .get_mut(&id)
        .filter(|t| t.ref_count > 0)
        .ok_or_else(|| EngineError::ReferenceUnderflow {
            resource: "encounter table".to_string(),
            id: id.0.to_string(),
        })?;
    cached.ref_count -= 1;
    if cached.ref_count == 0 {
        cache.tables.remove(&id);
        cache.evictions += 1;
    }
    Ok(())
}

/// Reference every table `encounters` names. On failure the references taken
/// so far are given back.
pub fn retain_tables(
    cache: &mut EncounterCacheData,
    assets: &dyn AssetSource,
    encounters: &MapEncounters,
) -> EngineResult<()> {
    for (i, entry) in encounters.entries.iter().enumerate() {
        let loaded = load_or_get(cache, assets, entry.table).map(|_| ());
        if let Err(e) = loaded {
            for taken in &encounters.entries[..i] {
                deduct_reference(cache, taken.table)?;
            }
            return Err(e);
        }
    }
    Ok(())
}

pub fn release_tables(cache: &mut EncounterCacheData, encounters: &MapEncounters) -> EngineResult<()> {
    for entry in &encounters.entries {
        deduct_reference(cache, entry.table)?;
    }
    Ok(())
}

pub fn get_table(cache: &EncounterCacheData, id: EncounterTableId) -> Option<&EncounterTable> {
    cache.tables.get(&id).map(|t| &t.table)
}

pub fn table_ref_count(cache: &EncounterCacheData, id: EncounterTableId) -> u32 {
    cache.tables.get(&id).map_or(0, |t| t.ref_count)
}

/// Entry for `method`, if the map has one
pub fn entry_for_method(encounters: &MapEncounters, method: EncounterMethod) -> Option<&EncounterEntry> {
    encounters.entries.iter().find(|e| e.method == method)
}
