//! Encounter Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in encounter_operations.rs

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Encounter table identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EncounterTableId(pub u16);

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterMethod {
    Grass = 0,
    Surf = 1,
    Fishing = 2,
}

/// One wild encounter slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterSlot {
    pub species: u16,
    pub min_level: u8,
    pub max_level: u8,
    pub chance: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncounterTable {
    pub slots: Vec<EncounterSlot>,
}

/// Encounter method of a map and the table it rolls from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterEntry {
    pub method: EncounterMethod,
    pub rate: u8,
    pub table: EncounterTableId,
}

/// A map's encounter record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapEncounters {
    pub entries: Vec<EncounterEntry>,
}

#[derive(Debug, Clone)]
pub struct CachedEncounterTable {
    pub table: EncounterTable,
    pub ref_count: u32,
}

/// Reference-counted encounter table cache
#[derive(Debug, Default)]
pub struct EncounterCacheData {
    pub tables: FxHashMap<EncounterTableId, CachedEncounterTable>,
    pub loads: u64,
    pub evictions: u64,
}
