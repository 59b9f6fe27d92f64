//! Encounter records and the shared encounter table cache

pub mod encounter_data;
pub mod encounter_operations;

pub use encounter_data::{
    CachedEncounterTable, EncounterCacheData, EncounterEntry, EncounterMethod, EncounterSlot,
    EncounterTable, EncounterTableId, MapEncounters,
};
pub use encounter_operations::{
    create_encounter_cache, deduct_reference, encode_encounter_table, encode_map_encounters,
    entry_for_method, get_table, load_or_get, parse_encounter_table, parse_map_encounters,
    release_tables, retain_tables, table_ref_count,
};
