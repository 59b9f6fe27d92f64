//! Maps: registry, lifecycle, connection offsets and visibility
//!
//! A map is registered as soon as anything points at it, but its layout and
//! events (visible data) and its details and encounters (current data) are
//! only held while the lifecycle controller says so.

pub mod connection_walker;
pub mod lifecycle_operations;
pub mod map_assets;
pub mod map_data;
pub mod registry_operations;
pub mod visibility_operations;

pub use connection_walker::{connection_offset, recompute_block_offsets, recurse_block_offsets};
pub use lifecycle_operations::{
    deduct_map_reference, on_current_map, on_map_no_longer_visible, on_map_now_visible,
    on_no_longer_current_map, on_no_longer_warping_map, on_warping_map, recompute_offsets,
};
pub use map_assets::{
    encode_map_asset, encode_map_details, encode_map_events, parse_map_asset, parse_map_details,
    parse_map_events, parse_map_header,
};
pub use map_data::{
    CurrentMapData, MapAsset, MapConnection, MapData, MapDetails, MapEvents, MapKind,
    MapRegistryData, MapRegistryStats, ObjEvent, ScriptTrigger, VisibleMapData, Warp, Weather,
};
pub use registry_operations::{
    add_reference, contains_block, create_map_registry, get_details, get_encounters, get_events,
    get_layout, get_map, is_current_loaded, is_visible_loaded, load_or_get, loaded_map_count,
    map_ref_count,
};
pub use visibility_operations::{
    desired_visible_maps, rects_intersect, update_visible_maps, viewport_rect,
};
