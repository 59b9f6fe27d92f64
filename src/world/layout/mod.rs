//! Map layouts: block grid plus border fill

pub mod layout_data;
pub mod layout_operations;

pub use layout_data::{CellFlags, LayoutAsset, LayoutCell, MapLayoutData};
pub use layout_operations::{
    cell_elevation, cell_is_blocked, create_layout, delete_layout, encode_layout_asset, get_block,
    is_in_bounds, make_cell_flags, parse_layout_asset,
};
