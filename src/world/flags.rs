//! Persistent boolean flags
//!
//! Event objs name a flag that, once set, keeps them from spawning again.
//! Save-file persistence is the caller's business; this is only the store.

use crate::world::core::FlagId;
use bit_vec::BitVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagStore {
    pub bits: BitVec,
}

pub fn create_flag_store(capacity: usize) -> FlagStore {
    FlagStore {
        bits: BitVec::from_elem(capacity, false),
    }
}

/// Flags past the end of the store read as clear
pub fn get_flag(store: &FlagStore, flag: FlagId) -> bool {
    store.bits.get(flag.0 as usize).unwrap_or(false)
}

pub fn set_flag(store: &mut FlagStore, flag: FlagId) {
    let index = flag.0 as usize;
    if index >= store.bits.len() {
        let grow_by = index + 1 - store.bits.len();
        store.bits.grow(grow_by, false);
        log::debug!(
            "[flags::set_flag] Grew flag store to {} bits for flag {}",
            store.bits.len(),
            flag.0
        );
    }
    store.bits.set(index, true);
}

pub fn clear_flag(store: &mut FlagStore, flag: FlagId) {
    let index = flag.0 as usize;
    if index < store.bits.len() {
        store.bits.set(index, false);
    }
}

pub fn set_flag_count(store: &FlagStore) -> usize {
    store.bits.iter().filter(|b| *b).count()
}
