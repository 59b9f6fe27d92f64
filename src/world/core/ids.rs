use serde::{Deserialize, Serialize};
use std::fmt;

/// Map identifier, externally assigned and stable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MapId(pub u16);

/// Obj identifier. Event objs use the id from their map's event data, so ids
/// are only unique within the set of maps loaded at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ObjId(pub u16);

impl ObjId {
    pub const CAMERA: ObjId = ObjId(0xFFFF);
    pub const PLAYER: ObjId = ObjId(0xFFFE);
}

/// Index into the flags store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FlagId(pub u16);

impl FlagId {
    /// Raw value meaning "no flag" in event records
    pub const NONE_RAW: u16 = 0xFFFF;

    pub fn from_raw(raw: u16) -> Option<FlagId> {
        if raw == Self::NONE_RAW {
            None
        } else {
            Some(FlagId(raw))
        }
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Map({})", self.0)
    }
}

impl fmt::Display for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ObjId::CAMERA => write!(f, "Camera"),
            ObjId::PLAYER => write!(f, "Player"),
            _ => write!(f, "Obj({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_from_raw() {
        assert_eq!(FlagId::from_raw(0xFFFF), None);
        assert_eq!(FlagId::from_raw(12), Some(FlagId(12)));
    }

    #[test]
    fn test_obj_display() {
        assert_eq!(ObjId::CAMERA.to_string(), "Camera");
        assert_eq!(ObjId(4).to_string(), "Obj(4)");
    }
}
