use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Side of a map a connection leaves from
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    South = 0,
    North = 1,
    West = 2,
    East = 3,
}

impl CompassDirection {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::South),
            1 => Some(Self::North),
            2 => Some(Self::West),
            3 => Some(Self::East),
            _ => None,
        }
    }
}

/// Eight-way facing used by objs and movement commands.
/// Y grows southwards, matching layout rows.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacingDirection {
    South = 0,
    North = 1,
    West = 2,
    East = 3,
    Southwest = 4,
    Southeast = 5,
    Northwest = 6,
    Northeast = 7,
}

impl FacingDirection {
    pub const ALL: [FacingDirection; 8] = [
        Self::South,
        Self::North,
        Self::West,
        Self::East,
        Self::Southwest,
        Self::Southeast,
        Self::Northwest,
        Self::Northeast,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn delta(self) -> IVec2 {
        match self {
            Self::South => IVec2::new(0, 1),
            Self::North => IVec2::new(0, -1),
            Self::West => IVec2::new(-1, 0),
            Self::East => IVec2::new(1, 0),
            Self::Southwest => IVec2::new(-1, 1),
            Self::Southeast => IVec2::new(1, 1),
            Self::Northwest => IVec2::new(-1, -1),
            Self::Northeast => IVec2::new(1, -1),
        }
    }
}

impl Default for FacingDirection {
    fn default() -> Self {
        FacingDirection::South
    }
}
