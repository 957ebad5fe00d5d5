//! Logical axes and the 8 communication directions of the 4D torus
//!
//! Directions are ordered +X, -X, +Y, -Y, +Z, -Z, +T, -T. That order is the
//! layout of every per-direction list handed to the communication layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four logical torus axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogicalAxis {
    X = 0,
    Y = 1,
    Z = 2,
    T = 3,
}

impl LogicalAxis {
    /// All axes in index order
    pub fn all() -> [LogicalAxis; 4] {
        [LogicalAxis::X, LogicalAxis::Y, LogicalAxis::Z, LogicalAxis::T]
    }

    /// Get index (0-3)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogicalAxis::X => "X",
            LogicalAxis::Y => "Y",
            LogicalAxis::Z => "Z",
            LogicalAxis::T => "T",
        }
    }

    /// Direction along this axis with the given sense
    pub fn direction(&self, sense: Sense) -> Direction {
        match (self, sense) {
            (LogicalAxis::X, Sense::Positive) => Direction::PosX,
            (LogicalAxis::X, Sense::Negative) => Direction::NegX,
            (LogicalAxis::Y, Sense::Positive) => Direction::PosY,
            (LogicalAxis::Y, Sense::Negative) => Direction::NegY,
            (LogicalAxis::Z, Sense::Positive) => Direction::PosZ,
            (LogicalAxis::Z, Sense::Negative) => Direction::NegZ,
            (LogicalAxis::T, Sense::Positive) => Direction::PosT,
            (LogicalAxis::T, Sense::Negative) => Direction::NegT,
        }
    }
}

impl fmt::Display for LogicalAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sense of travel along a logical axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    /// Towards increasing logical position
    Positive,
    /// Towards decreasing logical position
    Negative,
}

impl Sense {
    /// Get the opposite sense
    pub fn reverse(&self) -> Self {
        match self {
            Sense::Positive => Sense::Negative,
            Sense::Negative => Sense::Positive,
        }
    }

    /// Step applied to a ring position (-1 for negative)
    pub fn sign(&self) -> i64 {
        match self {
            Sense::Positive => 1,
            Sense::Negative => -1,
        }
    }
}

/// One of the 8 logical neighbour directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
    PosT = 6,
    NegT = 7,
}

impl Direction {
    /// All directions in list order
    pub fn all() -> [Direction; 8] {
        [
            Direction::PosX,
            Direction::NegX,
            Direction::PosY,
            Direction::NegY,
            Direction::PosZ,
            Direction::NegZ,
            Direction::PosT,
            Direction::NegT,
        ]
    }

    /// Get index (0-7)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn axis(&self) -> LogicalAxis {
        match self {
            Direction::PosX | Direction::NegX => LogicalAxis::X,
            Direction::PosY | Direction::NegY => LogicalAxis::Y,
            Direction::PosZ | Direction::NegZ => LogicalAxis::Z,
            Direction::PosT | Direction::NegT => LogicalAxis::T,
        }
    }

    pub fn sense(&self) -> Sense {
        match self {
            Direction::PosX | Direction::PosY | Direction::PosZ | Direction::PosT => {
                Sense::Positive
            }
            _ => Sense::Negative,
        }
    }

    /// Get the opposite direction on the same axis
    pub fn reverse(&self) -> Direction {
        self.axis().direction(self.sense().reverse())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::PosX => "+X",
            Direction::NegX => "-X",
            Direction::PosY => "+Y",
            Direction::NegY => "-Y",
            Direction::PosZ => "+Z",
            Direction::NegZ => "-Z",
            Direction::PosT => "+T",
            Direction::NegT => "-T",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
