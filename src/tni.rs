//! Per-direction TNI selection for one process

use crate::direction::{Direction, LogicalAxis};
use crate::error::RankMapError;
use crate::fold::{FoldAxes, Tni};
use crate::RankMapResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The TNI used towards each of the 8 neighbours, in direction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TniList([Tni; 8]);

impl TniList {
    pub fn get(&self, dir: Direction) -> Tni {
        self.0[dir.index()]
    }

    pub fn as_array(&self) -> &[Tni; 8] {
        &self.0
    }

    /// Raw ids, for handing to the communication layer
    pub fn ids(&self) -> [u8; 8] {
        self.0.map(|t| t.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, Tni)> + '_ {
        Direction::all().into_iter().zip(self.0.iter().copied())
    }
}

impl fmt::Display for TniList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (dir, tni)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", dir, tni)?;
        }
        Ok(())
    }
}

/// Look up the TNI of every direction at this process's logical coordinate.
///
/// `coord` is the position on X, Y, Z, T. Positions outside an axis are
/// rejected.
pub fn resolve_tni_list(axes: &FoldAxes, coord: &[usize; 4]) -> RankMapResult<TniList> {
    let mut list = [Tni(0); 8];
    for dir in Direction::all() {
        let axis: LogicalAxis = dir.axis();
        let fold = axes.get(axis);
        let position = coord[axis.index()];
        list[dir.index()] = fold.table().tni(position, dir.sense()).ok_or(
            RankMapError::CoordinateOutOfRange {
                axis,
                coord: position,
                len: fold.len(),
            },
        )?;
    }
    Ok(TniList(list))
}
