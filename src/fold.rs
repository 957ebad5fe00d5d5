//! Fold tables for the logical axes
//!
//! A fold axis records, for every logical position along one axis of the 4D
//! torus, the physical sub-axis states that identify that position and the
//! transmission engine (TNI) used to reach the next position in either
//! direction.
//!
//! QX folds the A axis and the Z phase into a hexagon:
//!
//! ```text
//!   QX+  (start at o)              QX-  (clockwise coordinate)
//!      0     0                          1     1
//!    +---> +---> +                   + <---+ <---+
//!    ^           | 0  ^ TA          1|           ^     ^ TA
//!   1|          \|    |             \|           |0    |
//!    o <---+ <---+    ---> TZc       o---> +---> +     ---> TZc
//!         1     1                       0     0
//! ```
//!
//! QZ is a plain ring over the physical X axis, which is already a torus.

use crate::direction::{LogicalAxis, Sense};
use crate::error::RankMapError;
use crate::geometry::SubAxis;
use crate::RankMapResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transmission engine selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tni(pub u8);

impl Tni {
    pub fn id(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Tni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// TA over the QX hexagon
pub const QX_TA: [i32; 6] = [0, 1, 1, 1, 0, 0];
/// TZc over the QX hexagon
pub const QX_TZC: [i32; 6] = [0, 0, 1, 2, 2, 1];
/// TNI ids for QX+
pub const QX_TNI_POSITIVE: [u8; 6] = [1, 0, 0, 0, 1, 1];
/// TNI ids for QX-
pub const QX_TNI_NEGATIVE: [u8; 6] = [0, 1, 1, 1, 0, 0];

/// Length of QZ, the physical X extent of the open-Y layout
pub const QZ_LEN: usize = 24;
pub const QZ_TNI_POSITIVE: Tni = Tni(2);
pub const QZ_TNI_NEGATIVE: Tni = Tni(3);

/// Per-position TNI ids for both directions of one logical axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldTable {
    positive: Vec<Tni>,
    negative: Vec<Tni>,
}

impl FoldTable {
    pub fn new(positive: Vec<Tni>, negative: Vec<Tni>) -> RankMapResult<Self> {
        if positive.len() != negative.len() {
            return Err(RankMapError::Structural(format!(
                "fold table directions differ in length: {} vs {}",
                positive.len(),
                negative.len()
            )));
        }
        Ok(Self { positive, negative })
    }

    /// Same TNI at every position, including the wrap edge
    pub fn uniform(len: usize, positive: Tni, negative: Tni) -> Self {
        Self {
            positive: vec![positive; len],
            negative: vec![negative; len],
        }
    }

    pub fn len(&self) -> usize {
        self.positive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
    }

    pub fn positive(&self) -> &[Tni] {
        &self.positive
    }

    pub fn negative(&self) -> &[Tni] {
        &self.negative
    }

    /// TNI leaving `position` in `sense`, if the position is on the axis
    pub fn tni(&self, position: usize, sense: Sense) -> Option<Tni> {
        match sense {
            Sense::Positive => self.positive.get(position).copied(),
            Sense::Negative => self.negative.get(position).copied(),
        }
    }
}

/// Values of one physical sub-axis along a logical axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAxisTrack {
    pub sub_axis: SubAxis,
    pub values: Vec<i32>,
}

impl SubAxisTrack {
    pub fn new(sub_axis: SubAxis, values: Vec<i32>) -> Self {
        Self { sub_axis, values }
    }
}

/// One logical axis: its sub-axis tracks and its fold table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldAxis {
    axis: LogicalAxis,
    tracks: Vec<SubAxisTrack>,
    table: FoldTable,
}

impl FoldAxis {
    /// Assemble an axis, checking that every track spans the whole table
    pub fn new(axis: LogicalAxis, tracks: Vec<SubAxisTrack>, table: FoldTable) -> RankMapResult<Self> {
        if tracks.is_empty() {
            return Err(RankMapError::Structural(format!("axis {} has no sub-axis", axis)));
        }
        for track in &tracks {
            if track.values.len() != table.len() {
                return Err(RankMapError::Structural(format!(
                    "axis {}: track {} has {} positions, table has {}",
                    axis,
                    track.sub_axis,
                    track.values.len(),
                    table.len()
                )));
            }
        }
        Ok(Self { axis, tracks, table })
    }

    pub fn axis(&self) -> LogicalAxis {
        self.axis
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn tracks(&self) -> &[SubAxisTrack] {
        &self.tracks
    }

    pub fn table(&self) -> &FoldTable {
        &self.table
    }

    /// Values of one sub-axis, if this axis tracks it
    pub fn track(&self, sub_axis: SubAxis) -> Option<&[i32]> {
        self.tracks
            .iter()
            .find(|t| t.sub_axis == sub_axis)
            .map(|t| t.values.as_slice())
    }

    /// Sub-axis states at `position`
    pub fn states_at(&self, position: usize) -> impl Iterator<Item = (SubAxis, i32)> + '_ {
        self.tracks
            .iter()
            .filter_map(move |t| t.values.get(position).map(|v| (t.sub_axis, *v)))
    }

    /// First position whose states all agree with `read`
    pub fn position_matching<F>(&self, read: F) -> Option<usize>
    where
        F: Fn(SubAxis) -> i32,
    {
        (0..self.len()).find(|&i| self.tracks.iter().all(|t| t.values[i] == read(t.sub_axis)))
    }
}

/// The four fold axes of the open-Y layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldAxes {
    pub x: FoldAxis,
    pub y: FoldAxis,
    pub z: FoldAxis,
    pub t: FoldAxis,
}

impl FoldAxes {
    pub fn get(&self, axis: LogicalAxis) -> &FoldAxis {
        match axis {
            LogicalAxis::X => &self.x,
            LogicalAxis::Y => &self.y,
            LogicalAxis::Z => &self.z,
            LogicalAxis::T => &self.t,
        }
    }

    /// Logical extent of each axis in X, Y, Z, T order
    pub fn sizes(&self) -> [usize; 4] {
        [self.x.len(), self.y.len(), self.z.len(), self.t.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FoldAxis> {
        [&self.x, &self.y, &self.z, &self.t].into_iter()
    }
}

fn tnis(ids: &[u8]) -> Vec<Tni> {
    ids.iter().map(|&id| Tni(id)).collect()
}

/// Build QX: the 6-state hexagon over TA and TZc
pub fn build_qx() -> RankMapResult<FoldAxis> {
    let table = FoldTable::new(tnis(&QX_TNI_POSITIVE), tnis(&QX_TNI_NEGATIVE))?;
    FoldAxis::new(
        LogicalAxis::X,
        vec![
            SubAxisTrack::new(SubAxis::A, QX_TA.to_vec()),
            SubAxisTrack::new(SubAxis::ZPhase, QX_TZC.to_vec()),
        ],
        table,
    )
}

/// Build QZ: a plain torus over TX
pub fn build_qz() -> RankMapResult<FoldAxis> {
    let tx = (0..QZ_LEN as i32).collect();
    FoldAxis::new(
        LogicalAxis::Z,
        vec![SubAxisTrack::new(SubAxis::X, tx)],
        FoldTable::uniform(QZ_LEN, QZ_TNI_POSITIVE, QZ_TNI_NEGATIVE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_qx_literal_tables() {
        let qx = build_qx().unwrap();
        assert_eq!(qx.len(), 6);
        assert_eq!(qx.track(SubAxis::A).unwrap(), &QX_TA);
        assert_eq!(qx.track(SubAxis::ZPhase).unwrap(), &QX_TZC);
        let pos: Vec<u8> = qx.table().positive().iter().map(Tni::id).collect();
        let neg: Vec<u8> = qx.table().negative().iter().map(Tni::id).collect();
        assert_eq!(pos, vec![1, 0, 0, 0, 1, 1]);
        assert_eq!(neg, vec![0, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_qx_ids_drawn_from_zero_and_one() {
        let qx = build_qx().unwrap();
        for sense in [Sense::Positive, Sense::Negative] {
            for i in 0..qx.len() {
                let id = qx.table().tni(i, sense).unwrap().id();
                assert!(id == 0 || id == 1);
            }
        }
    }

    #[test]
    fn test_qx_backward_is_not_reversed_forward() {
        let mut reversed = QX_TNI_POSITIVE;
        reversed.reverse();
        assert_ne!(reversed, QX_TNI_NEGATIVE);
    }

    #[test]
    fn test_qx_states_are_distinct() {
        let qx = build_qx().unwrap();
        let states: HashSet<Vec<(SubAxis, i32)>> =
            (0..qx.len()).map(|i| qx.states_at(i).collect()).collect();
        assert_eq!(states.len(), 6);
    }

    #[test]
    fn test_qz_uniform_including_wrap() {
        let qz = build_qz().unwrap();
        assert_eq!(qz.len(), 24);
        assert!(qz.table().positive().iter().all(|&t| t == Tni(2)));
        assert!(qz.table().negative().iter().all(|&t| t == Tni(3)));
        assert_eq!(qz.table().tni(23, Sense::Positive), Some(Tni(2)));
        assert_eq!(qz.table().tni(0, Sense::Negative), Some(Tni(3)));
        assert_eq!(qz.table().tni(24, Sense::Positive), None);
    }

    #[test]
    fn test_position_matching() {
        let qx = build_qx().unwrap();
        let pos = qx.position_matching(|s| match s {
            SubAxis::A => 0,
            SubAxis::ZPhase => 1,
            _ => unreachable!(),
        });
        assert_eq!(pos, Some(5));
    }

    #[test]
    fn test_mismatched_track_is_structural_error() {
        let err = FoldAxis::new(
            LogicalAxis::X,
            vec![SubAxisTrack::new(SubAxis::A, vec![0, 1])],
            FoldTable::uniform(3, Tni(0), Tni(1)),
        )
        .unwrap_err();
        assert!(matches!(err, RankMapError::Structural(_)));
    }
}
