//! Human-readable dumps of the mapping, logged by the diagnostic rank

use crate::direction::{Direction, Sense};
use crate::fold::{FoldAxes, FoldAxis, Tni};
use crate::geometry::MeshBounds;
use crate::resolver::RankTopology;
use crate::tni::TniList;
use std::fmt;

fn write_row<T: fmt::Display>(f: &mut fmt::Formatter<'_>, label: &str, values: &[T]) -> fmt::Result {
    write!(f, "  {:>5}:", label)?;
    for v in values {
        write!(f, " {}", v)?;
    }
    writeln!(f)
}

/// Job sub-mesh header
pub struct BoundsReport<'a>(pub &'a MeshBounds);

impl fmt::Display for BoundsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        writeln!(f, "rankmap for open Y tofu axis: TY x TB from system topology")?;
        writeln!(f, "  coords_org: {}", b.origin)?;
        writeln!(f, "  coords_size: {}", b.size)?;
        writeln!(f, "  coords_min: {}", b.min)?;
        write!(f, "  coords_max: {}", b.max)
    }
}

/// Sub-axis tracks and TNI rows of one fold axis
pub struct FoldReport<'a>(pub &'a FoldAxis);

impl fmt::Display for FoldReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = self.0;
        writeln!(f, "Q{} (size {})", axis.axis(), axis.len())?;
        for track in axis.tracks() {
            write_row(f, track.sub_axis.name(), &track.values)?;
        }
        write_row::<Tni>(f, "tni+", axis.table().positive())?;
        write_row::<Tni>(f, "tni-", axis.table().negative())
    }
}

/// All four fold axes
pub struct FoldAxesReport<'a>(pub &'a FoldAxes);

impl fmt::Display for FoldAxesReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.0.iter() {
            write!(f, "{}", FoldReport(axis))?;
        }
        Ok(())
    }
}

/// Full per-direction TNI tables plus the selection of one rank
pub struct TniMapReport<'a> {
    pub rank: usize,
    pub axes: &'a FoldAxes,
    pub placement: &'a RankTopology,
    pub tni_list: &'a TniList,
}

impl fmt::Display for TniMapReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tni map (rankid={})", self.rank)?;
        for dir in Direction::all() {
            let table = self.axes.get(dir.axis()).table();
            let row = match dir.sense() {
                Sense::Positive => table.positive(),
                Sense::Negative => table.negative(),
            };
            write!(f, " dir={}:", dir.index())?;
            for tni in row {
                write!(f, " {}", tni)?;
            }
            writeln!(f)?;
        }
        let c = &self.placement.coord;
        writeln!(f, " logical coord: {} {} {} {}", c[0], c[1], c[2], c[3])?;
        write!(f, " selected: {}", self.tni_list)
    }
}
