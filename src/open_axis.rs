//! Synthesis of the periodic QY axis from the open Z depth
//!
//! The physical Y axis is open, so the logical Y ring is built from TC (a
//! two-state companion) and TZd (the Z depth, open). The ring walks the open
//! segment forward on the far side (TC = 1) and back on the near side
//! (TC = 0):
//!
//! ```text
//!   TC=1    (1,0)->(1,1)-> ... ->(1,d-1)
//!             ^                     |
//!   TC=0    (0,0)<-(0,1)<- ... <-(0,d-1)
//! ```
//!
//! Every step of the walk uses the ordinary TNI of its direction. The wrap
//! edge between the last position and position 0 closes the ring where the
//! open axis has no ring link of its own, and is sent through a reserved
//! loop-back TNI instead.

use crate::direction::{LogicalAxis, Sense};
use crate::error::RankMapError;
use crate::fold::{FoldAxis, FoldTable, SubAxisTrack, Tni};
use crate::geometry::{SubAxis, PHASE_PERIOD};
use crate::periodic::is_wrap_edge;
use crate::RankMapResult;

pub const QY_TNI_POSITIVE: Tni = Tni(0);
pub const QY_TNI_POSITIVE_LOOP_BACK: Tni = Tni(2);
pub const QY_TNI_NEGATIVE: Tni = Tni(1);
pub const QY_TNI_NEGATIVE_LOOP_BACK: Tni = Tni(3);

/// Open depth derived from the physical Z extent
pub fn depth_from_z_extent(z_extent: usize) -> usize {
    z_extent / PHASE_PERIOD as usize
}

/// Fold an open segment of `depth` nodes into a ring of (TC, TZd) states
pub fn fold_open_segment(depth: usize) -> (Vec<i32>, Vec<i32>) {
    let mut side = Vec::with_capacity(2 * depth);
    let mut zd = Vec::with_capacity(2 * depth);

    side.push(0);
    zd.push(0);
    for z in 0..depth as i32 {
        side.push(1);
        zd.push(z);
    }
    for z in (1..depth as i32).rev() {
        side.push(0);
        zd.push(z);
    }

    (side, zd)
}

/// Per-position TNIs: one id for every real edge, a loop-back id on the wrap edge
fn ring_tnis(len: usize, sense: Sense, ordinary: Tni, loop_back: Tni) -> Vec<Tni> {
    (0..len)
        .map(|i| if is_wrap_edge(i, len, sense) { loop_back } else { ordinary })
        .collect()
}

/// Build QY for an open Z depth of `depth` nodes
pub fn build_qy(depth: usize) -> RankMapResult<FoldAxis> {
    let (side, zd) = fold_open_segment(depth);
    let size_y = 2 * depth;
    if side.len() != size_y {
        return Err(RankMapError::Structural(format!(
            "QY ring has {} positions for depth {} (expected {})",
            side.len(),
            depth,
            size_y
        )));
    }

    let table = FoldTable::new(
        ring_tnis(size_y, Sense::Positive, QY_TNI_POSITIVE, QY_TNI_POSITIVE_LOOP_BACK),
        ring_tnis(size_y, Sense::Negative, QY_TNI_NEGATIVE, QY_TNI_NEGATIVE_LOOP_BACK),
    )?;

    log::debug!("QY: depth {} folded into {} positions", depth, size_y);

    FoldAxis::new(
        LogicalAxis::Y,
        vec![
            SubAxisTrack::new(SubAxis::C, side),
            SubAxisTrack::new(SubAxis::ZDepth, zd),
        ],
        table,
    )
}
