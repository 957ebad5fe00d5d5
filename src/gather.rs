//! Global gather of the logical T axis
//!
//! The T position of a node is only known to the topology service, while
//! its physical TB/TY state is only known to the node itself. The table is
//! assembled with a sparse-buffer sum:
//!
//! 1. every process zeroes a buffer of `2 * size_t` integers,
//! 2. one representative per (TB, TY) node writes `(TB, TY)` at
//!    `2 * this_t` and `2 * this_t + 1`,
//! 3. the buffers are summed across the whole group.
//!
//! The sum reproduces the table only if each slot has at most one
//! contributor. With `verify_contributions` set, a second reduction counts
//! contributors per slot and duplicates are rejected.
//!
//! ```text
//!   QT+: torus in TY x TB          QT-: torus in TY x TB
//!     4     4         4                5     5        5
//!    o---> +---> ... +---> +       o <---+ <--- ... <---+
//!    ^                     | 4    5|                    ^
//!    |_____________________|       |____________________|
//! ```

use crate::collective::Collective;
use crate::config::RankMapConfig;
use crate::direction::LogicalAxis;
use crate::error::RankMapError;
use crate::fold::{FoldAxis, FoldTable, SubAxisTrack, Tni};
use crate::geometry::{PhysicalAxis, SubAxis};
use crate::mapper::ProcessContext;
use crate::topology::{query_t_extent, query_this_t, SystemTopology};
use crate::RankMapResult;

pub const QT_TNI_POSITIVE: Tni = Tni(4);
pub const QT_TNI_NEGATIVE: Tni = Tni(5);

/// Physical axes on which a representative must sit at the origin
const REPRESENTATIVE_AXES: [PhysicalAxis; 4] =
    [PhysicalAxis::X, PhysicalAxis::Z, PhysicalAxis::A, PhysicalAxis::C];

/// Physical state of one T position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TPair {
    /// B offset, periodic with period 3
    pub tb: i32,
    /// Y offset, open
    pub ty: i32,
}

/// Whether this process speaks for its node in the T gather.
///
/// The first rank of each node qualifies if its node sits at the origin on
/// X, Z, A and C, leaving exactly one representative per (B, Y) node of a
/// rectangular job.
pub fn is_representative(ctx: &ProcessContext, config: &RankMapConfig) -> bool {
    ctx.rank % config.ranks_per_node == 0
        && REPRESENTATIVE_AXES.iter().all(|&axis| {
            ctx.coords.get(axis, &config.axis_map) == ctx.bounds.origin.get(axis, &config.axis_map)
        })
}

/// (TB, TY) of this process's node
pub fn t_pair(ctx: &ProcessContext, config: &RankMapConfig) -> TPair {
    let map = &config.axis_map;
    TPair {
        tb: SubAxis::B.read(&ctx.coords, &ctx.bounds.origin, map),
        ty: SubAxis::Y.read(&ctx.coords, &ctx.bounds.origin, map),
    }
}

/// Local sparse buffer: zero everywhere except this process's slot
pub fn pack_contribution(size_t: usize, this_t: usize, pair: Option<TPair>) -> RankMapResult<Vec<i32>> {
    let mut buffer = vec![0; 2 * size_t];
    if let Some(pair) = pair {
        if this_t >= size_t {
            return Err(RankMapError::Structural(format!(
                "T position {} outside reported extent {}",
                this_t, size_t
            )));
        }
        buffer[2 * this_t] = pair.tb;
        buffer[2 * this_t + 1] = pair.ty;
    }
    Ok(buffer)
}

/// Split a reduced buffer into the TB and TY tracks
pub fn unpack_pairs(reduced: &[i32]) -> (Vec<i32>, Vec<i32>) {
    reduced.chunks_exact(2).map(|p| (p[0], p[1])).unzip()
}

/// Sum every process's contribution and return the TB and TY tracks
pub fn gather_t_pairs<C: Collective + ?Sized>(
    comm: &C,
    size_t: usize,
    this_t: usize,
    pair: Option<TPair>,
    verify: bool,
) -> RankMapResult<(Vec<i32>, Vec<i32>)> {
    let local = pack_contribution(size_t, this_t, pair)?;
    let reduced = comm.all_reduce_sum(&local)?;
    if reduced.len() != local.len() {
        return Err(RankMapError::Structural(format!(
            "reduced T buffer has {} entries, expected {}",
            reduced.len(),
            local.len()
        )));
    }

    if verify {
        let mut counts = vec![0; size_t];
        if pair.is_some() {
            counts[this_t] = 1;
        }
        let counts = comm.all_reduce_sum(&counts)?;
        for (t, &count) in counts.iter().enumerate() {
            if count > 1 {
                return Err(RankMapError::DuplicateContribution { t, count });
            }
            if count == 0 {
                log::warn!("T position {} has no representative; its pair reads (0, 0)", t);
            }
        }
    }

    Ok(unpack_pairs(&reduced))
}

/// Build QT from the gathered tracks
pub fn build_qt(tb: Vec<i32>, ty: Vec<i32>) -> RankMapResult<FoldAxis> {
    let size_t = tb.len();
    FoldAxis::new(
        LogicalAxis::T,
        vec![SubAxisTrack::new(SubAxis::B, tb), SubAxisTrack::new(SubAxis::Y, ty)],
        FoldTable::uniform(size_t, QT_TNI_POSITIVE, QT_TNI_NEGATIVE),
    )
}

/// Query the topology service, gather the T table and build QT.
///
/// Collective: every process of the group must call this.
pub fn gather_qt<S, C>(
    ctx: &ProcessContext,
    config: &RankMapConfig,
    topology: &S,
    comm: &C,
) -> RankMapResult<FoldAxis>
where
    S: SystemTopology + ?Sized,
    C: Collective + ?Sized,
{
    let size_t = query_t_extent(topology, config.topology_dimension, config.t_axis_max)?;
    let this_t = query_this_t(topology, ctx.rank)?;

    let pair = is_representative(ctx, config).then(|| t_pair(ctx, config));
    if let Some(pair) = pair {
        log::debug!(
            "rank {}: representative for T={} (TB={}, TY={})",
            ctx.rank,
            this_t,
            pair.tb,
            pair.ty
        );
    }

    let (tb, ty) = gather_t_pairs(comm, size_t, this_t, pair, config.verify_contributions)?;
    build_qt(tb, ty)
}
