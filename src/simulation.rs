//! In-process simulation of a whole open-Y job
//!
//! A synthetic job places nodes on a rectangular sub-mesh at the origin:
//! X=24, Y=`y_extent`, Z=3 x `depth`, A=2, B=3, C=2, with
//! [`RANKS_PER_NODE`](crate::config::RANKS_PER_NODE) ranks per node. Its
//! system topology lays the (B, Y) plane out along the second axis as
//! `T = 3 * y + b`.
//!
//! Every rank's T-gather contribution is a pure function of its coordinate,
//! so the whole group's reduction can be computed up front (in parallel) and
//! replayed to any single rank through [`ReplayCollective`].

use crate::collective::{Collective, CollectiveError};
use crate::config::RankMapConfig;
use crate::fold::QZ_LEN;
use crate::gather::{is_representative, pack_contribution, t_pair};
use crate::geometry::{AxisMap, MeshBounds, PhysicalAxis, PhysicalCoordinate, PHASE_PERIOD};
use crate::mapper::{map_open_y_topology, ProcessContext, RankMap};
use crate::resolver::FoldResolver;
use crate::topology::{SystemTopology, TopologyQueryError};
use crate::{RankMapError, RankMapResult};
use rayon::prelude::*;

const A_EXTENT: usize = 2;
const B_EXTENT: usize = 3;
const C_EXTENT: usize = 2;

/// A synthetic job on the open-Y layout
#[derive(Debug, Clone)]
pub struct SimulatedJob {
    y_extent: usize,
    depth: usize,
    ranks_per_node: usize,
    axis_map: AxisMap,
}

impl SimulatedJob {
    pub fn new(y_extent: usize, depth: usize, config: &RankMapConfig) -> RankMapResult<Self> {
        config.validate()?;
        if y_extent == 0 || depth == 0 {
            return Err(RankMapError::InvalidConfig(
                "simulated job needs a positive Y extent and depth".into(),
            ));
        }
        if y_extent > u8::MAX as usize || depth * PHASE_PERIOD as usize > u8::MAX as usize {
            return Err(RankMapError::InvalidConfig(format!(
                "simulated job of Y={} depth={} does not fit Tofu coordinates",
                y_extent, depth
            )));
        }
        Ok(Self {
            y_extent,
            depth,
            ranks_per_node: config.ranks_per_node,
            axis_map: config.axis_map,
        })
    }

    /// Extent of each physical axis, in (A, B, C, X, Y, Z) order
    fn extents(&self) -> [(PhysicalAxis, usize); 6] {
        [
            (PhysicalAxis::A, A_EXTENT),
            (PhysicalAxis::B, B_EXTENT),
            (PhysicalAxis::C, C_EXTENT),
            (PhysicalAxis::X, QZ_LEN),
            (PhysicalAxis::Y, self.y_extent),
            (PhysicalAxis::Z, self.depth * PHASE_PERIOD as usize),
        ]
    }

    pub fn bounds(&self) -> MeshBounds {
        let mut size = PhysicalCoordinate::default();
        for (axis, extent) in self.extents() {
            size.set(axis, &self.axis_map, extent as u8);
        }
        MeshBounds::from_origin_and_size(PhysicalCoordinate::default(), size)
    }

    pub fn num_nodes(&self) -> usize {
        self.extents().iter().map(|(_, e)| e).product()
    }

    pub fn num_ranks(&self) -> usize {
        self.num_nodes() * self.ranks_per_node
    }

    /// Extent of the logical T axis
    pub fn t_extent(&self) -> usize {
        B_EXTENT * self.y_extent
    }

    /// Physical coordinate of `rank`
    pub fn coords_of(&self, rank: usize) -> Option<PhysicalCoordinate> {
        if rank >= self.num_ranks() {
            return None;
        }
        let mut node = rank / self.ranks_per_node;
        let mut coords = PhysicalCoordinate::default();
        for (axis, extent) in self.extents() {
            coords.set(axis, &self.axis_map, (node % extent) as u8);
            node /= extent;
        }
        Some(coords)
    }

    pub fn context(&self, rank: usize) -> Option<ProcessContext> {
        Some(ProcessContext {
            rank,
            coords: self.coords_of(rank)?,
            bounds: self.bounds(),
        })
    }

    fn t_of(&self, coords: &PhysicalCoordinate) -> usize {
        let b = coords.get(PhysicalAxis::B, &self.axis_map) as usize;
        let y = coords.get(PhysicalAxis::Y, &self.axis_map) as usize;
        B_EXTENT * y + b
    }

    fn contribution(&self, rank: usize, config: &RankMapConfig) -> RankMapResult<(Vec<i32>, Vec<i32>)> {
        let ctx = self
            .context(rank)
            .ok_or_else(|| RankMapError::Structural(format!("rank {} outside job", rank)))?;
        let this_t = self.t_of(&ctx.coords);
        let pair = is_representative(&ctx, config).then(|| t_pair(&ctx, config));
        let mut counts = vec![0; self.t_extent()];
        if pair.is_some() {
            counts[this_t] = 1;
        }
        Ok((pack_contribution(self.t_extent(), this_t, pair)?, counts))
    }

    /// Sum of every rank's T-gather buffers: (pairs, contributor counts)
    pub fn reduce_all(&self, config: &RankMapConfig) -> RankMapResult<(Vec<i32>, Vec<i32>)> {
        let buffers: Vec<(Vec<i32>, Vec<i32>)> = (0..self.num_ranks())
            .into_par_iter()
            .map(|rank| self.contribution(rank, config))
            .collect::<RankMapResult<_>>()?;

        let mut pairs = vec![0; 2 * self.t_extent()];
        let mut counts = vec![0; self.t_extent()];
        for (p, c) in &buffers {
            pairs.iter_mut().zip(p).for_each(|(acc, v)| *acc += v);
            counts.iter_mut().zip(c).for_each(|(acc, v)| *acc += v);
        }
        Ok((pairs, counts))
    }

    /// Collective for `rank` that replays pre-computed reductions
    pub fn replay(&self, rank: usize, config: &RankMapConfig) -> RankMapResult<ReplayCollective> {
        let (pairs, counts) = self.reduce_all(config)?;
        Ok(ReplayCollective {
            rank,
            size: self.num_ranks(),
            pairs,
            counts,
        })
    }

    /// Map one rank of the job with the fold resolver
    pub fn map_rank(&self, rank: usize, config: &RankMapConfig) -> RankMapResult<RankMap> {
        let ctx = self.context(rank).ok_or_else(|| {
            RankMapError::InvalidConfig(format!("rank {} outside job of {}", rank, self.num_ranks()))
        })?;
        let comm = self.replay(rank, config)?;
        map_open_y_topology(&ctx, config, self, &comm, &FoldResolver)
    }
}

impl SystemTopology for SimulatedJob {
    fn dimension(&self) -> Result<usize, TopologyQueryError> {
        Ok(3)
    }

    fn shape(&self) -> Result<[usize; 3], TopologyQueryError> {
        Ok([1, self.t_extent(), 1])
    }

    fn coords(&self, rank: usize) -> Result<[usize; 3], TopologyQueryError> {
        let coords = self.coords_of(rank).ok_or(TopologyQueryError { code: -1 })?;
        Ok([0, self.t_of(&coords), 0])
    }
}

/// Collective that answers with the reductions of a [`SimulatedJob`].
///
/// The pair and count buffers differ in length, which selects the answer.
#[derive(Debug, Clone)]
pub struct ReplayCollective {
    rank: usize,
    size: usize,
    pairs: Vec<i32>,
    counts: Vec<i32>,
}

impl Collective for ReplayCollective {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce_sum(&self, local: &[i32]) -> Result<Vec<i32>, CollectiveError> {
        if local.len() == self.pairs.len() {
            Ok(self.pairs.clone())
        } else if local.len() == self.counts.len() {
            Ok(self.counts.clone())
        } else {
            Err(CollectiveError::LengthMismatch)
        }
    }

    fn abort(&self, code: i32) -> ! {
        std::process::exit(code)
    }
}
