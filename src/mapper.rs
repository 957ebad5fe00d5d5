//! Rank mapping for the open-Y Tofu layout
//!
//! Physical mesh (per job):
//!
//! ```text
//!   Tofu X: 24         -> QZ, plain torus
//!   Tofu Y: open       -> QT together with B, ring taken from the system topology
//!   Tofu Z: 3 x depth  -> phase feeds QX, depth feeds QY
//!   Tofu A, B, C: 2 x 3 x 2
//! ```
//!
//! The mapping builds the four fold axes, lets a [`NeighborResolver`] place
//! this process on them, and selects a TNI for each of the 8 directions.

use crate::collective::Collective;
use crate::config::RankMapConfig;
use crate::diagnostics::{BoundsReport, FoldAxesReport, TniMapReport};
use crate::fold::{build_qx, build_qz, FoldAxes, QZ_LEN};
use crate::gather::gather_qt;
use crate::geometry::{MeshBounds, PhysicalAxis, PhysicalCoordinate};
use crate::open_axis::{build_qy, depth_from_z_extent};
use crate::resolver::{NeighborResolver, RankTopology, ResolveRequest};
use crate::tni::{resolve_tni_list, TniList};
use crate::topology::SystemTopology;
use crate::{RankMapError, RankMapResult};
use serde::{Deserialize, Serialize};

/// Exit code used when the process group is torn down
pub const EXIT_FAILURE: i32 = 1;

/// Identity of this process in the job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessContext {
    pub rank: usize,
    pub coords: PhysicalCoordinate,
    pub bounds: MeshBounds,
}

/// Topology a successful mapping reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TopologyId {
    /// 4D torus over X=24, open Y, Z=3 x depth
    OpenY = 1,
}

impl TopologyId {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Result of mapping one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankMap {
    pub topology: TopologyId,
    pub placement: RankTopology,
    pub tni_list: TniList,
    pub axes: FoldAxes,
}

impl RankMap {
    /// Non-negative status of the mapping call
    pub fn status(&self) -> i32 {
        self.topology.code()
    }
}

/// Build QX, QY, QZ and QT.
///
/// Collective: QT is gathered across the whole group.
pub fn build_fold_axes<S, C>(
    ctx: &ProcessContext,
    config: &RankMapConfig,
    topology: &S,
    comm: &C,
) -> RankMapResult<FoldAxes>
where
    S: SystemTopology + ?Sized,
    C: Collective + ?Sized,
{
    let map = &config.axis_map;

    let x = build_qx()?;
    let y = build_qy(depth_from_z_extent(ctx.bounds.extent(PhysicalAxis::Z, map)))?;

    let x_extent = ctx.bounds.extent(PhysicalAxis::X, map);
    if x_extent != QZ_LEN && ctx.rank == config.diagnostic_rank {
        log::warn!("physical X extent is {}, QZ assumes {}", x_extent, QZ_LEN);
    }
    let z = build_qz()?;

    let t = gather_qt(ctx, config, topology, comm)?;

    Ok(FoldAxes { x, y, z, t })
}

fn abort_group<C: Collective + ?Sized>(ctx: &ProcessContext, comm: &C, err: &RankMapError) -> ! {
    log::error!("rank {}: {}", ctx.rank, err);
    comm.abort(EXIT_FAILURE)
}

/// Map this process onto the logical 4D torus and select its TNIs.
///
/// Must be called once by every process of the group. Configuration,
/// topology-service and structural failures abort the whole group through
/// `comm`. A coordinate the resolver cannot place is returned as
/// [`RankMapError::InconsistentCoordinate`] carrying the resolver's status.
pub fn map_open_y_topology<S, C, R>(
    ctx: &ProcessContext,
    config: &RankMapConfig,
    topology: &S,
    comm: &C,
    resolver: &R,
) -> RankMapResult<RankMap>
where
    S: SystemTopology + ?Sized,
    C: Collective + ?Sized,
    R: NeighborResolver + ?Sized,
{
    let diagnostic = ctx.rank == config.diagnostic_rank;
    if diagnostic {
        log::info!("{}", BoundsReport(&ctx.bounds));
    }

    let axes = match config.validate().and_then(|_| build_fold_axes(ctx, config, topology, comm)) {
        Ok(axes) => axes,
        Err(err) => abort_group(ctx, comm, &err),
    };
    if diagnostic {
        log::info!("fold axes:\n{}", FoldAxesReport(&axes));
    }

    let request = ResolveRequest {
        rank: ctx.rank,
        coords: ctx.coords,
        bounds: &ctx.bounds,
        axis_map: &config.axis_map,
        axes: &axes,
        ranks_per_node: config.ranks_per_node,
    };
    let placement = resolver
        .resolve(&request)
        .map_err(|status| RankMapError::InconsistentCoordinate { status: status.0 })?;
    log::debug!("rank {}: logical coord {:?}", ctx.rank, placement.coord);

    let tni_list = resolve_tni_list(&axes, &placement.coord)?;
    if diagnostic {
        log::info!(
            "{}",
            TniMapReport {
                rank: ctx.rank,
                axes: &axes,
                placement: &placement,
                tni_list: &tni_list,
            }
        );
    }

    Ok(RankMap {
        topology: TopologyId::OpenY,
        placement,
        tni_list,
        axes,
    })
}
