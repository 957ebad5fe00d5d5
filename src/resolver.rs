//! Neighbour resolution
//!
//! Turns a physical coordinate into a position on each logical axis and
//! finds the physical coordinates of the 8 logical neighbours. The mapping
//! consults resolution through [`NeighborResolver`] so that a job can plug
//! in its own; [`FoldResolver`] resolves directly against the fold axes.

use crate::direction::{Direction, LogicalAxis, Sense};
use crate::fold::{FoldAxes, FoldAxis};
use crate::geometry::{AxisMap, MeshBounds, PhysicalCoordinate};
use crate::periodic::step;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Negative status reported for a coordinate that does not fit the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveStatus(pub i32);

impl ResolveStatus {
    /// Coordinate outside the job's min/max box
    pub const OUT_OF_BOUNDS: ResolveStatus = ResolveStatus(-1);
    /// Coordinate matches no position of some fold axis
    pub const NO_POSITION: ResolveStatus = ResolveStatus(-2);
    /// Neighbour coordinate does not fit a coordinate byte
    pub const UNREPRESENTABLE: ResolveStatus = ResolveStatus(-3);
}

impl fmt::Display for ResolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a resolver may look at
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub rank: usize,
    pub coords: PhysicalCoordinate,
    pub bounds: &'a MeshBounds,
    pub axis_map: &'a AxisMap,
    pub axes: &'a FoldAxes,
    pub ranks_per_node: usize,
}

/// A logical neighbour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub coords: PhysicalCoordinate,
    pub rank_in_node: usize,
}

/// Logical placement of one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTopology {
    /// Position on X, Y, Z, T
    pub coord: [usize; 4],
    /// Extent of X, Y, Z, T
    pub size: [usize; 4],
    /// Neighbours in direction order (+X, -X, ..., -T)
    pub neighbors: [Neighbor; 8],
}

impl RankTopology {
    pub fn coord(&self, axis: LogicalAxis) -> usize {
        self.coord[axis.index()]
    }

    pub fn size(&self, axis: LogicalAxis) -> usize {
        self.size[axis.index()]
    }

    pub fn neighbor(&self, dir: Direction) -> &Neighbor {
        &self.neighbors[dir.index()]
    }
}

/// Resolves logical placement from physical coordinates
pub trait NeighborResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<RankTopology, ResolveStatus>;
}

/// Resolver that matches sub-axis states against the fold axes
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldResolver;

impl FoldResolver {
    fn position(axis: &FoldAxis, request: &ResolveRequest<'_>) -> Option<usize> {
        axis.position_matching(|sub| sub.read(&request.coords, &request.bounds.origin, request.axis_map))
    }

    /// `coords` with the sub-axes of `axis` rewritten to `position`
    fn coords_at(
        axis: &FoldAxis,
        position: usize,
        request: &ResolveRequest<'_>,
    ) -> Result<PhysicalCoordinate, ResolveStatus> {
        let mut coords = request.coords;
        for (sub, value) in axis.states_at(position) {
            sub.write(&mut coords, &request.bounds.origin, request.axis_map, value)
                .ok_or(ResolveStatus::UNREPRESENTABLE)?;
        }
        Ok(coords)
    }
}

impl NeighborResolver for FoldResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<RankTopology, ResolveStatus> {
        if !request.bounds.contains(&request.coords) {
            return Err(ResolveStatus::OUT_OF_BOUNDS);
        }

        let mut coord = [0; 4];
        for axis in LogicalAxis::all() {
            coord[axis.index()] =
                Self::position(request.axes.get(axis), request).ok_or(ResolveStatus::NO_POSITION)?;
        }
        let size = request.axes.sizes();

        let rank_in_node = request.rank % request.ranks_per_node.max(1);
        let mut neighbors = [Neighbor {
            coords: request.coords,
            rank_in_node,
        }; 8];
        for dir in Direction::all() {
            let axis = dir.axis();
            let target = step(coord[axis.index()], size[axis.index()], dir.sense());
            neighbors[dir.index()].coords = Self::coords_at(request.axes.get(axis), target, request)?;
        }

        Ok(RankTopology {
            coord,
            size,
            neighbors,
        })
    }
}

/// Which sense of `axis` leads from `from` to `to`, if they are ring neighbours
pub fn sense_between(from: usize, to: usize, len: usize) -> Option<Sense> {
    if step(from, len, Sense::Positive) == to {
        Some(Sense::Positive)
    } else if step(from, len, Sense::Negative) == to {
        Some(Sense::Negative)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::{build_qx, build_qz};
    use crate::gather::build_qt;
    use crate::geometry::PhysicalAxis;
    use crate::open_axis::build_qy;

    fn axes() -> FoldAxes {
        FoldAxes {
            x: build_qx().unwrap(),
            y: build_qy(2).unwrap(),
            z: build_qz().unwrap(),
            t: build_qt(vec![0, 1, 2, 0, 1, 2], vec![0, 0, 0, 1, 1, 1]).unwrap(),
        }
    }

    fn bounds() -> MeshBounds {
        MeshBounds::from_origin_and_size(
            PhysicalCoordinate::new([0, 0, 0, 0, 0, 0]),
            PhysicalCoordinate::new([24, 2, 6, 2, 3, 2]),
        )
    }

    fn request<'a>(
        coords: [u8; 6],
        bounds: &'a MeshBounds,
        map: &'a AxisMap,
        axes: &'a FoldAxes,
    ) -> ResolveRequest<'a> {
        ResolveRequest {
            rank: 5,
            coords: PhysicalCoordinate::new(coords),
            bounds,
            axis_map: map,
            axes,
            ranks_per_node: 4,
        }
    }

    #[test]
    fn test_resolve_origin() {
        let (axes, bounds, map) = (axes(), bounds(), AxisMap::default());
        let topo = FoldResolver
            .resolve(&request([0, 0, 0, 0, 0, 0], &bounds, &map, &axes))
            .unwrap();
        assert_eq!(topo.coord, [0, 0, 0, 0]);
        assert_eq!(topo.size, [6, 4, 24, 6]);
        assert!(topo.neighbors.iter().all(|n| n.rank_in_node == 1));
    }

    #[test]
    fn test_resolve_interior_position() {
        let (axes, bounds, map) = (axes(), bounds(), AxisMap::default());
        // x=5 -> QZ 5; y=1,b=2 -> QT 5; z=3+2 (zd=1, zc=2), a=1 -> QX 3; c=1 -> QY 2
        let topo = FoldResolver
            .resolve(&request([5, 1, 5, 1, 2, 1], &bounds, &map, &axes))
            .unwrap();
        assert_eq!(topo.coord(LogicalAxis::X), 3);
        assert_eq!(topo.coord(LogicalAxis::Y), 2);
        assert_eq!(topo.coord(LogicalAxis::Z), 5);
        assert_eq!(topo.coord(LogicalAxis::T), 5);
    }

    #[test]
    fn test_neighbors_step_one_position() {
        let (axes, bounds, map) = (axes(), bounds(), AxisMap::default());
        let topo = FoldResolver
            .resolve(&request([23, 0, 0, 0, 0, 0], &bounds, &map, &axes))
            .unwrap();
        // QZ wraps 23 -> 0
        assert_eq!(topo.neighbor(Direction::PosZ).coords.get(PhysicalAxis::X, &map), 0);
        assert_eq!(topo.neighbor(Direction::NegZ).coords.get(PhysicalAxis::X, &map), 22);
        // QX from (TA=0, TZc=0): + goes to (1, 0), - goes to (0, 1)
        let pos_x = topo.neighbor(Direction::PosX).coords;
        assert_eq!(pos_x.get(PhysicalAxis::A, &map), 1);
        assert_eq!(pos_x.get(PhysicalAxis::Z, &map), 0);
        let neg_x = topo.neighbor(Direction::NegX).coords;
        assert_eq!(neg_x.get(PhysicalAxis::A, &map), 0);
        assert_eq!(neg_x.get(PhysicalAxis::Z, &map), 1);
        // QT from (TB=0, TY=0): - wraps to (2, 1)
        let neg_t = topo.neighbor(Direction::NegT).coords;
        assert_eq!(neg_t.get(PhysicalAxis::B, &map), 2);
        assert_eq!(neg_t.get(PhysicalAxis::Y, &map), 1);
    }

    #[test]
    fn test_every_neighbor_resolves_back() {
        let (axes, bounds, map) = (axes(), bounds(), AxisMap::default());
        let topo = FoldResolver
            .resolve(&request([7, 1, 4, 1, 1, 0], &bounds, &map, &axes))
            .unwrap();
        for dir in Direction::all() {
            let n = topo.neighbor(dir);
            let back = FoldResolver
                .resolve(&request(n.coords.0, &bounds, &map, &axes))
                .unwrap();
            let axis = dir.axis();
            assert_eq!(
                sense_between(topo.coord(axis), back.coord(axis), topo.size(axis)),
                Some(dir.sense()),
                "{}",
                dir
            );
        }
    }

    #[test]
    fn test_out_of_bounds_status() {
        let (axes, bounds, map) = (axes(), bounds(), AxisMap::default());
        let err = FoldResolver
            .resolve(&request([24, 0, 0, 0, 0, 0], &bounds, &map, &axes))
            .unwrap_err();
        assert_eq!(err, ResolveStatus::OUT_OF_BOUNDS);
    }

    #[test]
    fn test_unmatched_position_status() {
        let (axes, bounds, map) = (axes(), bounds(), AxisMap::default());
        let mut t = axes.clone();
        t.t = build_qt(vec![0, 1], vec![0, 0]).unwrap();
        let err = FoldResolver
            .resolve(&request([0, 1, 0, 0, 0, 0], &bounds, &map, &t))
            .unwrap_err();
        assert_eq!(err, ResolveStatus::NO_POSITION);
    }
}
