//! System topology service
//!
//! The job scheduler exposes a 3-dimensional logical view of the allocated
//! nodes. The rank mapping only uses its second axis, which lays out the
//! nodes of the TY x TB plane along a ring and becomes the logical T axis.

use crate::error::RankMapError;
use crate::RankMapResult;
use thiserror::Error;

/// Axis of the system topology that carries the logical T position
pub const T_SOURCE_AXIS: usize = 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("topology service returned code {code}")]
pub struct TopologyQueryError {
    pub code: i32,
}

/// Query interface of the scheduler's logical topology
pub trait SystemTopology {
    /// Number of dimensions of the logical topology
    fn dimension(&self) -> Result<usize, TopologyQueryError>;

    /// Extent of each of the three logical axes
    fn shape(&self) -> Result<[usize; 3], TopologyQueryError>;

    /// Logical coordinate of `rank`
    fn coords(&self, rank: usize) -> Result<[usize; 3], TopologyQueryError>;
}

/// T extent reported by the service, checked against `expected_dim` and `max`
pub fn query_t_extent<S: SystemTopology + ?Sized>(
    topology: &S,
    expected_dim: usize,
    max: usize,
) -> RankMapResult<usize> {
    let dim = topology
        .dimension()
        .map_err(|source| RankMapError::TopologyQuery { call: "get_dimension", source })?;
    if dim != expected_dim {
        return Err(RankMapError::BadDimension {
            got: dim,
            expected: expected_dim,
        });
    }

    let shape = topology
        .shape()
        .map_err(|source| RankMapError::TopologyQuery { call: "get_shape", source })?;
    let size_t = shape[T_SOURCE_AXIS];
    if size_t > max {
        return Err(RankMapError::TAxisTooLarge { size: size_t, max });
    }
    Ok(size_t)
}

/// Logical T position of `rank`
pub fn query_this_t<S: SystemTopology + ?Sized>(topology: &S, rank: usize) -> RankMapResult<usize> {
    let coords = topology
        .coords(rank)
        .map_err(|source| RankMapError::TopologyQuery { call: "get_coords", source })?;
    Ok(coords[T_SOURCE_AXIS])
}
