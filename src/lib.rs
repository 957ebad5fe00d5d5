//! # Tofu Open-Y Rank Mapping
//!
//! Places every process of a job on a logical 4D torus (X, Y, Z, T) from its
//! coordinate in the 6D Tofu mesh, and picks the transmission engine (TNI)
//! to use towards each of its 8 logical neighbours.
//!
//! The physical Y axis of the job is open while the application needs a
//! periodic torus, so the logical axes are folded out of the physical ones:
//!
//! ```text
//!   logical   physical sub-axes          length
//!   ───────   ───────────────────────    ─────────────────────────────
//!   QX        TA x TZc (hexagon)         6
//!   QY        TC x TZd (open, folded)    2 x (Z extent / 3)
//!   QZ        TX (torus)                 24
//!   QT        TB x TY (system topology)  reported by the scheduler, <= 64
//! ```
//!
//! ## Flow
//!
//! ```text
//!   build QX, QZ ──┐
//!   fold QY ───────┼──> FoldAxes ──> NeighborResolver ──> logical coord
//!   gather QT ─────┘                                          │
//!   (all-reduce)                                              v
//!                                                 TniList (+X -X +Y -Y +Z -Z +T -T)
//! ```

pub mod collective;
pub mod config;
pub mod diagnostics;
pub mod direction;
pub mod error;
pub mod fold;
pub mod gather;
pub mod geometry;
pub mod mapper;
pub mod open_axis;
pub mod periodic;
pub mod resolver;
pub mod simulation;
pub mod tni;
pub mod topology;


pub use collective::{Collective, CollectiveError, GroupMember, LocalGroup, SingleProcess};
pub use config::RankMapConfig;
pub use direction::{Direction, LogicalAxis, Sense};
pub use error::RankMapError;
pub use fold::{FoldAxes, FoldAxis, FoldTable, SubAxisTrack, Tni};
pub use geometry::{AxisMap, MeshBounds, PhysicalAxis, PhysicalCoordinate, SubAxis};
pub use mapper::{build_fold_axes, map_open_y_topology, ProcessContext, RankMap, TopologyId};
pub use resolver::{FoldResolver, Neighbor, NeighborResolver, RankTopology, ResolveRequest, ResolveStatus};
pub use simulation::SimulatedJob;
pub use tni::{resolve_tni_list, TniList};
pub use topology::{SystemTopology, TopologyQueryError};

/// Result type for rank mapping operations
pub type RankMapResult<T> = Result<T, RankMapError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        // Mapping entry points
        map_open_y_topology,
        ProcessContext,
        RankMap,
        RankMapConfig,

        // Collaborator seams
        Collective,
        NeighborResolver,
        SystemTopology,
        FoldResolver,

        // Tables and results
        Direction,
        FoldAxes,
        Tni,
        TniList,

        // Result type
        RankMapResult,
        RankMapError,
    };
}
