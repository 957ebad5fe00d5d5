//! Configuration for the open-Y rank mapping

use crate::error::RankMapError;
use crate::geometry::AxisMap;
use crate::RankMapResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Protocol limit on the T extent reported by the topology service
pub const T_AXIS_MAX: usize = 64;

/// Dimension the topology service must report
pub const TOPOLOGY_DIMENSION: usize = 3;

/// Processes sharing one node
pub const RANKS_PER_NODE: usize = 4;

fn default_verify_contributions() -> bool {
    cfg!(debug_assertions)
}

/// Configuration for rank mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankMapConfig {
    /// Slot of each physical axis in a Tofu coordinate
    pub axis_map: AxisMap,
    /// Processes per node; the first of each node may contribute to the T gather
    pub ranks_per_node: usize,
    /// Largest T extent accepted from the topology service
    pub t_axis_max: usize,
    /// Dimension the topology service must report
    pub topology_dimension: usize,
    /// Rank that emits the diagnostic dump
    pub diagnostic_rank: usize,
    /// Count contributors per T position and reject duplicates
    #[serde(default = "default_verify_contributions")]
    pub verify_contributions: bool,
}

impl Default for RankMapConfig {
    fn default() -> Self {
        Self {
            axis_map: AxisMap::default(),
            ranks_per_node: RANKS_PER_NODE,
            t_axis_max: T_AXIS_MAX,
            topology_dimension: TOPOLOGY_DIMENSION,
            diagnostic_rank: 0,
            verify_contributions: default_verify_contributions(),
        }
    }
}

impl RankMapConfig {
    pub fn validate(&self) -> RankMapResult<()> {
        if !self.axis_map.is_permutation() {
            return Err(RankMapError::InvalidConfig(format!(
                "axis map must use each of the 6 coordinate slots once: {:?}",
                self.axis_map
            )));
        }
        if self.ranks_per_node == 0 {
            return Err(RankMapError::InvalidConfig("ranks_per_node must be positive".into()));
        }
        if self.t_axis_max == 0 {
            return Err(RankMapError::InvalidConfig("t_axis_max must be positive".into()));
        }
        Ok(())
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RankMapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RankMapConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> RankMapResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
