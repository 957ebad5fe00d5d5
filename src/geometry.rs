//! Physical Tofu mesh geometry
//!
//! A Tofu coordinate has six components, one per physical axis. The job
//! occupies a rectangular sub-mesh described by an origin, a size and
//! inclusive min/max vectors. Which of the six slots carries which physical
//! axis is described by an [`AxisMap`].
//!
//! The fold tables do not speak in raw coordinates. They speak in
//! [`SubAxis`] states: offsets from the origin along one physical axis, with
//! the Z axis split into a phase (offset mod 3) and a depth (offset div 3)
//! and the B axis taken modulo 3.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of components in a physical coordinate
pub const PHYSICAL_DIMS: usize = 6;

/// Period of the B axis and of the Z phase
pub const PHASE_PERIOD: i32 = 3;

/// One of the six physical mesh axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalAxis {
    A,
    B,
    C,
    X,
    Y,
    Z,
}

impl PhysicalAxis {
    pub fn all() -> [PhysicalAxis; 6] {
        [
            PhysicalAxis::A,
            PhysicalAxis::B,
            PhysicalAxis::C,
            PhysicalAxis::X,
            PhysicalAxis::Y,
            PhysicalAxis::Z,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PhysicalAxis::A => "A",
            PhysicalAxis::B => "B",
            PhysicalAxis::C => "C",
            PhysicalAxis::X => "X",
            PhysicalAxis::Y => "Y",
            PhysicalAxis::Z => "Z",
        }
    }
}

/// Slot of each physical axis inside a 6-component coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMap {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl Default for AxisMap {
    fn default() -> Self {
        Self {
            x: 0,
            y: 1,
            z: 2,
            a: 3,
            b: 4,
            c: 5,
        }
    }
}

impl AxisMap {
    /// Slot holding the given physical axis
    #[inline]
    pub fn slot(&self, axis: PhysicalAxis) -> usize {
        match axis {
            PhysicalAxis::A => self.a,
            PhysicalAxis::B => self.b,
            PhysicalAxis::C => self.c,
            PhysicalAxis::X => self.x,
            PhysicalAxis::Y => self.y,
            PhysicalAxis::Z => self.z,
        }
    }

    /// True when every slot 0..6 is used exactly once
    pub fn is_permutation(&self) -> bool {
        let mut seen = [false; PHYSICAL_DIMS];
        for axis in PhysicalAxis::all() {
            let slot = self.slot(axis);
            if slot >= PHYSICAL_DIMS || seen[slot] {
                return false;
            }
            seen[slot] = true;
        }
        true
    }
}

/// Raw coordinate of a process in the physical mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PhysicalCoordinate(pub [u8; PHYSICAL_DIMS]);

impl PhysicalCoordinate {
    pub fn new(components: [u8; PHYSICAL_DIMS]) -> Self {
        Self(components)
    }

    #[inline]
    pub fn get(&self, axis: PhysicalAxis, map: &AxisMap) -> u8 {
        self.0[map.slot(axis)]
    }

    #[inline]
    pub fn set(&mut self, axis: PhysicalAxis, map: &AxisMap, value: u8) {
        self.0[map.slot(axis)] = value;
    }

    /// Signed offset from `origin` along `axis`
    #[inline]
    pub fn offset(&self, origin: &PhysicalCoordinate, axis: PhysicalAxis, map: &AxisMap) -> i32 {
        self.get(axis, map) as i32 - origin.get(axis, map) as i32
    }
}

impl fmt::Display for PhysicalCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.0;
        write!(f, "{} {} {} {} {} {}", c[0], c[1], c[2], c[3], c[4], c[5])
    }
}

/// The rectangular sub-mesh a job runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshBounds {
    pub origin: PhysicalCoordinate,
    pub size: PhysicalCoordinate,
    pub min: PhysicalCoordinate,
    pub max: PhysicalCoordinate,
}

impl MeshBounds {
    /// Bounds of a sub-mesh starting at `origin` with extent `size`
    pub fn from_origin_and_size(origin: PhysicalCoordinate, size: PhysicalCoordinate) -> Self {
        let mut max = origin;
        for i in 0..PHYSICAL_DIMS {
            max.0[i] = origin.0[i].saturating_add(size.0[i].saturating_sub(1));
        }
        Self {
            origin,
            size,
            min: origin,
            max,
        }
    }

    #[inline]
    pub fn extent(&self, axis: PhysicalAxis, map: &AxisMap) -> usize {
        self.size.get(axis, map) as usize
    }

    /// Whether `coords` lies inside the inclusive min/max box
    pub fn contains(&self, coords: &PhysicalCoordinate) -> bool {
        (0..PHYSICAL_DIMS).all(|i| self.min.0[i] <= coords.0[i] && coords.0[i] <= self.max.0[i])
    }
}

/// A physical sub-axis state tracked by a fold table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubAxis {
    /// Offset along A
    A,
    /// Offset along B, modulo 3
    B,
    /// Offset along C
    C,
    /// Offset along X
    X,
    /// Offset along Y (open, not periodic)
    Y,
    /// Offset along Z modulo 3
    ZPhase,
    /// Offset along Z divided by 3
    ZDepth,
}

impl SubAxis {
    /// All sub-axes in diagnostic order
    pub fn all() -> [SubAxis; 7] {
        [
            SubAxis::A,
            SubAxis::B,
            SubAxis::C,
            SubAxis::X,
            SubAxis::Y,
            SubAxis::ZPhase,
            SubAxis::ZDepth,
        ]
    }

    pub fn physical(&self) -> PhysicalAxis {
        match self {
            SubAxis::A => PhysicalAxis::A,
            SubAxis::B => PhysicalAxis::B,
            SubAxis::C => PhysicalAxis::C,
            SubAxis::X => PhysicalAxis::X,
            SubAxis::Y => PhysicalAxis::Y,
            SubAxis::ZPhase | SubAxis::ZDepth => PhysicalAxis::Z,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SubAxis::A => "TA",
            SubAxis::B => "TB",
            SubAxis::C => "TC",
            SubAxis::X => "TX",
            SubAxis::Y => "TY",
            SubAxis::ZPhase => "TZc",
            SubAxis::ZDepth => "TZd",
        }
    }

    /// State of this sub-axis at `coords`
    pub fn read(&self, coords: &PhysicalCoordinate, origin: &PhysicalCoordinate, map: &AxisMap) -> i32 {
        let offset = coords.offset(origin, self.physical(), map);
        match self {
            SubAxis::B | SubAxis::ZPhase => offset.rem_euclid(PHASE_PERIOD),
            SubAxis::ZDepth => offset.div_euclid(PHASE_PERIOD),
            _ => offset,
        }
    }

    /// Rewrite `coords` so that this sub-axis reads `value`.
    ///
    /// The other half of a split Z axis is preserved. Returns `None` when the
    /// resulting component does not fit a coordinate byte.
    pub fn write(
        &self,
        coords: &mut PhysicalCoordinate,
        origin: &PhysicalCoordinate,
        map: &AxisMap,
        value: i32,
    ) -> Option<()> {
        let axis = self.physical();
        let org = origin.get(axis, map) as i32;
        let offset = coords.offset(origin, axis, map);
        let raw = match self {
            SubAxis::B => (org + value).rem_euclid(PHASE_PERIOD),
            SubAxis::ZPhase => org + offset.div_euclid(PHASE_PERIOD) * PHASE_PERIOD + value,
            SubAxis::ZDepth => org + value * PHASE_PERIOD + offset.rem_euclid(PHASE_PERIOD),
            _ => org + value,
        };
        let raw = u8::try_from(raw).ok()?;
        coords.set(axis, map, raw);
        Some(())
    }
}

impl fmt::Display for SubAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_axis_map_is_permutation() {
        assert!(AxisMap::default().is_permutation());
        let broken = AxisMap {
            y: 0,
            ..AxisMap::default()
        };
        assert!(!broken.is_permutation());
    }

    #[test]
    fn test_z_split_read_write() {
        let map = AxisMap::default();
        let origin = PhysicalCoordinate::new([0, 0, 2, 0, 0, 0]);
        let mut coords = PhysicalCoordinate::new([0, 0, 2 + 7, 0, 0, 0]);

        assert_eq!(SubAxis::ZPhase.read(&coords, &origin, &map), 1);
        assert_eq!(SubAxis::ZDepth.read(&coords, &origin, &map), 2);

        SubAxis::ZPhase.write(&mut coords, &origin, &map, 2).unwrap();
        assert_eq!(coords.get(PhysicalAxis::Z, &map), 2 + 8);
        SubAxis::ZDepth.write(&mut coords, &origin, &map, 0).unwrap();
        assert_eq!(coords.get(PhysicalAxis::Z, &map), 2 + 2);
    }

    #[test]
    fn test_b_is_periodic() {
        let map = AxisMap::default();
        let origin = PhysicalCoordinate::new([0, 0, 0, 0, 1, 0]);
        let mut coords = origin;
        SubAxis::B.write(&mut coords, &origin, &map, 2).unwrap();
        assert_eq!(coords.get(PhysicalAxis::B, &map), 0);
        assert_eq!(SubAxis::B.read(&coords, &origin, &map), 2);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = MeshBounds::from_origin_and_size(
            PhysicalCoordinate::new([1, 0, 0, 0, 0, 0]),
            PhysicalCoordinate::new([24, 4, 6, 2, 3, 2]),
        );
        assert!(bounds.contains(&PhysicalCoordinate::new([24, 3, 5, 1, 2, 1])));
        assert!(!bounds.contains(&PhysicalCoordinate::new([0, 0, 0, 0, 0, 0])));
        assert!(!bounds.contains(&PhysicalCoordinate::new([1, 4, 0, 0, 0, 0])));
    }

    #[test]
    fn test_write_rejects_negative_component() {
        let map = AxisMap::default();
        let origin = PhysicalCoordinate::default();
        let mut coords = origin;
        assert!(SubAxis::X.write(&mut coords, &origin, &map, -1).is_none());
    }
}
