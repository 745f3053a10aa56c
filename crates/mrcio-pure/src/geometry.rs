//! Canonical volume geometry derived from the header's axis mapping.
//!
//! MRC stores voxels column-fastest, then row, then section. The header's
//! `mapc`, `mapr` and `maps` selectors say which native axis (X=1, Y=2,
//! Z=3) plays each of those roles. [`AxisMap`] holds that lookup table and
//! [`Geometry::from_header`] resolves every role through it.

use crate::error::{Error, Result};
use crate::header::MrcHeader;

/// Role of an output axis in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRole {
    /// Fastest-varying axis (`mapc`).
    Column,
    /// Medium axis (`mapr`).
    Row,
    /// Slowest-varying axis (`maps`).
    Section,
}

impl AxisRole {
    pub const ALL: [AxisRole; 3] = [AxisRole::Column, AxisRole::Row, AxisRole::Section];

    /// Index of this role in `dims`, `spacing` and `origin`.
    pub fn index(self) -> usize {
        match self {
            AxisRole::Column => 0,
            AxisRole::Row => 1,
            AxisRole::Section => 2,
        }
    }

    /// Name of the header field holding this role's selector.
    pub fn selector_name(self) -> &'static str {
        match self {
            AxisRole::Column => "mapc",
            AxisRole::Row => "mapr",
            AxisRole::Section => "maps",
        }
    }
}

impl core::fmt::Display for AxisRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            AxisRole::Column => "column",
            AxisRole::Row => "row",
            AxisRole::Section => "section",
        })
    }
}

/// A native storage axis of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeAxis {
    X,
    Y,
    Z,
}

impl NativeAxis {
    /// Convert a 1-based selector value. Returns `None` outside `1..=3`.
    pub fn from_selector(value: i32) -> Option<Self> {
        match value {
            1 => Some(NativeAxis::X),
            2 => Some(NativeAxis::Y),
            3 => Some(NativeAxis::Z),
            _ => None,
        }
    }

    /// Zero-based index into the header's per-axis arrays.
    pub fn index(self) -> usize {
        match self {
            NativeAxis::X => 0,
            NativeAxis::Y => 1,
            NativeAxis::Z => 2,
        }
    }
}

/// Lookup table from output role to native axis.
///
/// Each role is validated on its own. The three selectors are not required
/// to be distinct, so a map may send several roles to the same native axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMap {
    axes: [NativeAxis; 3],
}

impl AxisMap {
    /// The identity mapping (`mapc=1, mapr=2, maps=3`).
    pub const IDENTITY: AxisMap = AxisMap {
        axes: [NativeAxis::X, NativeAxis::Y, NativeAxis::Z],
    };

    /// Build a map from the raw `mapc`, `mapr`, `maps` selector values.
    pub fn from_selectors(selectors: [i32; 3]) -> Result<Self> {
        let mut axes = [NativeAxis::X; 3];
        for role in AxisRole::ALL {
            let value = selectors[role.index()];
            axes[role.index()] =
                NativeAxis::from_selector(value).ok_or(Error::InvalidAxisMapping { role, value })?;
        }
        Ok(AxisMap { axes })
    }

    /// The native axis playing `role`.
    pub fn native(&self, role: AxisRole) -> NativeAxis {
        self.axes[role.index()]
    }

    /// Whether every native axis is used exactly once.
    pub fn is_permutation(&self) -> bool {
        let [a, b, c] = self.axes;
        a != b && b != c && a != c
    }
}

/// Where sample positions sit within a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Centering {
    /// Samples are voxel centers.
    Cell,
    /// Samples are voxel corners.
    Node,
}

/// Dimensions, spacing and origin in output axis order (column, row,
/// section). Describes an axis-aligned affine transform with no shear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Voxel counts, all strictly positive.
    pub dims: [usize; 3],
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
}

impl Geometry {
    /// Resolve the header's axis selectors into a canonical geometry.
    pub fn from_header(header: &MrcHeader) -> Result<Self> {
        let map = AxisMap::from_selectors(header.axis_selectors)?;
        let new_origin = header.uses_new_origin();

        let mut geometry = Geometry {
            dims: [0; 3],
            spacing: [0.0; 3],
            origin: [0.0; 3],
        };
        for role in AxisRole::ALL {
            let axis = header.native_axis(map.native(role));
            if axis.extent <= 0 {
                return Err(Error::InvalidDimension {
                    role,
                    value: axis.extent,
                });
            }
            let i = role.index();
            geometry.dims[i] = axis.extent as usize;
            geometry.spacing[i] = axis.spacing;
            geometry.origin[i] = if new_origin {
                f64::from(axis.origin)
            } else {
                f64::from(axis.start)
            };
        }
        Ok(geometry)
    }

    /// Sample convention of MRC volumes; always cell-centered.
    pub fn centering(&self) -> Centering {
        Centering::Cell
    }

    /// Total number of voxels, or `None` on overflow.
    pub fn voxel_count(&self) -> Option<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// World position of voxel `[i, j, k]`.
    pub fn position(&self, index: [usize; 3]) -> [f64; 3] {
        let mut p = self.origin;
        for (axis, coord) in p.iter_mut().enumerate() {
            *coord += index[axis] as f64 * self.spacing[axis];
        }
        p
    }

    /// Row-major 4x4 affine matrix mapping voxel index to world position.
    pub fn transform(&self) -> [[f64; 4]; 4] {
        let [sx, sy, sz] = self.spacing;
        let [ox, oy, oz] = self.origin;
        [
            [sx, 0.0, 0.0, ox],
            [0.0, sy, 0.0, oy],
            [0.0, 0.0, sz, oz],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }
}
