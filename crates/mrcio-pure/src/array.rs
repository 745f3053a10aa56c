//! `ndarray` views of decoded volumes.
//!
//! Arrays use standard (C) layout with shape `[section, row, column]`, so
//! the last index varies fastest, matching the payload order.

use ndarray::Array3;

use crate::error::Result;
use crate::volume::{VolumeBuffer, VoxelData};

/// A volume as a typed three-dimensional array.
#[derive(Debug, Clone, PartialEq)]
pub enum VoxelArray {
    I8(Array3<i8>),
    I16(Array3<i16>),
    F32(Array3<f32>),
}

impl VoxelArray {
    /// `[section, row, column]` extents.
    pub fn shape(&self) -> &[usize] {
        match self {
            VoxelArray::I8(a) => a.shape(),
            VoxelArray::I16(a) => a.shape(),
            VoxelArray::F32(a) => a.shape(),
        }
    }
}

/// Array shape for extents given as `[column, row, section]`.
fn array_shape(dims: [usize; 3]) -> (usize, usize, usize) {
    let [nc, nr, ns] = dims;
    (ns, nr, nc)
}

impl VoxelData {
    /// Move the voxels into an array for a volume of extents `dims`
    /// (`[column, row, section]`). Fails if the count does not match.
    pub fn into_array3(self, dims: [usize; 3]) -> Result<VoxelArray> {
        let shape = array_shape(dims);
        Ok(match self {
            VoxelData::I8(v) => VoxelArray::I8(Array3::from_shape_vec(shape, v)?),
            VoxelData::I16(v) => VoxelArray::I16(Array3::from_shape_vec(shape, v)?),
            VoxelData::F32(v) => VoxelArray::F32(Array3::from_shape_vec(shape, v)?),
        })
    }
}

impl VolumeBuffer {
    /// Copy the payload into an array of its own element type.
    pub fn to_array3(&self) -> Result<VoxelArray> {
        self.to_voxels().into_array3(self.geometry().dims)
    }

    /// Copy the payload into an `f32` array, widening integer modes.
    pub fn to_array3_f32(&self) -> Result<Array3<f32>> {
        Ok(Array3::from_shape_vec(
            array_shape(self.geometry().dims),
            self.to_f32_vec(),
        )?)
    }
}
