//! Decoded voxel payloads.

use bytemuck::pod_collect_to_vec;

use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::mode::PixelMode;

/// Voxel values converted to their element type.
#[derive(Debug, Clone, PartialEq)]
pub enum VoxelData {
    I8(Vec<i8>),
    I16(Vec<i16>),
    F32(Vec<f32>),
}

impl VoxelData {
    pub fn mode(&self) -> PixelMode {
        match self {
            VoxelData::I8(_) => PixelMode::I8,
            VoxelData::I16(_) => PixelMode::I16,
            VoxelData::F32(_) => PixelMode::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VoxelData::I8(v) => v.len(),
            VoxelData::I16(v) => v.len(),
            VoxelData::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A host-endian voxel payload together with its element type and geometry.
///
/// Voxels are stored column-fastest, then row, then section, matching the
/// order of `geometry.dims`.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeBuffer {
    mode: PixelMode,
    geometry: Geometry,
    data: Vec<u8>,
}

impl VolumeBuffer {
    /// Wrap host-endian `data`. Its length must be exactly
    /// `voxel_count * element_size`.
    pub fn from_bytes(mode: PixelMode, geometry: Geometry, data: Vec<u8>) -> Result<Self> {
        let expected = payload_len(mode, &geometry)?;
        if data.len() as u64 != expected {
            return Err(Error::Truncated {
                expected,
                available: data.len() as u64,
            });
        }
        Ok(VolumeBuffer {
            mode,
            geometry,
            data,
        })
    }

    pub fn mode(&self) -> PixelMode {
        self.mode
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Raw host-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Number of voxels.
    pub fn len(&self) -> usize {
        self.data.len() / self.mode.element_size()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Copy the payload into a typed vector.
    pub fn to_voxels(&self) -> VoxelData {
        match self.mode {
            PixelMode::I8 => VoxelData::I8(pod_collect_to_vec(self.as_bytes())),
            PixelMode::I16 => VoxelData::I16(pod_collect_to_vec(self.as_bytes())),
            PixelMode::F32 => VoxelData::F32(pod_collect_to_vec(self.as_bytes())),
        }
    }

    /// Copy the payload into `f32`, widening integer modes.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self.to_voxels() {
            VoxelData::I8(v) => v.into_iter().map(f32::from).collect(),
            VoxelData::I16(v) => v.into_iter().map(f32::from).collect(),
            VoxelData::F32(v) => v,
        }
    }

    /// Value of voxel `[column, row, section]`, or `None` when out of range.
    pub fn voxel(&self, index: [usize; 3]) -> Option<f64> {
        let [nx, ny, nz] = self.geometry.dims;
        let [i, j, k] = index;
        if i >= nx || j >= ny || k >= nz {
            return None;
        }
        let size = self.mode.element_size();
        let offset = (i + nx * (j + ny * k)) * size;
        let raw = &self.data[offset..offset + size];
        Some(match self.mode {
            PixelMode::I8 => f64::from(raw[0] as i8),
            PixelMode::I16 => f64::from(i16::from_ne_bytes([raw[0], raw[1]])),
            PixelMode::F32 => f64::from(f32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]])),
        })
    }
}

/// Payload length in bytes for `geometry` at `mode`.
///
/// Fails with [`Error::Allocation`] if the size does not fit in memory.
pub fn payload_len(mode: PixelMode, geometry: &Geometry) -> Result<u64> {
    let too_large = || Error::Allocation { bytes: u64::MAX };
    let bytes = geometry
        .voxel_count()
        .and_then(|n| n.checked_mul(mode.element_size()))
        .ok_or_else(too_large)?;
    Ok(bytes as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(dims: [usize; 3]) -> Geometry {
        Geometry {
            dims,
            spacing: [1.0; 3],
            origin: [0.0; 3],
        }
    }

    fn ne_bytes_f32(vals: &[f32]) -> Vec<u8> {
        vals.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    #[test]
    fn from_bytes_checks_length() {
        let err = VolumeBuffer::from_bytes(PixelMode::I16, geometry([2, 2, 2]), vec![0; 15])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Truncated {
                expected: 16,
                available: 15,
            }
        ));
    }

    #[test]
    fn typed_views() {
        let vals = [1.0f32, -2.5, 3.25, 0.0];
        let buf =
            VolumeBuffer::from_bytes(PixelMode::F32, geometry([2, 2, 1]), ne_bytes_f32(&vals))
                .unwrap();
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.byte_len(), 16);
        assert_eq!(buf.to_voxels(), VoxelData::F32(vals.to_vec()));
        assert_eq!(buf.to_f32_vec(), vals.to_vec());
    }

    #[test]
    fn signed_bytes_widen() {
        let buf =
            VolumeBuffer::from_bytes(PixelMode::I8, geometry([3, 1, 1]), vec![0xFF, 0x7F, 0x80])
                .unwrap();
        assert_eq!(buf.to_voxels(), VoxelData::I8(vec![-1, 127, -128]));
        assert_eq!(buf.to_f32_vec(), vec![-1.0, 127.0, -128.0]);
    }

    #[test]
    fn voxel_indexing_is_column_fastest() {
        let vals: Vec<i16> = (0..24).collect();
        let bytes: Vec<u8> = vals.iter().flat_map(|v| v.to_ne_bytes()).collect();
        let buf = VolumeBuffer::from_bytes(PixelMode::I16, geometry([2, 3, 4]), bytes).unwrap();
        assert_eq!(buf.voxel([0, 0, 0]), Some(0.0));
        assert_eq!(buf.voxel([1, 0, 0]), Some(1.0));
        assert_eq!(buf.voxel([0, 1, 0]), Some(2.0));
        assert_eq!(buf.voxel([0, 0, 1]), Some(6.0));
        assert_eq!(buf.voxel([1, 2, 3]), Some(23.0));
        assert_eq!(buf.voxel([2, 0, 0]), None);
        let data = buf.to_voxels();
        assert_eq!(data.mode(), PixelMode::I16);
        assert_eq!(data.len(), 24);
    }

    #[test]
    fn payload_len_overflow_is_allocation_error() {
        let g = geometry([usize::MAX / 2, 1, 1]);
        assert!(matches!(
            payload_len(PixelMode::F32, &g),
            Err(Error::Allocation { .. })
        ));
        assert_eq!(payload_len(PixelMode::F32, &geometry([4, 4, 4])).unwrap(), 256);
    }
}
