//! Pure Rust reader for MRC volume files.
//!
//! An MRC file is a fixed 1024-byte header followed by a raw voxel payload.
//! [`MrcReader`] parses the header into a calibrated [`Geometry`] and streams
//! the payload into a host-endian [`VolumeBuffer`].

pub mod endian;
pub mod error;
pub mod file;
pub mod geometry;
pub mod header;
pub mod mode;
pub mod reader;
pub mod volume;

#[cfg(feature = "array")]
pub mod array;

pub use endian::ByteOrder;
pub use error::{Error, Result};
pub use geometry::{AxisMap, AxisRole, Centering, Geometry, NativeAxis};
pub use header::{MrcHeader, HEADER_LEN};
pub use mode::PixelMode;
pub use reader::{HeaderInfo, MrcReader, ReadOptions};
pub use volume::{VolumeBuffer, VoxelData};
