//! Two-phase MRC import: header first, payload on demand.
//!
//! [`MrcReader`] caches the parsed header and the decoded volume, so
//! repeated requests never touch the file again after the first success.
//! A failed request leaves nothing cached and may be retried.

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::endian::swap_in_place;
use crate::error::{Error, Result};
use crate::file::{read_chunked, VolumeFile, DEFAULT_CHUNK_SIZE};
use crate::geometry::Geometry;
use crate::header::{read_header, MrcHeader, HEADER_LEN};
use crate::mode::PixelMode;
use crate::volume::{payload_len, VolumeBuffer};

/// Tuning for payload reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Largest number of bytes requested from the OS in one read call.
    pub chunk_size: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Everything known about a file after reading its header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    pub header: MrcHeader,
    pub mode: PixelMode,
    pub geometry: Geometry,
}

impl HeaderInfo {
    /// Validate the element type and resolve the axis mapping.
    pub fn from_header(header: MrcHeader) -> Result<Self> {
        let mode = PixelMode::from_code(header.mode)?;
        let geometry = Geometry::from_header(&header)?;
        Ok(HeaderInfo {
            header,
            mode,
            geometry,
        })
    }

    /// Number of payload bytes the geometry implies.
    pub fn payload_len(&self) -> Result<u64> {
        payload_len(self.mode, &self.geometry)
    }
}

/// Reader for a single MRC file.
#[derive(Debug)]
pub struct MrcReader {
    path: PathBuf,
    options: ReadOptions,
    info: Option<HeaderInfo>,
    volume: Option<Arc<VolumeBuffer>>,
}

impl MrcReader {
    /// Reader for `path` with default [`ReadOptions`]. Nothing is read yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_options(path, ReadOptions::default())
    }

    /// Reader for `path` using `options` for payload reads.
    pub fn with_options<P: AsRef<Path>>(path: P, options: ReadOptions) -> Self {
        MrcReader {
            path: path.as_ref().to_path_buf(),
            options,
            info: None,
            volume: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// The cached header, if [`read_header`](Self::read_header) has succeeded.
    pub fn header_info(&self) -> Option<&HeaderInfo> {
        self.info.as_ref()
    }

    pub fn is_header_read(&self) -> bool {
        self.info.is_some()
    }

    pub fn is_data_read(&self) -> bool {
        self.volume.is_some()
    }

    /// Parse the header, or return the cached result.
    pub fn read_header(&mut self) -> Result<&HeaderInfo> {
        let info = match self.info.take() {
            Some(info) => info,
            None => {
                let info = HeaderInfo::from_header(read_header(&self.path)?)?;
                let g = &info.geometry;
                log::debug!(
                    "{}: mode={} dims={:?} spacing={:?} origin={:?}",
                    self.path.display(),
                    info.mode,
                    g.dims,
                    g.spacing,
                    g.origin
                );
                info
            }
        };
        Ok(self.info.insert(info))
    }

    /// Read the full volume, parsing the header first if needed. Returns the
    /// cached volume on repeated calls.
    pub fn read_data(&mut self) -> Result<Arc<VolumeBuffer>> {
        if let Some(volume) = &self.volume {
            return Ok(Arc::clone(volume));
        }
        let path = self.path.clone();
        let options = self.options;
        let info = self
            .read_header()
            .map_err(|e| Error::Header(Box::new(e)))?;
        let volume = Arc::new(read_volume(&path, info, &options)?);
        self.volume = Some(Arc::clone(&volume));
        Ok(volume)
    }
}

/// Open the file at `path` and read the payload described by `info`.
///
/// The file handle is released before returning.
pub fn read_volume<P: AsRef<Path>>(
    path: P,
    info: &HeaderInfo,
    options: &ReadOptions,
) -> Result<VolumeBuffer> {
    let mut file = VolumeFile::open(path.as_ref())?;
    let len = file.len();
    read_payload(&mut file, len, info, options)
}

/// Read the payload described by `info` from any seekable source whose
/// first byte is the start of the header.
pub fn read_volume_from<R: Read + Seek>(
    source: &mut R,
    info: &HeaderInfo,
    options: &ReadOptions,
) -> Result<VolumeBuffer> {
    let len = source.seek(SeekFrom::End(0))?;
    read_payload(source, len, info, options)
}

fn read_payload<R: Read + Seek>(
    source: &mut R,
    len: u64,
    info: &HeaderInfo,
    options: &ReadOptions,
) -> Result<VolumeBuffer> {
    let expected = info.payload_len()?;
    let header_len = HEADER_LEN as u64;
    let available = len.saturating_sub(header_len);
    if len < header_len || available < expected {
        return Err(Error::Truncated {
            expected,
            available,
        });
    }

    let alloc_err = || Error::Allocation { bytes: expected };
    let size = usize::try_from(expected).map_err(|_| alloc_err())?;
    let mut data = Vec::new();
    data.try_reserve_exact(size).map_err(|_| alloc_err())?;
    data.resize(size, 0u8);

    log::trace!("reading {expected} payload bytes in chunks of {}", options.chunk_size);
    source.seek(SeekFrom::Start(header_len))?;
    read_chunked(source, &mut data, options.chunk_size)?;

    if info.header.needs_byte_swap() {
        swap_in_place(&mut data, info.mode.element_size());
    }

    VolumeBuffer::from_bytes(info.mode, info.geometry, data)
}
