//! MRC header parsing and serialization.
//!
//! The header is a fixed 1024-byte block of 4-byte words followed by ten
//! 80-byte text labels. All words share one byte order, recorded by the
//! machine stamp at offset 212.

use std::io::Read;
use std::path::Path;

use crate::endian::{read_f32, read_i32, write_f32, write_i32, ByteOrder};
use crate::error::{Error, Result};
use crate::geometry::NativeAxis;
use crate::mode::PixelMode;

/// Length of the fixed header. The voxel payload starts at this offset.
pub const HEADER_LEN: usize = 1024;

/// Number of text labels in the header.
pub const NUM_LABELS: usize = 10;

/// Length of a single text label.
pub const LABEL_LEN: usize = 80;

/// Tag at offset 208 marking the MRC2000 origin convention.
pub const MAP_TAG: [u8; 4] = *b"MAP ";

const OFF_NX: usize = 0;
const OFF_MODE: usize = 12;
const OFF_NXSTART: usize = 16;
const OFF_MX: usize = 28;
const OFF_CELL: usize = 40;
const OFF_ANGLES: usize = 52;
const OFF_MAPC: usize = 64;
const OFF_DMIN: usize = 76;
const OFF_ISPG: usize = 88;
const OFF_NSYMBT: usize = 92;
const OFF_EXTRA: usize = 96;
const EXTRA_LEN: usize = 100;
const OFF_ORIGIN: usize = 196;
const OFF_MAP: usize = 208;
const OFF_MACHST: usize = 212;
const OFF_RMS: usize = 216;
const OFF_NLABL: usize = 220;
const OFF_LABELS: usize = 224;

/// Native description of one storage axis, before axis remapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisInfo {
    /// Number of samples along the axis (`nx`, `ny`, `nz`).
    pub extent: i32,
    /// Sampling along the axis (`mx`, `my`, `mz`).
    pub spacing: f64,
    /// First sample index (`nxstart`, `nystart`, `nzstart`).
    pub start: i32,
    /// MRC2000 origin (`xorigin`, `yorigin`, `zorigin`).
    pub origin: f32,
}

/// A parsed MRC header.
#[derive(Debug, Clone, PartialEq)]
pub struct MrcHeader {
    /// Extents of the native X, Y, Z axes.
    pub dims: [i32; 3],
    /// Raw element type code.
    pub mode: i32,
    /// Start offsets (`nxstart`, `nystart`, `nzstart`).
    pub start: [i32; 3],
    /// Grid sampling (`mx`, `my`, `mz`).
    pub sampling: [i32; 3],
    /// Cell dimensions in Ångström.
    pub cell_lengths: [f32; 3],
    /// Cell angles in degrees.
    pub cell_angles: [f32; 3],
    /// Axis selectors for column, row and section (`mapc`, `mapr`, `maps`).
    pub axis_selectors: [i32; 3],
    pub dmin: f32,
    pub dmax: f32,
    pub dmean: f32,
    /// Space group number.
    pub ispg: i32,
    /// Length of the extended header in bytes.
    pub nsymbt: i32,
    pub extra: [u8; EXTRA_LEN],
    /// MRC2000 origin (`xorigin`, `yorigin`, `zorigin`).
    pub origin: [f32; 3],
    pub map: [u8; 4],
    pub machine_stamp: [u8; 4],
    pub rms: f32,
    /// Number of labels in use.
    pub nlabl: i32,
    pub labels: [[u8; LABEL_LEN]; NUM_LABELS],
    /// Byte order of the header words and the payload.
    pub byte_order: ByteOrder,
}

impl MrcHeader {
    /// Create a header for a volume of the given extents and element type.
    ///
    /// Axes map identically (`mapc=1, mapr=2, maps=3`), sampling equals the
    /// extents, and the byte order is the host's.
    pub fn new(dims: [i32; 3], mode: PixelMode) -> Self {
        let order = ByteOrder::native();
        MrcHeader {
            dims,
            mode: mode.code(),
            start: [0; 3],
            sampling: dims,
            cell_lengths: [dims[0] as f32, dims[1] as f32, dims[2] as f32],
            cell_angles: [90.0; 3],
            axis_selectors: [1, 2, 3],
            dmin: 0.0,
            dmax: 0.0,
            dmean: 0.0,
            ispg: 1,
            nsymbt: 0,
            extra: [0; EXTRA_LEN],
            origin: [0.0; 3],
            map: MAP_TAG,
            machine_stamp: order.machine_stamp(),
            rms: 0.0,
            nlabl: 0,
            labels: [[b' '; LABEL_LEN]; NUM_LABELS],
            byte_order: order,
        }
    }

    /// Parse a header from the first [`HEADER_LEN`] bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::HeaderRead {
                available: bytes.len(),
                source: None,
            });
        }
        let bytes = &bytes[..HEADER_LEN];

        let mut machine_stamp = [0u8; 4];
        machine_stamp.copy_from_slice(&bytes[OFF_MACHST..OFF_MACHST + 4]);
        let byte_order = detect_byte_order(bytes, machine_stamp);

        let words_i32 = |off: usize| -> [i32; 3] {
            [
                read_i32(&bytes[off..], byte_order),
                read_i32(&bytes[off + 4..], byte_order),
                read_i32(&bytes[off + 8..], byte_order),
            ]
        };
        let words_f32 = |off: usize| -> [f32; 3] {
            [
                read_f32(&bytes[off..], byte_order),
                read_f32(&bytes[off + 4..], byte_order),
                read_f32(&bytes[off + 8..], byte_order),
            ]
        };

        let stats = words_f32(OFF_DMIN);

        let mut extra = [0u8; EXTRA_LEN];
        extra.copy_from_slice(&bytes[OFF_EXTRA..OFF_EXTRA + EXTRA_LEN]);

        let mut map = [0u8; 4];
        map.copy_from_slice(&bytes[OFF_MAP..OFF_MAP + 4]);

        let mut labels = [[0u8; LABEL_LEN]; NUM_LABELS];
        for (i, label) in labels.iter_mut().enumerate() {
            let start = OFF_LABELS + i * LABEL_LEN;
            label.copy_from_slice(&bytes[start..start + LABEL_LEN]);
        }

        Ok(MrcHeader {
            dims: words_i32(OFF_NX),
            mode: read_i32(&bytes[OFF_MODE..], byte_order),
            start: words_i32(OFF_NXSTART),
            sampling: words_i32(OFF_MX),
            cell_lengths: words_f32(OFF_CELL),
            cell_angles: words_f32(OFF_ANGLES),
            axis_selectors: words_i32(OFF_MAPC),
            dmin: stats[0],
            dmax: stats[1],
            dmean: stats[2],
            ispg: read_i32(&bytes[OFF_ISPG..], byte_order),
            nsymbt: read_i32(&bytes[OFF_NSYMBT..], byte_order),
            extra,
            origin: words_f32(OFF_ORIGIN),
            map,
            machine_stamp,
            rms: read_f32(&bytes[OFF_RMS..], byte_order),
            nlabl: read_i32(&bytes[OFF_NLABL..], byte_order),
            labels,
            byte_order,
        })
    }

    /// Serialize the header into exactly [`HEADER_LEN`] bytes using
    /// `self.byte_order`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let order = self.byte_order;
        let mut out = vec![0u8; HEADER_LEN];

        let put_i32 = |buf: &mut [u8], off: usize, vals: &[i32]| {
            for (i, v) in vals.iter().enumerate() {
                write_i32(&mut buf[off + i * 4..], *v, order);
            }
        };
        put_i32(&mut out, OFF_NX, &self.dims);
        put_i32(&mut out, OFF_MODE, &[self.mode]);
        put_i32(&mut out, OFF_NXSTART, &self.start);
        put_i32(&mut out, OFF_MX, &self.sampling);
        put_i32(&mut out, OFF_MAPC, &self.axis_selectors);
        put_i32(&mut out, OFF_ISPG, &[self.ispg, self.nsymbt]);
        put_i32(&mut out, OFF_NLABL, &[self.nlabl]);

        let put_f32 = |buf: &mut [u8], off: usize, vals: &[f32]| {
            for (i, v) in vals.iter().enumerate() {
                write_f32(&mut buf[off + i * 4..], *v, order);
            }
        };
        put_f32(&mut out, OFF_CELL, &self.cell_lengths);
        put_f32(&mut out, OFF_ANGLES, &self.cell_angles);
        put_f32(&mut out, OFF_DMIN, &[self.dmin, self.dmax, self.dmean]);
        put_f32(&mut out, OFF_ORIGIN, &self.origin);
        put_f32(&mut out, OFF_RMS, &[self.rms]);

        out[OFF_EXTRA..OFF_EXTRA + EXTRA_LEN].copy_from_slice(&self.extra);
        out[OFF_MAP..OFF_MAP + 4].copy_from_slice(&self.map);
        out[OFF_MACHST..OFF_MACHST + 4].copy_from_slice(&self.machine_stamp);
        for (i, label) in self.labels.iter().enumerate() {
            let start = OFF_LABELS + i * LABEL_LEN;
            out[start..start + LABEL_LEN].copy_from_slice(label);
        }
        out
    }

    /// Whether the payload must be byte-swapped to reach host order.
    pub fn needs_byte_swap(&self) -> bool {
        self.byte_order != ByteOrder::native()
    }

    /// Whether origins come from the MRC2000 origin fields rather than the
    /// start offsets. This is a single file-wide convention.
    pub fn uses_new_origin(&self) -> bool {
        self.map == MAP_TAG
    }

    /// Native extent, sampling, start and origin of one storage axis.
    pub fn native_axis(&self, axis: NativeAxis) -> AxisInfo {
        let i = axis.index();
        AxisInfo {
            extent: self.dims[i],
            spacing: f64::from(self.sampling[i]),
            start: self.start[i],
            origin: self.origin[i],
        }
    }

    /// The labels in use, with trailing padding removed.
    pub fn label_strings(&self) -> Vec<String> {
        let used = self.nlabl.clamp(0, NUM_LABELS as i32) as usize;
        self.labels[..used]
            .iter()
            .map(|label| {
                String::from_utf8_lossy(label)
                    .trim_end_matches([' ', '\0'])
                    .to_string()
            })
            .collect()
    }

    /// Store `text` in label slot `index`, truncating to 80 bytes, and
    /// grow `nlabl` to cover it.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_LABELS`.
    pub fn set_label(&mut self, index: usize, text: &str) {
        assert!(index < NUM_LABELS, "label index {index} out of range");
        let label = &mut self.labels[index];
        label.fill(b' ');
        let bytes = text.as_bytes();
        let len = bytes.len().min(LABEL_LEN);
        label[..len].copy_from_slice(&bytes[..len]);
        self.nlabl = self.nlabl.max(index as i32 + 1);
    }
}

/// Read and parse the header at the start of the file at `path`.
///
/// Only [`HEADER_LEN`] bytes are read.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<MrcHeader> {
    let header_err = |e: std::io::Error| Error::HeaderRead {
        available: 0,
        source: Some(e),
    };
    let file = std::fs::File::open(path.as_ref()).map_err(header_err)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64)
        .read_to_end(&mut bytes)
        .map_err(header_err)?;
    MrcHeader::parse(&bytes)
}

/// Determine the byte order from the machine stamp, falling back to a
/// plausibility probe on the `mode` and axis selector words.
fn detect_byte_order(bytes: &[u8], stamp: [u8; 4]) -> ByteOrder {
    if let Some(order) = ByteOrder::from_machine_stamp(stamp) {
        return order;
    }
    for order in [ByteOrder::Little, ByteOrder::Big] {
        if looks_plausible(bytes, order) {
            log::warn!("unrecognized MRC machine stamp {stamp:02x?}, assuming {order:?} endian");
            return order;
        }
    }
    log::warn!("unrecognized MRC machine stamp {stamp:02x?} and implausible header, assuming little endian");
    ByteOrder::Little
}

fn looks_plausible(bytes: &[u8], order: ByteOrder) -> bool {
    let mode = read_i32(&bytes[OFF_MODE..], order);
    let selectors_ok = (0..3).all(|i| {
        let sel = read_i32(&bytes[OFF_MAPC + i * 4..], order);
        (1..=3).contains(&sel)
    });
    (0..=16).contains(&mode) && selectors_ok
}
