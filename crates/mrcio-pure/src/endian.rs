//! Byte-order handling for MRC headers and voxel payloads.
//!
//! MRC files may be written in either byte order; the machine stamp in the
//! header records which. Header words are decoded with an explicit
//! [`ByteOrder`], and payloads are corrected in place with [`swap_in_place`].

/// Byte order of multi-byte values in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the host.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    /// The machine stamp an MRC writer uses for this byte order.
    pub const fn machine_stamp(self) -> [u8; 4] {
        match self {
            ByteOrder::Little => [0x44, 0x44, 0x00, 0x00],
            ByteOrder::Big => [0x11, 0x11, 0x00, 0x00],
        }
    }

    /// Decode a machine stamp. Returns `None` for unrecognized stamps.
    ///
    /// Only the first byte is significant: `0x44` (`DD` or `DA`) is
    /// little-endian and `0x11` is big-endian.
    pub const fn from_machine_stamp(stamp: [u8; 4]) -> Option<Self> {
        match stamp[0] {
            0x44 => Some(ByteOrder::Little),
            0x11 => Some(ByteOrder::Big),
            _ => None,
        }
    }
}

/// Read an `i32` in the given byte order from the first 4 bytes of the slice.
#[inline]
pub fn read_i32(buf: &[u8], order: ByteOrder) -> i32 {
    let bytes = [buf[0], buf[1], buf[2], buf[3]];
    match order {
        ByteOrder::Little => i32::from_le_bytes(bytes),
        ByteOrder::Big => i32::from_be_bytes(bytes),
    }
}

/// Read an `f32` in the given byte order from the first 4 bytes of the slice.
#[inline]
pub fn read_f32(buf: &[u8], order: ByteOrder) -> f32 {
    f32::from_bits(read_i32(buf, order) as u32)
}

/// Write an `i32` in the given byte order into the first 4 bytes of the slice.
#[inline]
pub fn write_i32(buf: &mut [u8], val: i32, order: ByteOrder) {
    let bytes = match order {
        ByteOrder::Little => val.to_le_bytes(),
        ByteOrder::Big => val.to_be_bytes(),
    };
    buf[..4].copy_from_slice(&bytes);
}

/// Write an `f32` in the given byte order into the first 4 bytes of the slice.
#[inline]
pub fn write_f32(buf: &mut [u8], val: f32, order: ByteOrder) {
    write_i32(buf, val.to_bits() as i32, order);
}

/// Reverse the byte order of every `element_size`-byte element in place.
///
/// An element size of 1 leaves the buffer untouched.
///
/// # Panics
/// Panics if `element_size` is zero or `buf.len()` is not a multiple of it.
pub fn swap_in_place(buf: &mut [u8], element_size: usize) {
    assert!(element_size > 0, "element size must be non-zero");
    assert!(
        buf.len().is_multiple_of(element_size),
        "buffer length must be a multiple of {element_size}"
    );
    if element_size == 1 {
        return;
    }
    for chunk in buf.chunks_exact_mut(element_size) {
        chunk.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_i32_both_orders() {
        let mut buf = [0u8; 4];
        for order in [ByteOrder::Little, ByteOrder::Big] {
            for val in [0_i32, 1, -1, i32::MIN, i32::MAX, 0x01020304] {
                write_i32(&mut buf, val, order);
                assert_eq!(read_i32(&buf, order), val);
            }
        }
    }

    #[test]
    fn read_i32_big_endian_layout() {
        assert_eq!(read_i32(&[0x00, 0x00, 0x01, 0x00], ByteOrder::Big), 256);
        assert_eq!(read_i32(&[0x00, 0x01, 0x00, 0x00], ByteOrder::Little), 256);
    }

    #[test]
    fn read_f32_one() {
        assert_eq!(read_f32(&[0x3F, 0x80, 0x00, 0x00], ByteOrder::Big), 1.0);
        assert_eq!(read_f32(&[0x00, 0x00, 0x80, 0x3F], ByteOrder::Little), 1.0);
    }

    #[test]
    fn machine_stamps() {
        assert_eq!(
            ByteOrder::from_machine_stamp([0x44, 0x41, 0x00, 0x00]),
            Some(ByteOrder::Little)
        );
        assert_eq!(
            ByteOrder::from_machine_stamp(ByteOrder::Little.machine_stamp()),
            Some(ByteOrder::Little)
        );
        assert_eq!(
            ByteOrder::from_machine_stamp(ByteOrder::Big.machine_stamp()),
            Some(ByteOrder::Big)
        );
        assert_eq!(ByteOrder::from_machine_stamp([0, 0, 0, 0]), None);
    }

    #[test]
    fn native_matches_target() {
        let one = 1u16.to_ne_bytes();
        let expected = if one[0] == 1 {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        };
        assert_eq!(ByteOrder::native(), expected);
    }

    #[test]
    fn swap_single_bytes_is_noop() {
        let mut buf = [1u8, 2, 3];
        swap_in_place(&mut buf, 1);
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn swap_per_element_not_per_buffer() {
        let mut buf = [1u8, 2, 3, 4];
        swap_in_place(&mut buf, 2);
        assert_eq!(buf, [2, 1, 4, 3]);

        let mut buf = [0x00, 0x00, 0x80, 0x3F, 1, 2, 3, 4];
        swap_in_place(&mut buf, 4);
        assert_eq!(buf, [0x3F, 0x80, 0x00, 0x00, 4, 3, 2, 1]);
    }

    #[test]
    fn swap_twice_restores() {
        let original: Vec<u8> = (0..32).collect();
        let mut buf = original.clone();
        swap_in_place(&mut buf, 8);
        swap_in_place(&mut buf, 8);
        assert_eq!(buf, original);
    }

    #[test]
    #[should_panic(expected = "multiple of 4")]
    fn swap_rejects_ragged_buffer() {
        let mut buf = [0u8; 6];
        swap_in_place(&mut buf, 4);
    }
}
