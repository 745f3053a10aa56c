use crate::geometry::AxisRole;
use crate::header::HEADER_LEN;

/// All errors that can occur while importing an MRC volume.
#[derive(Debug)]
pub enum Error {
    /// The file could not be opened or is shorter than the fixed header.
    HeaderRead {
        /// Number of header bytes that were actually available.
        available: usize,
        /// Underlying I/O failure, if any.
        source: Option<std::io::Error>,
    },
    /// Unrecognized element type code in the `mode` field.
    UnsupportedMode(i32),
    /// An axis selector (mapc/mapr/maps) outside `1..=3`.
    InvalidAxisMapping { role: AxisRole, value: i32 },
    /// A resolved axis extent that is zero or negative.
    InvalidDimension { role: AxisRole, value: i32 },
    /// The payload is shorter than the geometry implies.
    Truncated { expected: u64, available: u64 },
    /// The voxel buffer could not be allocated.
    Allocation { bytes: u64 },
    /// Header parsing failed while reading the volume data.
    Header(Box<Error>),
    /// An I/O error from the standard library.
    Io(std::io::Error),
    /// The volume could not be shaped into an array.
    #[cfg(feature = "array")]
    Shape(ndarray::ShapeError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::HeaderRead {
                source: Some(e), ..
            } => write!(f, "could not read MRC header: {e}"),
            Error::HeaderRead {
                available,
                source: None,
            } => write!(
                f,
                "file too short for MRC header: {available} of {HEADER_LEN} bytes"
            ),
            Error::UnsupportedMode(code) => write!(f, "unsupported MRC format: mode {code}"),
            Error::InvalidAxisMapping { role, value } => {
                write!(f, "bad {} axis value: {value}", role.selector_name())
            }
            Error::InvalidDimension { role, value } => {
                write!(f, "invalid {role} axis extent: {value}")
            }
            Error::Truncated {
                expected,
                available,
            } => write!(
                f,
                "incorrect length of file: expected {expected} data bytes, found {available}"
            ),
            Error::Allocation { bytes } => write!(
                f,
                "could not allocate enough memory to read MRC file ({bytes} bytes)"
            ),
            Error::Header(e) => write!(f, "failed to read header of MRC file: {e}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "array")]
            Error::Shape(e) => write!(f, "array shape error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::HeaderRead { source: Some(e), .. } => Some(e),
            Error::Header(e) => Some(e.as_ref()),
            Error::Io(e) => Some(e),
            #[cfg(feature = "array")]
            Error::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(feature = "array")]
impl From<ndarray::ShapeError> for Error {
    fn from(e: ndarray::ShapeError) -> Self {
        Error::Shape(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_short_header() {
        let e = Error::HeaderRead {
            available: 100,
            source: None,
        };
        assert_eq!(
            e.to_string(),
            "file too short for MRC header: 100 of 1024 bytes"
        );
    }

    #[test]
    fn display_unsupported_mode() {
        let e = Error::UnsupportedMode(6);
        assert_eq!(e.to_string(), "unsupported MRC format: mode 6");
    }

    #[test]
    fn display_invalid_axis_mapping_names_role() {
        let e = Error::InvalidAxisMapping {
            role: AxisRole::Row,
            value: 4,
        };
        assert_eq!(e.to_string(), "bad mapr axis value: 4");
    }

    #[test]
    fn display_truncated() {
        let e = Error::Truncated {
            expected: 256,
            available: 12,
        };
        let s = e.to_string();
        assert!(s.contains("256"));
        assert!(s.contains("12"));
    }

    #[test]
    fn display_wrapped_header_error() {
        let e = Error::Header(Box::new(Error::UnsupportedMode(9)));
        assert_eq!(
            e.to_string(),
            "failed to read header of MRC file: unsupported MRC format: mode 9"
        );
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = std::io::Error::other("oops");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
    }

    #[test]
    fn std_error_source() {
        use std::error::Error as StdError;

        let e = Error::UnsupportedMode(3);
        assert!(e.source().is_none());

        let e = Error::HeaderRead {
            available: 0,
            source: Some(std::io::Error::other("inner")),
        };
        assert!(e.source().is_some());

        let e = Error::Header(Box::new(Error::UnsupportedMode(3)));
        assert!(e.source().is_some());
    }
}
