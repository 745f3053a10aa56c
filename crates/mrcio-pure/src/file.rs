//! Large-file access for volume payloads.
//!
//! Lengths and offsets are `u64` end to end, so payloads past 4 GiB are
//! addressed without truncation. Bulk reads are split into bounded chunks
//! and loop over short reads until the buffer is full.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// Default upper bound on a single read call (1 GiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 30;

/// A read-only volume file. The handle is closed when this value is dropped.
#[derive(Debug)]
pub struct VolumeFile {
    file: File,
    len: u64,
}

impl VolumeFile {
    /// Open `path` for reading and record its length.
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        Ok(VolumeFile { file, len })
    }

    /// Total file length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position the handle at absolute byte `offset`.
    pub fn seek_to(&mut self, offset: u64) -> std::io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Fill `buf` from the current position with [`read_chunked`].
    pub fn read_exact_chunked(
        &mut self,
        buf: &mut [u8],
        chunk_size: usize,
    ) -> std::io::Result<()> {
        read_chunked(&mut self.file, buf, chunk_size)
    }
}

impl Read for VolumeFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for VolumeFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos)
    }
}

/// Fill `buf` from `reader`, requesting at most `chunk_size` bytes per call.
///
/// Short reads are continued and `Interrupted` is retried. Reaching end of
/// file before `buf` is full yields an `UnexpectedEof` error.
pub fn read_chunked<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    chunk_size: usize,
) -> std::io::Result<()> {
    let chunk_size = chunk_size.max(1);
    let mut filled = 0;
    while filled < buf.len() {
        let end = buf.len().min(filled.saturating_add(chunk_size));
        match reader.read(&mut buf[filled..end]) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("end of file after {filled} of {} bytes", buf.len()),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Returns at most `step` bytes per read and interrupts every other call.
    struct Trickle<'a> {
        data: &'a [u8],
        pos: usize,
        step: usize,
        interrupt: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(ErrorKind::Interrupted.into());
            }
            let n = buf.len().min(self.step).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn reads_in_small_chunks() {
        let data: Vec<u8> = (0..=255).cycle().take(1000).collect();
        let mut cursor = Cursor::new(&data[..]);
        let mut buf = vec![0u8; 1000];
        read_chunked(&mut cursor, &mut buf, 7).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn survives_short_and_interrupted_reads() {
        let data: Vec<u8> = (0..100).collect();
        let mut src = Trickle {
            data: &data,
            pos: 0,
            step: 3,
            interrupt: false,
        };
        let mut buf = vec![0u8; 100];
        read_chunked(&mut src, &mut buf, 64).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn eof_before_full_is_error() {
        let data = [1u8; 10];
        let mut cursor = Cursor::new(&data[..]);
        let mut buf = [0u8; 20];
        let err = read_chunked(&mut cursor, &mut buf, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn zero_chunk_size_still_progresses() {
        let data = [9u8; 5];
        let mut cursor = Cursor::new(&data[..]);
        let mut buf = [0u8; 5];
        read_chunked(&mut cursor, &mut buf, 0).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn volume_file_len_and_seek() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.bin");
        let data: Vec<u8> = (0..64).collect();
        std::fs::write(&path, &data).unwrap();

        let mut f = VolumeFile::open(&path).unwrap();
        assert_eq!(f.len(), 64);
        assert!(!f.is_empty());
        f.seek(SeekFrom::Start(60)).unwrap();
        let mut buf = [0u8; 4];
        read_chunked(&mut f, &mut buf, 1).unwrap();
        assert_eq!(buf, [60, 61, 62, 63]);
    }

    #[test]
    fn seek_to_then_read_exact_chunked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.bin");
        let data: Vec<u8> = (0..200).collect();
        std::fs::write(&path, &data).unwrap();

        let mut f = VolumeFile::open(&path).unwrap();
        f.seek_to(100).unwrap();
        let mut buf = [0u8; 50];
        f.read_exact_chunked(&mut buf, 3).unwrap();
        assert_eq!(&buf[..], &data[100..150]);

        f.seek_to(190).unwrap();
        let mut rest = [0u8; 20];
        let err = f.read_exact_chunked(&mut rest, 8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = VolumeFile::open(dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
