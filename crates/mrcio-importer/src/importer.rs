use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use mrcio_pure::{Geometry, MrcReader, PixelMode, ReadOptions, VolumeBuffer};

use crate::errors::{Error, Result};

/// File type tag reported for MRC volumes.
pub const FILE_TYPE: &str = "mrc";

/// File extensions the MRC importer accepts.
pub const EXTENSIONS: [&str; 5] = [".mrc", ".map", ".rec", ".st", ".ali"];

/// Header-only description of a file, cheap to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub data_type: PixelMode,
    pub geometry: Geometry,
    pub file_type: &'static str,
    /// Whether the volume can be imported as a mask.
    pub mask_compatible: bool,
}

/// A fully imported volume.
#[derive(Debug, Clone)]
pub struct FileData {
    pub volume: Arc<VolumeBuffer>,
    pub geometry: Geometry,
    /// Layer name, the file name without its extension.
    pub name: String,
}

/// Interface a host application uses to drive an importer.
pub trait LayerImporter {
    /// Read header information without loading voxel data.
    fn get_file_info(&mut self) -> Result<FileInfo>;

    /// Load the full volume.
    fn get_file_data(&mut self) -> Result<FileData>;

    /// Message of the most recent failed call, cleared at the start of
    /// every call.
    fn error(&self) -> Option<&str>;

    /// Name under which imported data is presented.
    fn file_tag(&self) -> String;
}

/// Importer for a single MRC file.
#[derive(Debug)]
pub struct MrcImporter {
    reader: MrcReader,
    error: Option<String>,
}

impl MrcImporter {
    /// Importer for `path` with default [`ReadOptions`]. The file is not
    /// touched until the first request.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_options(path, ReadOptions::default())
    }

    /// Importer for `path` using `options` for payload reads.
    pub fn with_options<P: AsRef<Path>>(path: P, options: ReadOptions) -> Self {
        MrcImporter {
            reader: MrcReader::with_options(path, options),
            error: None,
        }
    }

    /// Importer for `path`, rejecting names without one of the
    /// [`EXTENSIONS`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !Self::can_import(path) {
            return Err(Error::Message(format!(
                "not an MRC file: {}",
                path.display()
            )));
        }
        Ok(Self::new(path))
    }

    /// Whether `path` has one of the [`EXTENSIONS`], ignoring case.
    pub fn can_import<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| EXTENSIONS.iter().any(|e| e[1..] == ext))
    }

    pub fn path(&self) -> &Path {
        self.reader.path()
    }

    /// Run `op` against the reader, containing panics and recording the
    /// failure message.
    fn guarded<T>(
        &mut self,
        op: impl FnOnce(&mut MrcReader) -> mrcio_pure::Result<T>,
    ) -> Result<T> {
        self.error = None;
        let reader = &mut self.reader;
        let result = match panic::catch_unwind(AssertUnwindSafe(|| op(reader))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(Error::Mrc(e)),
            Err(_) => Err(Error::Crashed),
        };
        if let Err(e) = &result {
            let message = e.to_string();
            log::warn!("{}: {message}", self.reader.path().display());
            self.error = Some(message);
        }
        result
    }
}

impl LayerImporter for MrcImporter {
    fn get_file_info(&mut self) -> Result<FileInfo> {
        self.guarded(|reader| {
            let info = reader.read_header()?;
            Ok(FileInfo {
                data_type: info.mode,
                geometry: info.geometry,
                file_type: FILE_TYPE,
                mask_compatible: true,
            })
        })
    }

    fn get_file_data(&mut self) -> Result<FileData> {
        let name = self.file_tag();
        self.guarded(|reader| {
            let volume = reader.read_data()?;
            Ok(FileData {
                geometry: *volume.geometry(),
                volume,
                name,
            })
        })
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn file_tag(&self) -> String {
        self.reader
            .path()
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_import_by_extension() {
        assert!(MrcImporter::can_import("volume.mrc"));
        assert!(MrcImporter::can_import("/data/emd_1234.MAP"));
        assert!(MrcImporter::can_import("tomo.rec"));
        assert!(!MrcImporter::can_import("volume.nrrd"));
        assert!(!MrcImporter::can_import("mrc"));
    }

    #[test]
    fn open_rejects_foreign_extensions() {
        let importer = MrcImporter::open("tomo.REC").unwrap();
        assert_eq!(importer.file_tag(), "tomo");
        assert!(importer.error().is_none());

        match MrcImporter::open("scan.tif") {
            Err(Error::Message(message)) => assert_eq!(message, "not an MRC file: scan.tif"),
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn file_tag_drops_extension() {
        let importer = MrcImporter::new("/tmp/some/dir/ribosome.mrc");
        assert_eq!(importer.file_tag(), "ribosome");
        assert_eq!(importer.path(), Path::new("/tmp/some/dir/ribosome.mrc"));
    }

    #[test]
    fn panic_is_contained_and_reported() {
        let mut importer = MrcImporter::new("unused.mrc");
        let result: Result<()> = importer.guarded(|_| panic!("boom"));
        assert!(matches!(result, Err(Error::Crashed)));
        assert_eq!(
            importer.error(),
            Some("MRC importer crashed while reading file.")
        );
    }

    #[test]
    fn success_clears_previous_error() {
        let mut importer = MrcImporter::new("unused.mrc");
        let _ = importer.guarded(|_| -> mrcio_pure::Result<()> {
            Err(mrcio_pure::Error::UnsupportedMode(9))
        });
        assert!(importer.error().is_some());
        importer.guarded(|_| Ok(())).unwrap();
        assert!(importer.error().is_none());
    }
}
