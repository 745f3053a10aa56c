//! Importer facade over `mrcio-pure`.
//!
//! A host application drives an [`MrcImporter`] through the
//! [`LayerImporter`] trait: a cheap header-only `get_file_info`, then
//! `get_file_data` once the user commits. Failures never escape as panics;
//! they come back as an [`errors::Error`] and are also kept as a message on
//! the importer.

pub use mrcio_pure;

pub mod errors;
pub mod importer;

pub use errors::{Error, Result};
pub use importer::{FileData, FileInfo, LayerImporter, MrcImporter, EXTENSIONS, FILE_TYPE};
