/// All errors an importer reports to its driver.
#[derive(Debug)]
pub enum Error {
    /// An error from the mrcio-pure core library.
    Mrc(mrcio_pure::Error),
    /// The core panicked; the panic was contained at the importer boundary.
    Crashed,
    /// A free-form error message.
    Message(String),
}

impl From<mrcio_pure::Error> for Error {
    fn from(e: mrcio_pure::Error) -> Self {
        Error::Mrc(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Mrc(e) => write!(f, "{e}"),
            Error::Crashed => write!(f, "MRC importer crashed while reading file."),
            Error::Message(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Mrc(e) => Some(e),
            Error::Crashed | Error::Message(_) => None,
        }
    }
}

/// Convenience result type for the importer crate.
pub type Result<T> = std::result::Result<T, Error>;
