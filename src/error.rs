use std::backtrace::Backtrace;
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// A malformed or empty instance, rejected before any model is built.
    #[error("invalid instance: {0}")]
    Validation(String),
    /// The solving backend itself failed (not infeasibility, not a timeout).
    #[error("backend failure: {0}")]
    Backend(String),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inner: {inner}\n{backtrace}")]
    Inner {
        inner: Box<PackError>,
        backtrace: Box<Backtrace>,
    },
}

impl From<PackError> for Error {
    fn from(inner: PackError) -> Self {
        Error::Inner {
            inner: Box::new(inner),
            backtrace: Box::new(std::backtrace::Backtrace::capture()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        PackError::Io(err).into()
    }
}

impl Error {
    /// Returns the inner classification, for callers that need to distinguish
    /// validation failures from backend failures.
    pub fn inner(&self) -> &PackError {
        match self {
            Error::Inner { inner, .. } => inner,
        }
    }
}
