use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by an asset store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,

    #[error("unknown upload session {0:?}")]
    UnknownUpload(String),

    #[error("part #{0} was not uploaded or its token does not match")]
    PartMismatch(u32),

    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage rejected the request: {0}")]
    Rejected(String),
}

/// Failure of a single upload. Lookup misses are never reported here.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unable to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to upload {name:?}: {source}")]
    Single { name: String, source: StoreError },

    #[error("unable to start multipart upload of {name:?}: {source}")]
    Start { name: String, source: StoreError },

    #[error("unable to upload file chunk #{part} (upload {upload_id}): {source}")]
    Part {
        upload_id: String,
        part: u32,
        source: StoreError,
    },

    #[error("unable to complete multipart upload {upload_id}: {source}")]
    Complete {
        upload_id: String,
        source: StoreError,
    },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unable to open {path:?}: {source}")]
    ManifestMissing {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to decode {manifest}: {message}")]
    ManifestInvalid {
        manifest: &'static str,
        message: String,
    },

    #[error("required directory {0:?} is missing")]
    MissingDirectory(PathBuf),

    #[error("checker {0:?} is not supported")]
    UnsupportedChecker(String),

    #[error("interactor is not supported: none of its sources uses a known runtime")]
    UnsupportedInteractor,

    #[error("statement {path:?} has unsupported format {format:?}")]
    UnsupportedStatement { path: PathBuf, format: String },

    #[error("no usable statement files found in {0:?}")]
    NoStatements(PathBuf),

    #[error("format string {pattern:?} is invalid: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unable to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to read {step}: {source}")]
    Step {
        step: &'static str,
        source: Box<ImportError>,
    },

    #[error(transparent)]
    Upload(#[from] UploadError),
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;

/// Tags an error with the normalization step it came from.
pub trait StepContext<T> {
    fn step(self, step: &'static str) -> Result<T>;
}

impl<T> StepContext<T> for Result<T> {
    fn step(self, step: &'static str) -> Result<T> {
        self.map_err(|source| ImportError::Step {
            step,
            source: Box::new(source),
        })
    }
}

impl ImportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImportError::Io {
            path: path.into(),
            source,
        }
    }
}
