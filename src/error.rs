use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from local filesystem or terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid argument provided by the user.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(String),

    /// A one-shot subcommand did not complete.
    #[error("{0}")]
    Command(String),

    /// A collaborator call failed outside the interactive UI.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure at the object-store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The collaborator answered with a non-success status.
    #[error("{status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// No object exists under the requested key.
    #[error("not found: {0}")]
    NotFound(String),

    /// Local file access failed while preparing or storing a transfer.
    #[error("local I/O: {0}")]
    LocalIo(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::LocalIo(err.to_string())
    }
}

/// The listing fetch failed. The list shows this until a retry succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error loading files: {0}")]
pub struct ListingError(pub StoreError);

/// A preview could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to load {key}: {source}")]
pub struct PreviewLoadError {
    pub key: String,
    pub source: StoreError,
}

/// Persisting an edit failed; the editor buffer is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to save {key}: {source}")]
pub struct SaveError {
    pub key: String,
    pub source: StoreError,
}

/// One or more deletes in a batch failed. Only the count is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{failed} out of {total} deletions failed")]
pub struct DeleteError {
    pub failed: usize,
    pub total: usize,
}

/// An upload was rejected or the local file could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to upload {key}: {source}")]
pub struct UploadError {
    pub key: String,
    pub source: StoreError,
}

/// A download could not be fetched or written locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to download {key}: {source}")]
pub struct DownloadError {
    pub key: String,
    pub source: StoreError,
}
