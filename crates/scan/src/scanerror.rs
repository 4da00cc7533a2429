use {certs::ApiError, std::fmt, video::VideoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DecoderLoadFailed,
    PermissionDenied,
    DeviceUnavailable,
    IngestionFailed,
}

impl ErrorKind {
    /// Message shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::DecoderLoadFailed => "Failed to load QR scanning library.",
            ErrorKind::PermissionDenied => {
                "Could not access camera. Please grant permission and try again."
            }
            ErrorKind::DeviceUnavailable => "No camera is available.",
            ErrorKind::IngestionFailed => "Failed to add certificate.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanError {
    kind: ErrorKind,
    detail: String,
}

impl ScanError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Message for the UI. Ingestion failures show the server's reason
    /// when it gave one.
    pub fn user_message(&self) -> String {
        if self.kind == ErrorKind::IngestionFailed && !self.detail.is_empty() {
            self.detail.clone()
        } else {
            self.kind.message().to_string()
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.kind.message())
        } else {
            write!(f, "{} ({})", self.kind.message(), self.detail)
        }
    }
}

impl std::error::Error for ScanError {}

impl From<VideoError> for ScanError {
    fn from(err: VideoError) -> Self {
        match err {
            VideoError::PermissionDenied(detail) => ScanError::new(ErrorKind::PermissionDenied, detail),
            other => ScanError::new(ErrorKind::DeviceUnavailable, other.to_string()),
        }
    }
}

impl From<ApiError> for ScanError {
    fn from(err: ApiError) -> Self {
        ScanError::new(ErrorKind::IngestionFailed, err.to_string())
    }
}
