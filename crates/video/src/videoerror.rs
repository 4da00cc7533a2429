use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum VideoError {
    /// The platform refused access to the camera.
    PermissionDenied(String),
    /// No usable camera: missing, busy, or misconfigured.
    Unavailable(String),
    /// The device was open but stopped delivering frames.
    Stream(String),
    Decode(image::ImageError),
}

impl fmt::Display for VideoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoError::PermissionDenied(msg) => write!(f, "permission denied: {msg}"),
            VideoError::Unavailable(msg) => write!(f, "device unavailable: {msg}"),
            VideoError::Stream(msg) => write!(f, "stream error: {msg}"),
            VideoError::Decode(err) => write!(f, "decode error: {err}"),
        }
    }
}

impl std::error::Error for VideoError {}

impl From<std::io::Error> for VideoError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => VideoError::PermissionDenied(err.to_string()),
            _ => VideoError::Unavailable(err.to_string()),
        }
    }
}

impl From<image::ImageError> for VideoError {
    fn from(err: image::ImageError) -> Self {
        VideoError::Decode(err)
    }
}
