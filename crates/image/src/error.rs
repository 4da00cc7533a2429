use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageError {
    Decode(String),
    Size { expected: usize, actual: usize },
    Io(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Decode(msg) => write!(f, "decode error: {msg}"),
            ImageError::Size { expected, actual } => {
                write!(f, "size error: expected {expected} bytes, got {actual}")
            }
            ImageError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<crates_image::ImageError> for ImageError {
    fn from(err: crates_image::ImageError) -> Self {
        match err {
            crates_image::ImageError::IoError(err) => ImageError::Io(err.to_string()),
            other => ImageError::Decode(other.to_string()),
        }
    }
}
