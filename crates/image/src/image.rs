use {crate::*, base::Vec2};

/// One captured frame in its device pixel format.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub size: Vec2<usize>,
    pub data: Vec<u8>,
    pub format: PixelFormat,
}

impl Image {
    pub fn new(size: Vec2<usize>, data: Vec<u8>, format: PixelFormat) -> Self {
        Self { size, data, format }
    }

    /// Checks that the buffer is large enough for the declared size and format.
    pub fn validate(&self) -> Result<(), ImageError> {
        match self.format.frame_len(self.size) {
            Some(expected) if self.data.len() < expected => Err(ImageError::Size {
                expected,
                actual: self.data.len(),
            }),
            _ => Ok(()),
        }
    }
}
