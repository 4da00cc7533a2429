use {base::Vec2, image::PixelFormat, std::path::PathBuf};

/// Which way the camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera, pointing away from the user.
    Environment,
    /// Front camera, pointing at the user.
    User,
}

/// What the caller would like from the camera.
///
/// Every field is a hint. Backends pick the closest thing they can deliver
/// and report it back as a `CaptureFormat`.
#[derive(Debug, Clone)]
pub struct CaptureConstraints {
    facing: FacingMode,
    device: Option<PathBuf>,
    size: Option<Vec2<usize>>,
    frame_rate: Option<f32>,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            device: None,
            size: None,
            frame_rate: None,
        }
    }
}

impl CaptureConstraints {
    pub fn with_facing(mut self, facing: FacingMode) -> Self {
        self.facing = facing;
        self
    }

    /// Device node or frame directory, depending on the backend.
    pub fn with_device(mut self, device: impl Into<PathBuf>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_size(mut self, size: Vec2<usize>) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn device(&self) -> Option<&PathBuf> {
        self.device.as_ref()
    }

    pub fn size(&self) -> Option<Vec2<usize>> {
        self.size
    }

    pub fn frame_rate(&self) -> Option<f32> {
        self.frame_rate
    }
}

/// What the backend actually delivers after `open`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFormat {
    pub size: Vec2<usize>,
    pub format: PixelFormat,
    pub frame_rate: f32,
    // None when the backend cannot tell which way the camera points
    pub facing: Option<FacingMode>,
}
