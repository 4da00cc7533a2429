use base::Vec2;

// fourcc codes
pub(crate) const FOURCC_GREY: u32 = u32::from_le_bytes(*b"GREY");
pub(crate) const FOURCC_RGB8: u32 = u32::from_le_bytes(*b"RGB3");
pub(crate) const FOURCC_ARGB8: u32 = u32::from_le_bytes(*b"ARGB");
pub(crate) const FOURCC_YUYV: u32 = u32::from_le_bytes(*b"YUYV");
pub(crate) const FOURCC_YU12: u32 = u32::from_le_bytes(*b"YU12");
pub(crate) const FOURCC_MJPG: u32 = u32::from_le_bytes(*b"MJPG");

/// Convert a fourcc code to a readable 4-character string.
pub fn fourcc_to_string(fourcc: u32) -> String {
    String::from_utf8_lossy(&fourcc.to_le_bytes()).into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Gray8,
    Rgb8,
    Argb8,
    Yuyv,
    Yu12,
    Jpeg,
}

impl PixelFormat {
    pub fn from_fourcc(fourcc: u32) -> Option<Self> {
        match fourcc {
            FOURCC_GREY => Some(PixelFormat::Gray8),
            FOURCC_RGB8 => Some(PixelFormat::Rgb8),
            FOURCC_ARGB8 => Some(PixelFormat::Argb8),
            FOURCC_YUYV => Some(PixelFormat::Yuyv),
            FOURCC_YU12 => Some(PixelFormat::Yu12),
            FOURCC_MJPG => Some(PixelFormat::Jpeg),
            _ => None,
        }
    }

    pub fn as_fourcc(&self) -> u32 {
        match self {
            PixelFormat::Gray8 => FOURCC_GREY,
            PixelFormat::Rgb8 => FOURCC_RGB8,
            PixelFormat::Argb8 => FOURCC_ARGB8,
            PixelFormat::Yuyv => FOURCC_YUYV,
            PixelFormat::Yu12 => FOURCC_YU12,
            PixelFormat::Jpeg => FOURCC_MJPG,
        }
    }

    /// Bytes a raw frame of `size` occupies, `None` for compressed formats.
    pub fn frame_len(&self, size: Vec2<usize>) -> Option<usize> {
        let pixels = size.area();
        match self {
            PixelFormat::Gray8 => Some(pixels),
            PixelFormat::Rgb8 => Some(pixels * 3),
            PixelFormat::Argb8 => Some(pixels * 4),
            PixelFormat::Yuyv => Some(pixels * 2),
            PixelFormat::Yu12 => Some(pixels + 2 * (size.x / 2) * (size.y / 2)),
            PixelFormat::Jpeg => None,
        }
    }
}
