use {crate::*, base::Vec2};

/// 8-bit brightness buffer, row-major, `size.x` bytes per row.
#[derive(Debug, Clone, PartialEq)]
pub struct LumaImage {
    pub size: Vec2<usize>,
    pub data: Vec<u8>,
}

impl LumaImage {
    pub fn new(size: Vec2<usize>, data: Vec<u8>) -> Result<Self, ImageError> {
        if data.len() != size.area() {
            return Err(ImageError::Size {
                expected: size.area(),
                actual: data.len(),
            });
        }
        Ok(Self { size, data })
    }

    pub fn width(&self) -> usize {
        self.size.x
    }

    pub fn height(&self) -> usize {
        self.size.y
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.size.x + x]
    }

    /// Light-on-dark copy of the buffer.
    pub fn inverted(&self) -> Self {
        Self {
            size: self.size,
            data: self.data.iter().map(|&v| 255 - v).collect(),
        }
    }
}

// BT.601 luma, fixed-point with shift 8
fn rgb_luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32) >> 8) as u8
}

/// Extracts the brightness channel of a frame.
pub fn to_luma(image: &Image) -> Result<LumaImage, ImageError> {
    image.validate()?;
    let pixels = image.size.area();
    let data = match image.format {
        PixelFormat::Gray8 => image.data[..pixels].to_vec(),
        PixelFormat::Rgb8 => image
            .data
            .chunks_exact(3)
            .take(pixels)
            .map(|c| rgb_luma(c[0], c[1], c[2]))
            .collect(),
        PixelFormat::Argb8 => image
            .data
            .chunks_exact(4)
            .take(pixels)
            .map(|c| rgb_luma(c[1], c[2], c[3]))
            .collect(),
        // Y0 U Y1 V
        PixelFormat::Yuyv => image.data[..pixels * 2].iter().step_by(2).copied().collect(),
        // planar, the Y plane comes first
        PixelFormat::Yu12 => image.data[..pixels].to_vec(),
        PixelFormat::Jpeg => return jpeg_to_luma(&image.data),
    };
    LumaImage::new(image.size, data)
}

fn jpeg_to_luma(data: &[u8]) -> Result<LumaImage, ImageError> {
    let decoded = crates_image::load_from_memory_with_format(data, crates_image::ImageFormat::Jpeg)?;
    let gray = decoded.to_luma8();
    let size = Vec2::new(gray.width() as usize, gray.height() as usize);
    LumaImage::new(size, gray.into_raw())
}
