use {crate::*, base::Vec2, std::path::Path};

/// Extensions `load_image` understands.
pub const STILL_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

pub fn is_still_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| STILL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Loads an image file from disk as an `Rgb8` frame.
pub fn load_image(path: &Path) -> Result<Image, ImageError> {
    let decoded = crates_image::open(path)?;
    let rgb = decoded.to_rgb8();
    let size = Vec2::new(rgb.width() as usize, rgb.height() as usize);
    Ok(Image::new(size, rgb.into_raw(), PixelFormat::Rgb8))
}
