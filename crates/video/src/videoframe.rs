use image::Image;

#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub image: Image,
    // increments by one per captured frame, starting at 1
    pub sequence: u64,
}
