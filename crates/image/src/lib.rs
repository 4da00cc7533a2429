//! Frame buffers for the scanner.
//!
//! Camera backends deliver `Image`s in whatever pixel format the device
//! negotiated. The QR decoder only looks at brightness, so everything is
//! funnelled through `to_luma` into a `LumaImage`, one byte per pixel,
//! row-major.

mod error;
pub use error::*;

mod pixelformat;
pub use pixelformat::*;

mod image;
pub use image::*;

mod luma;
pub use luma::*;

mod still;
pub use still::*;
