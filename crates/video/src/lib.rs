//! Camera capture for the scanner.
//!
//! `CameraSession` hands out at most one `CaptureResource` at a time. A
//! resource owns the opened device and a worker on tokio's blocking pool
//! that keeps the latest presented frame available to a `FrameReceiver`.

pub mod constraints;
pub use constraints::*;

pub mod videoerror;
pub use videoerror::*;

pub mod videoframe;
pub use videoframe::*;

pub mod videoin;
pub use videoin::*;
