//! Scan-to-certificate acquisition.
//!
//! `AcquisitionController` drives one scan: it makes sure the decoder is
//! loaded (`DecoderProvider`), opens the camera (`video::CameraSession`),
//! runs a `ScanLoop` over the presented frames and hands the first decoded
//! payload to the certificate ingestion collaborator.

pub mod controller;
pub use controller::*;

pub mod decoder;
pub use decoder::*;

pub mod payload;
pub use payload::*;

pub mod provider;
pub use provider::*;

pub mod scan_loop;
pub use scan_loop::*;

pub mod scanerror;
pub use scanerror::*;

pub mod state;
pub use state::*;
