//! Client side of the certificate portal: who is logged in, which wipe
//! certificates they hold, and how a scanned certificate gets added.

pub mod apierror;
pub use apierror::*;

pub mod client;
pub use client::*;

pub mod config;
pub use config::*;

pub mod dashboard;
pub use dashboard::*;

pub mod model;
pub use model::*;

pub mod portal;
pub use portal::*;
