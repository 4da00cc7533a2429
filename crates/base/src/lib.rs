mod epoch;
pub use epoch::*;

pub mod logger;
pub use logger::*;

mod vec2;
pub use vec2::*;
