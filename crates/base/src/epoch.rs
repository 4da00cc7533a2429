use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// A shared generation counter for cancelling in-flight work.
///
/// Everything started under one generation captures `current()`. Calling
/// `advance()` makes every holder of an older value notice that its work is
/// stale, without having to reach the work itself.
#[derive(Clone, Debug)]
pub struct Epoch {
    value: Arc<AtomicU64>,
}

impl Default for Epoch {
    fn default() -> Self {
        Self::new()
    }
}

impl Epoch {
    pub fn new() -> Self {
        Self {
            value: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Advance to the next generation. Returns the new value.
    pub fn advance(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.current()
    }
}
