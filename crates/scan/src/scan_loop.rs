use {
    crate::*,
    base::Epoch,
    image::to_luma,
    std::sync::Arc,
    tokio::task::{JoinHandle, spawn_blocking},
    video::FrameReceiver,
};

/// Why a scan loop ended on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanExit {
    Hit(DecodedPayload),
    /// The camera stopped presenting frames before a code was found.
    StreamEnded,
}

/// Decodes presented frames one at a time until a code is found.
///
/// The loop waits for each new frame, so it never runs faster than the
/// camera. Frame N is decoded to completion before frame N+1 is taken;
/// frames presented meanwhile are skipped, not queued.
pub struct ScanLoop {
    task: Option<JoinHandle<()>>,
    epoch: Epoch,
}

impl Default for ScanLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanLoop {
    pub fn new() -> Self {
        Self {
            task: None,
            epoch: Epoch::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Starts scanning `frames`, stopping any loop already running.
    ///
    /// `on_exit` is called at most once, from the loop task. A loop that is
    /// stopped before it finds a code does not call it.
    pub fn start<F>(&mut self, frames: FrameReceiver, decoder: Arc<dyn FrameDecoder>, on_exit: F)
    where
        F: FnOnce(ScanExit) + Send + 'static,
    {
        self.stop();
        let epoch = self.epoch.clone();
        let stamp = epoch.current();
        log::debug!("scan loop starting");
        self.task = Some(tokio::spawn(run(frames, decoder, epoch, stamp, on_exit)));
    }

    /// Stops the loop. Does nothing when no loop is running.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            self.epoch.advance();
            task.abort();
            log::debug!("scan loop stopped");
        }
    }
}

impl Drop for ScanLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run<F>(
    mut frames: FrameReceiver,
    decoder: Arc<dyn FrameDecoder>,
    epoch: Epoch,
    stamp: u64,
    on_exit: F,
) where
    F: FnOnce(ScanExit) + Send + 'static,
{
    while let Some(frame) = frames.next_frame().await {
        if !epoch.is_current(stamp) {
            return;
        }
        let luma = match to_luma(&frame.image) {
            Ok(luma) => luma,
            Err(error) => {
                log::warn!("frame {}: {}", frame.sequence, error);
                continue;
            }
        };

        let decoder = Arc::clone(&decoder);
        let hit = match spawn_blocking(move || decoder.decode(&luma)).await {
            Ok(hit) => hit,
            Err(error) => {
                log::warn!("frame {}: decode task failed: {}", frame.sequence, error);
                None
            }
        };
        if !epoch.is_current(stamp) {
            return;
        }

        match hit {
            Some(payload) => {
                log::info!("code found in frame {}", frame.sequence);
                on_exit(ScanExit::Hit(payload));
                return;
            }
            None => log::trace!("frame {}: no code", frame.sequence),
        }
    }

    if epoch.is_current(stamp) {
        log::warn!("frame stream ended without a code");
        on_exit(ScanExit::StreamEnded);
    }
}
