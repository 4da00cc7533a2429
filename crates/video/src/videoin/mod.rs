use {
    crate::*,
    image::Image,
    std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
            mpsc::{self, RecvTimeoutError},
        },
        time::Duration,
    },
    tokio::{sync::watch, task::spawn_blocking},
};

// consecutive capture failures before the worker gives up on the device
const MAX_CAPTURE_FAILURES: usize = 5;

// delay before retrying a failed capture
const WAIT_AFTER_FAILURE_MS: u64 = 100;

// how long close waits for a capture in flight before handing the close to the worker
const CLOSE_WAIT_MS: u64 = 250;

/// A camera backend.
///
/// All methods run on tokio's blocking pool, never on a runtime thread.
pub trait VideoInDevice: Send {
    fn open(&mut self, constraints: &CaptureConstraints) -> Result<CaptureFormat, VideoError>; // open the device, return what it actually delivers
    fn close(&mut self); // stop all streams, safe to call repeatedly or after a failed open
    fn blocking_capture(&mut self) -> Result<Image, VideoError>; // wait for the next frame
}

type DeviceFactory = Arc<dyn Fn() -> Box<dyn VideoInDevice> + Send + Sync>;

// closes the device when dropped
struct DeviceGuard {
    device: Box<dyn VideoInDevice>,
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        self.device.close();
    }
}

// holds the session's exclusive claim on the camera until dropped
struct Claim {
    claimed: Arc<AtomicBool>,
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.claimed.store(false, Ordering::Release);
    }
}

// result of the blocking open, fields drop in order: device first, then the claim
struct Opening {
    guard: DeviceGuard,
    claim: Claim,
    result: Result<CaptureFormat, VideoError>,
}

type FrameSlot = Option<Arc<VideoFrame>>;

/// Acquires and releases the camera.
///
/// Clones share one claim, so at most one `CaptureResource` is live across
/// all of them.
#[derive(Clone)]
pub struct CameraSession {
    factory: DeviceFactory,
    claimed: Arc<AtomicBool>,
}

impl CameraSession {
    /// Session over devices built by `factory`, one device per `open`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn VideoInDevice> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            claimed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Session that replays the images of the directory named in the constraints.
    pub fn still() -> Self {
        Self::new(|| Box::new(still::StillCamera::new()))
    }

    #[cfg(feature = "v4l2")]
    pub fn v4l2() -> Self {
        Self::new(|| Box::new(v4l2::V4l2::new()))
    }

    /// True while a resource from this session is open or being opened.
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Opens the camera.
    ///
    /// Suspends while the device is opened on the blocking pool, which is
    /// where a platform permission prompt would block. On failure the
    /// device is closed before the error is returned. If the returned
    /// future is dropped mid-open, the device is closed as soon as the open
    /// finishes.
    pub async fn open(&self, constraints: &CaptureConstraints) -> Result<CaptureResource, VideoError> {
        if self.claimed.swap(true, Ordering::AcqRel) {
            return Err(VideoError::Unavailable(
                "camera is already in use".to_string(),
            ));
        }
        let claim = Claim {
            claimed: Arc::clone(&self.claimed),
        };
        let mut guard = DeviceGuard {
            device: (self.factory)(),
        };

        let requested = constraints.clone();
        let Opening {
            guard,
            claim,
            result,
        } = spawn_blocking(move || {
            let result = guard.device.open(&requested);
            Opening {
                guard,
                claim,
                result,
            }
        })
        .await
        .map_err(|e| VideoError::Unavailable(format!("camera open task failed: {e}")))?;

        let format = match result {
            Ok(format) => format,
            Err(error) => {
                log::warn!("camera open failed: {}", error);
                drop(guard);
                drop(claim);
                return Err(error);
            }
        };

        // facing is a hint, any camera is better than none
        if format.facing != Some(constraints.facing()) {
            log::info!(
                "requested {:?} camera, continuing with {:?}",
                constraints.facing(),
                format.facing
            );
        }
        log::info!(
            "camera open: {} {:?} at {} fps",
            format.size,
            format.format,
            format.frame_rate
        );

        Ok(CaptureResource::start(guard, claim, format))
    }
}

/// An open camera stream, exclusively owned.
///
/// The device belongs to a capture worker on the blocking pool. `close`
/// stops the worker and waits up to `CLOSE_WAIT_MS` for it to close the
/// device. A capture that is stuck past that closes the device as soon as
/// it returns, and the session stays claimed until then. Dropping closes too.
pub struct CaptureResource {
    live: Arc<AtomicBool>,
    receiver: watch::Receiver<FrameSlot>,
    format: CaptureFormat,
    released: Option<mpsc::Receiver<()>>,
}

impl CaptureResource {
    fn start(guard: DeviceGuard, claim: Claim, format: CaptureFormat) -> Self {
        let live = Arc::new(AtomicBool::new(true));
        let (sender, receiver) = watch::channel::<FrameSlot>(None);
        let (released_sender, released) = mpsc::channel();
        spawn_worker(
            Worker {
                guard,
                claim,
                sender,
                released: released_sender,
            },
            Arc::clone(&live),
        );
        Self {
            live,
            receiver,
            format,
            released: Some(released),
        }
    }

    pub fn format(&self) -> &CaptureFormat {
        &self.format
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// A consumer of the frames this resource presents.
    pub fn frames(&self) -> FrameReceiver {
        FrameReceiver {
            receiver: self.receiver.clone(),
            live: Arc::clone(&self.live),
        }
    }

    /// Stops the stream and closes the device. Idempotent, never blocks
    /// longer than `CLOSE_WAIT_MS`.
    pub fn close(&mut self) {
        self.live.store(false, Ordering::Release);
        let Some(released) = self.released.take() else {
            return;
        };
        match released.recv_timeout(Duration::from_millis(CLOSE_WAIT_MS)) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("camera busy in a capture, closing it when the capture returns");
            }
        }
    }
}

impl Drop for CaptureResource {
    fn drop(&mut self) {
        self.close();
    }
}

// everything the capture worker owns, released in field order once it stops
struct Worker {
    guard: DeviceGuard,
    claim: Claim,
    sender: watch::Sender<FrameSlot>,
    released: mpsc::Sender<()>,
}

impl Worker {
    fn finish(self) {
        let Worker {
            guard,
            claim,
            sender,
            released,
        } = self;
        drop(guard);
        log::info!("camera closed");
        drop(claim);
        released.send(()).ok();
        // the stream ends only after the device is closed
        drop(sender);
    }
}

fn spawn_worker(mut worker: Worker, live: Arc<AtomicBool>) {
    spawn_blocking(move || {
        let mut sequence = 0u64;
        let mut failures = 0usize;
        while live.load(Ordering::Acquire) {
            match worker.guard.device.blocking_capture() {
                Ok(image) => {
                    failures = 0;
                    sequence += 1;
                    if live.load(Ordering::Acquire) {
                        worker
                            .sender
                            .send_replace(Some(Arc::new(VideoFrame { image, sequence })));
                    }
                }
                Err(error) => {
                    failures += 1;
                    if failures >= MAX_CAPTURE_FAILURES {
                        log::error!(
                            "capture worker: giving up after {} failures: {}",
                            failures,
                            error
                        );
                        break;
                    }
                    log::warn!("capture worker: capture failed: {}", error);
                    std::thread::sleep(Duration::from_millis(WAIT_AFTER_FAILURE_MS));
                }
            }
        }
        log::debug!("capture worker: exiting after {} frames", sequence);
        worker.finish();
    });
}

/// Receives the frames a `CaptureResource` presents.
///
/// Only the latest frame is kept. A consumer that is slower than the camera
/// sees every frame at most once and never waits on a backlog.
#[derive(Clone)]
pub struct FrameReceiver {
    receiver: watch::Receiver<FrameSlot>,
    live: Arc<AtomicBool>,
}

impl FrameReceiver {
    /// True once the camera has presented at least one frame.
    pub fn has_enough_data(&self) -> bool {
        self.live.load(Ordering::Acquire) && self.receiver.borrow().is_some()
    }

    /// Waits for a frame newer than the last one returned.
    ///
    /// Returns `None` once the resource is closed or the stream has ended.
    pub async fn next_frame(&mut self) -> Option<Arc<VideoFrame>> {
        loop {
            if !self.live.load(Ordering::Acquire) {
                return None;
            }
            if self.receiver.changed().await.is_err() {
                return None;
            }
            if !self.live.load(Ordering::Acquire) {
                return None;
            }
            if let Some(frame) = self.receiver.borrow_and_update().clone() {
                return Some(frame);
            }
        }
    }
}

pub mod still;

#[cfg(feature = "v4l2")]
pub mod v4l2;
