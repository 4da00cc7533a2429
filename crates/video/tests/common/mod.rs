#![allow(dead_code)]

use {
    base::Vec2,
    image::{Image, PixelFormat},
    std::{
        sync::{
            Arc,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        time::Duration,
    },
    video::{CameraSession, CaptureConstraints, CaptureFormat, FacingMode, VideoError, VideoInDevice},
};

#[derive(Default)]
pub struct Counters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub captured: AtomicUsize,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Camera that presents 1x1 gray frames whose pixel is the frame number.
pub struct FakeCamera {
    counters: Arc<Counters>,
    granted: Arc<AtomicBool>,
    interval: Duration,
    fail_after: Option<usize>,
    facing: Option<FacingMode>,
    open: bool,
    produced: usize,
}

impl VideoInDevice for FakeCamera {
    fn open(&mut self, _constraints: &CaptureConstraints) -> Result<CaptureFormat, VideoError> {
        if !self.granted.load(Ordering::SeqCst) {
            return Err(VideoError::PermissionDenied("user dismissed the prompt".to_string()));
        }
        self.open = true;
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(CaptureFormat {
            size: Vec2::new(1, 1),
            format: PixelFormat::Gray8,
            frame_rate: 1.0 / self.interval.as_secs_f32(),
            facing: self.facing,
        })
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn blocking_capture(&mut self) -> Result<Image, VideoError> {
        if !self.open {
            return Err(VideoError::Stream("closed".to_string()));
        }
        std::thread::sleep(self.interval);
        if self.fail_after.is_some_and(|limit| self.produced >= limit) {
            return Err(VideoError::Stream("cable pulled".to_string()));
        }
        self.produced += 1;
        self.counters.captured.fetch_add(1, Ordering::SeqCst);
        Ok(Image::new(
            Vec2::new(1, 1),
            vec![self.produced as u8],
            PixelFormat::Gray8,
        ))
    }
}

pub struct FakeRig {
    pub counters: Arc<Counters>,
    pub granted: Arc<AtomicBool>,
    pub session: CameraSession,
}

pub fn rig() -> FakeRig {
    rig_with(Duration::from_millis(5), None, Some(FacingMode::Environment))
}

pub fn rig_with(
    interval: Duration,
    fail_after: Option<usize>,
    facing: Option<FacingMode>,
) -> FakeRig {
    let counters = Arc::new(Counters::default());
    let granted = Arc::new(AtomicBool::new(true));
    let session = CameraSession::new({
        let counters = Arc::clone(&counters);
        let granted = Arc::clone(&granted);
        move || {
            Box::new(FakeCamera {
                counters: Arc::clone(&counters),
                granted: Arc::clone(&granted),
                interval,
                fail_after,
                facing,
                open: false,
                produced: 0,
            })
        }
    });
    FakeRig {
        counters,
        granted,
        session,
    }
}
