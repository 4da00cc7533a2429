#![allow(dead_code)]

use {
    base::Vec2,
    certs::{ApiError, Certificate, CertificateIngestion, Id, User},
    image::{Image, LumaImage, PixelFormat},
    scan::{DecodedPayload, DecoderProvider, FrameDecoder},
    std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        time::Duration,
    },
    tokio::sync::Notify,
    video::{CameraSession, CaptureConstraints, CaptureFormat, VideoError, VideoInDevice},
};

pub const WAIT: Duration = Duration::from_secs(10);
pub const PAYLOAD: &str = "CERT-XYZ-123";

#[derive(Default)]
pub struct CameraCounters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

impl CameraCounters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// 1x1 gray frames whose only pixel counts up from 1.
struct ScriptedCamera {
    counters: Arc<CameraCounters>,
    granted: Arc<AtomicBool>,
    interval: Duration,
    fail_after: Option<u8>,
    open: bool,
    produced: u8,
}

impl VideoInDevice for ScriptedCamera {
    fn open(&mut self, _constraints: &CaptureConstraints) -> Result<CaptureFormat, VideoError> {
        if !self.granted.load(Ordering::SeqCst) {
            return Err(VideoError::PermissionDenied("denied by user".to_string()));
        }
        self.open = true;
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(CaptureFormat {
            size: Vec2::new(1, 1),
            format: PixelFormat::Gray8,
            frame_rate: 1.0 / self.interval.as_secs_f32(),
            facing: None,
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
            return Err(VideoError::Stream("not open".to_string()));
        }
        std::thread::sleep(self.interval);
        if self.fail_after.is_some_and(|limit| self.produced >= limit) {
            return Err(VideoError::Stream("unplugged".to_string()));
        }
        self.produced = self.produced.saturating_add(1);
        Ok(Image::new(Vec2::new(1, 1), vec![self.produced], PixelFormat::Gray8))
    }
}

pub struct Camera {
    pub session: CameraSession,
    pub counters: Arc<CameraCounters>,
    pub granted: Arc<AtomicBool>,
}

impl Camera {
    pub fn new() -> Self {
        Self::with(Duration::from_millis(5), None)
    }

    pub fn with(interval: Duration, fail_after: Option<u8>) -> Self {
        let counters = Arc::new(CameraCounters::default());
        let granted = Arc::new(AtomicBool::new(true));
        let session = CameraSession::new({
            let counters = Arc::clone(&counters);
            let granted = Arc::clone(&granted);
            move || {
                Box::new(ScriptedCamera {
                    counters: Arc::clone(&counters),
                    granted: Arc::clone(&granted),
                    interval,
                    fail_after,
                    open: false,
                    produced: 0,
                })
            }
        });
        Self {
            session,
            counters,
            granted,
        }
    }

    /// Every open was matched by a close.
    pub fn is_released(&self) -> bool {
        self.counters.opened() == self.counters.closed()
    }
}

/// Finds `PAYLOAD` in every frame whose pixel is at least `threshold`.
pub struct MarkerDecoder {
    threshold: u8,
    delay: Duration,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub seen: Mutex<Vec<u8>>,
}

impl MarkerDecoder {
    pub fn new(threshold: u8) -> Arc<Self> {
        Self::slow(threshold, Duration::ZERO)
    }

    pub fn never() -> Arc<Self> {
        Self::new(u8::MAX)
    }

    pub fn slow(threshold: u8, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            threshold,
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FrameDecoder for MarkerDecoder {
    fn decode(&self, image: &LumaImage) -> Option<DecodedPayload> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        let value = image.pixel(0, 0);
        self.seen.lock().unwrap().push(value);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (value >= self.threshold).then(|| DecodedPayload::new(PAYLOAD))
    }
}

/// Provider whose load hands out `decoder` right away.
pub fn provider_of(decoder: Arc<MarkerDecoder>) -> Arc<DecoderProvider> {
    Arc::new(DecoderProvider::new(move || {
        let decoder = Arc::clone(&decoder) as Arc<dyn FrameDecoder>;
        async move { Ok(decoder) }
    }))
}

pub fn user() -> User {
    User {
        id: Id::Number(7),
        name: "Demo User".to_string(),
        username: Some("demouser".to_string()),
    }
}

pub fn certificate(id: i64, name: &str) -> Certificate {
    Certificate {
        id: Id::Number(id),
        device_name: name.to_string(),
        wipe_date: "2024-06-01T12:00:00Z".to_string(),
        serial_number: None,
        wipe_method: None,
        status: None,
        user_id: Some(Id::Number(7)),
    }
}

/// Records every ingestion call. With a gate, each call waits for a permit.
pub struct MockIngestion {
    pub calls: Mutex<Vec<(Id, String)>>,
    gate: Option<Arc<Notify>>,
    reject: Option<String>,
}

impl MockIngestion {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            gate: None,
            reject: None,
        })
    }

    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            gate: Some(gate),
            reject: None,
        })
    }

    pub fn rejecting(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            gate: None,
            reject: Some(message.to_string()),
        })
    }

    pub fn calls(&self) -> Vec<(Id, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CertificateIngestion for MockIngestion {
    async fn ingest(&self, user: &User, encrypted_data: &str) -> Result<Certificate, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((user.id.clone(), encrypted_data.to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.reject {
            Some(message) => Err(ApiError::Rejected(message.clone())),
            None => Ok(certificate(99, "Scanned Laptop")),
        }
    }
}
