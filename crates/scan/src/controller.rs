use {
    crate::*,
    base::Epoch,
    certs::{CertificateIngestion, User},
    std::sync::{Arc, Mutex, MutexGuard, Weak},
    tokio::sync::{mpsc, watch},
    video::{CameraSession, CaptureConstraints, CaptureResource},
};

struct Session {
    state: ScanState,
    resource: Option<CaptureResource>,
    scan_loop: ScanLoop,
    last_error: Option<ScanError>,
}

struct Inner<I> {
    camera: CameraSession,
    provider: Arc<DecoderProvider>,
    ingestion: Arc<I>,
    user: User,
    constraints: CaptureConstraints,
    // advanced by every open and cancel, stale callbacks compare against it
    epoch: Epoch,
    session: Mutex<Session>,
    state: watch::Sender<ScanState>,
    events: mpsc::UnboundedSender<ScanEvent>,
}

/// One scan-to-certificate session.
///
/// The camera is held only in `Scanning` and, briefly, while a found code is
/// moved to `Decoded`: it is closed in the same step, before ingestion is
/// called. `Closed` is final; a new scan needs a new controller.
///
/// Dropping the controller unmounts it.
pub struct AcquisitionController<I: CertificateIngestion> {
    inner: Arc<Inner<I>>,
}

impl<I: CertificateIngestion> AcquisitionController<I> {
    /// Creates an idle controller. Ingestion results arrive on the returned
    /// receiver, one event per decoded code, even after the controller is
    /// gone.
    pub fn new(
        camera: CameraSession,
        provider: Arc<DecoderProvider>,
        ingestion: Arc<I>,
        user: User,
        constraints: CaptureConstraints,
    ) -> (Self, mpsc::UnboundedReceiver<ScanEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(ScanState::Idle);
        let inner = Arc::new(Inner {
            camera,
            provider,
            ingestion,
            user,
            constraints,
            epoch: Epoch::new(),
            session: Mutex::new(Session {
                state: ScanState::Idle,
                resource: None,
                scan_loop: ScanLoop::new(),
                last_error: None,
            }),
            state,
            events,
        });
        (Self { inner }, receiver)
    }

    pub fn state(&self) -> ScanState {
        self.inner.lock().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.inner.state.subscribe()
    }

    /// The error behind the last `Failed` state or failed ingestion.
    pub fn last_error(&self) -> Option<ScanError> {
        self.inner.lock().last_error.clone()
    }

    /// Loads the decoder, opens the camera and starts scanning.
    ///
    /// Returns the state the request ended in: `Scanning`, `Failed`, or
    /// `Closed` if cancelled meanwhile. Ignored (returning the current state)
    /// while a request is already being served and once closed.
    pub async fn open(&self) -> ScanState {
        let attempt = {
            let mut session = self.inner.lock();
            match &session.state {
                ScanState::Idle | ScanState::Failed(_) => {}
                ScanState::Closed => {
                    log::warn!("open ignored, scan session is closed");
                    return ScanState::Closed;
                }
                busy => {
                    log::debug!("open ignored while {:?}", busy);
                    return busy.clone();
                }
            }
            let attempt = self.inner.epoch.advance();
            session.last_error = None;
            self.inner.transition(&mut session, ScanState::Initializing);
            attempt
        };

        let decoder = match self.inner.provider.ensure_ready().await {
            Ok(decoder) => decoder,
            Err(error) => return self.inner.fail(attempt, error),
        };
        if !self.inner.epoch.is_current(attempt) {
            return self.state();
        }

        let resource = match self.inner.camera.open(&self.inner.constraints).await {
            Ok(resource) => resource,
            Err(error) => return self.inner.fail(attempt, error.into()),
        };
        Inner::start_scanning(&self.inner, attempt, resource, decoder)
    }

    /// User dismissed the scanner.
    ///
    /// Stops the loop and closes the camera before returning. Does nothing
    /// while `Idle` or `Closed`.
    pub fn cancel(&self) {
        let mut session = self.inner.lock();
        if matches!(session.state, ScanState::Idle | ScanState::Closed) {
            log::debug!("cancel: nothing to cancel");
            return;
        }
        self.inner.close(&mut session);
    }

    /// The surrounding UI went away. Closes from any state.
    pub fn unmount(&self) {
        let mut session = self.inner.lock();
        if session.state != ScanState::Closed {
            self.inner.close(&mut session);
        }
    }
}

impl<I: CertificateIngestion> Drop for AcquisitionController<I> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<I: CertificateIngestion> Inner<I> {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, session: &mut Session, next: ScanState) {
        log::info!("scan: {:?} -> {:?}", session.state, next);
        session.state = next.clone();
        self.state.send_replace(next);
    }

    // stops the loop, then closes the camera
    fn release(&self, session: &mut Session) {
        session.scan_loop.stop();
        if let Some(mut resource) = session.resource.take() {
            resource.close();
        }
    }

    fn close(&self, session: &mut Session) {
        self.epoch.advance();
        self.release(session);
        self.transition(session, ScanState::Closed);
    }

    fn fail(&self, attempt: u64, error: ScanError) -> ScanState {
        let mut session = self.lock();
        if !self.epoch.is_current(attempt) || session.state != ScanState::Initializing {
            return session.state.clone();
        }
        log::warn!("scan failed: {}", error);
        self.release(&mut session);
        let kind = error.kind();
        session.last_error = Some(error);
        self.transition(&mut session, ScanState::Failed(kind));
        session.state.clone()
    }

    fn start_scanning(
        inner: &Arc<Self>,
        attempt: u64,
        mut resource: CaptureResource,
        decoder: Arc<dyn FrameDecoder>,
    ) -> ScanState {
        let mut session = inner.lock();
        if !inner.epoch.is_current(attempt) || session.state != ScanState::Initializing {
            log::info!("camera opened after the scan was cancelled, closing it");
            resource.close();
            return session.state.clone();
        }

        let frames = resource.frames();
        session.resource = Some(resource);
        let weak = Arc::downgrade(inner);
        session.scan_loop.start(frames, decoder, move |exit| {
            if let Some(inner) = weak.upgrade() {
                Inner::on_scan_exit(&inner, attempt, exit);
            }
        });
        inner.transition(&mut session, ScanState::Scanning);
        ScanState::Scanning
    }

    fn on_scan_exit(inner: &Arc<Self>, attempt: u64, exit: ScanExit) {
        let mut session = inner.lock();
        if !inner.epoch.is_current(attempt) || session.state != ScanState::Scanning {
            log::debug!("stale scan result dropped");
            return;
        }

        match exit {
            ScanExit::Hit(payload) => {
                inner.transition(&mut session, ScanState::Decoded(payload.clone()));
                inner.release(&mut session);
                drop(session);
                Inner::ingest(inner, attempt, payload);
            }
            ScanExit::StreamEnded => {
                inner.release(&mut session);
                session.last_error = Some(ScanError::new(
                    ErrorKind::DeviceUnavailable,
                    "camera stopped presenting frames",
                ));
                inner.transition(&mut session, ScanState::Failed(ErrorKind::DeviceUnavailable));
            }
        }
    }

    // exactly one ingestion call per decoded payload
    fn ingest(inner: &Arc<Self>, attempt: u64, payload: DecodedPayload) {
        let weak: Weak<Self> = Arc::downgrade(inner);
        let ingestion = Arc::clone(&inner.ingestion);
        let user = inner.user.clone();
        let events = inner.events.clone();
        tokio::spawn(async move {
            let result = ingestion.ingest(&user, payload.as_str()).await;
            let event = match result {
                Ok(certificate) => ScanEvent::Ingested(certificate),
                Err(error) => {
                    log::warn!("ingestion failed: {}", error);
                    ScanEvent::IngestionFailed(error.into())
                }
            };

            if let Some(inner) = weak.upgrade() {
                let mut session = inner.lock();
                if let ScanEvent::IngestionFailed(error) = &event {
                    session.last_error = Some(error.clone());
                }
                if inner.epoch.is_current(attempt) && matches!(session.state, ScanState::Decoded(_)) {
                    inner.transition(&mut session, ScanState::Closed);
                }
            }

            if events.send(event).is_err() {
                log::debug!("nobody is listening for scan events");
            }
        });
    }
}
