use {
    crate::*,
    futures_util::future::{BoxFuture, FutureExt, Shared},
    std::{
        future::Future,
        sync::{
            Arc, Mutex, OnceLock,
            atomic::{AtomicU64, Ordering},
        },
    },
    tokio::task::spawn_blocking,
};

type LoadResult = Result<Arc<dyn FrameDecoder>, ScanError>;
type Loader = Box<dyn Fn() -> BoxFuture<'static, LoadResult> + Send + Sync>;

enum LoadState {
    Idle,
    Loading {
        attempt: u64,
        load: Shared<BoxFuture<'static, LoadResult>>,
    },
    Ready(Arc<dyn FrameDecoder>),
}

static GLOBAL: OnceLock<Arc<DecoderProvider>> = OnceLock::new();

/// Loads a decoder once and hands it out from then on.
///
/// Callers that arrive while a load is in flight wait for that same load
/// and see its result, success or failure. After a failure the next call
/// starts a fresh load.
pub struct DecoderProvider {
    loader: Loader,
    state: Mutex<LoadState>,
    attempts: AtomicU64,
}

impl DecoderProvider {
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn FrameDecoder>, String>> + Send + 'static,
    {
        Self {
            loader: Box::new(move || {
                loader()
                    .map(|result| {
                        result.map_err(|detail| ScanError::new(ErrorKind::DecoderLoadFailed, detail))
                    })
                    .boxed()
            }),
            state: Mutex::new(LoadState::Idle),
            attempts: AtomicU64::new(0),
        }
    }

    /// Provider of the rqrr based `QrDecoder`.
    pub fn qr(options: DecodeOptions) -> Self {
        Self::new(move || {
            let options = options.clone();
            async move {
                spawn_blocking(move || Arc::new(QrDecoder::new(options)) as Arc<dyn FrameDecoder>)
                    .await
                    .map_err(|e| format!("decoder load task failed: {e}"))
            }
        })
    }

    /// The process-wide QR decoder provider.
    pub fn global() -> Arc<DecoderProvider> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::qr(DecodeOptions::default()))))
    }

    pub fn is_ready(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(|e| e.into_inner()),
            LoadState::Ready(_)
        )
    }

    /// Number of loads started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Acquire)
    }

    pub async fn ensure_ready(&self) -> Result<Arc<dyn FrameDecoder>, ScanError> {
        let (attempt, load) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            match &*state {
                LoadState::Ready(decoder) => return Ok(Arc::clone(decoder)),
                LoadState::Loading { attempt, load } => (*attempt, load.clone()),
                LoadState::Idle => {
                    let attempt = self.attempts.fetch_add(1, Ordering::AcqRel) + 1;
                    log::info!("loading decoder, attempt {}", attempt);
                    let load = (self.loader)().shared();
                    *state = LoadState::Loading {
                        attempt,
                        load: load.clone(),
                    };
                    (attempt, load)
                }
            }
        };

        let result = load.await;

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let settles = matches!(&*state, LoadState::Loading { attempt: current, .. } if *current == attempt);
        if settles {
            *state = match &result {
                Ok(decoder) => {
                    log::info!("decoder ready");
                    LoadState::Ready(Arc::clone(decoder))
                }
                Err(error) => {
                    log::error!("decoder load failed: {}", error);
                    LoadState::Idle
                }
            };
        }
        result
    }
}
