use {
    crate::*,
    image::{Image, is_still_image, load_image},
    std::{
        fs,
        path::{Path, PathBuf},
        time::{Duration, Instant},
    },
};

// presentation rate when the constraints do not ask for one
const DEFAULT_FRAME_RATE: f32 = 10.0;

/// Replays the still images of a directory as a camera, in file name order.
pub struct StillCamera {
    frames: Vec<Image>,
    next: usize,
    interval: Duration,
    last_capture: Option<Instant>,
}

impl Default for StillCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl StillCamera {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            next: 0,
            interval: Duration::ZERO,
            last_capture: None,
        }
    }

    fn list(dir: &Path) -> Result<Vec<PathBuf>, VideoError> {
        let mut paths = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_still_image(path))
            .collect::<Vec<_>>();
        paths.sort();
        Ok(paths)
    }
}

impl VideoInDevice for StillCamera {
    fn open(&mut self, constraints: &CaptureConstraints) -> Result<CaptureFormat, VideoError> {
        self.close();

        let dir = constraints.device().ok_or_else(|| {
            VideoError::Unavailable("no frame directory configured".to_string())
        })?;
        let paths = Self::list(dir)?;
        if paths.is_empty() {
            return Err(VideoError::Unavailable(format!(
                "no images in {}",
                dir.display()
            )));
        }

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            fs::File::open(path)?;
            let image = load_image(path)
                .map_err(|e| VideoError::Unavailable(format!("{}: {}", path.display(), e)))?;
            frames.push(image);
        }

        // rates whose interval does not fit a Duration fall back to the default
        let (frame_rate, interval) = constraints
            .frame_rate()
            .filter(|rate| *rate > 0.0)
            .and_then(|rate| {
                Duration::try_from_secs_f32(1.0 / rate)
                    .ok()
                    .map(|interval| (rate, interval))
            })
            .unwrap_or((
                DEFAULT_FRAME_RATE,
                Duration::from_secs_f32(1.0 / DEFAULT_FRAME_RATE),
            ));
        let first = &frames[0];
        let format = CaptureFormat {
            size: first.size,
            format: first.format,
            frame_rate,
            facing: None,
        };

        self.frames = frames;
        self.interval = interval;
        Ok(format)
    }

    fn close(&mut self) {
        self.frames.clear();
        self.next = 0;
        self.last_capture = None;
    }

    fn blocking_capture(&mut self) -> Result<Image, VideoError> {
        if self.frames.is_empty() {
            return Err(VideoError::Stream("still camera is not open".to_string()));
        }

        // present frames at the configured rate
        if let Some(last) = self.last_capture {
            let due = last + self.interval;
            let now = Instant::now();
            if due > now {
                std::thread::sleep(due - now);
            }
        }
        self.last_capture = Some(Instant::now());

        let image = self.frames[self.next % self.frames.len()].clone();
        self.next += 1;
        Ok(image)
    }
}
