use {
    crate::*,
    base::Vec2,
    image::{Image, PixelFormat},
    std::time::Duration,
    v4l::{
        Device, Format, FourCC, buffer::Type, io::mmap::Stream as MmapStream,
        io::traits::CaptureStream, video::Capture,
    },
};

// number of mmap buffers queued on the device
const BUFFER_COUNT: u32 = 4;

// frame intervals a capture may wait before it fails
const TIMEOUT_FRAMES: f32 = 5.0;

// lower bound on the capture timeout
const MIN_TIMEOUT_MS: u64 = 500;

pub(crate) struct V4l2 {
    stream: Option<MmapStream<'static>>,
    size: Vec2<usize>,
    format: PixelFormat,
}

impl V4l2 {
    pub fn new() -> Self {
        Self {
            stream: None,
            size: Vec2::new(0, 0),
            format: PixelFormat::Yuyv,
        }
    }
}

impl VideoInDevice for V4l2 {
    fn open(&mut self, constraints: &CaptureConstraints) -> Result<CaptureFormat, VideoError> {
        self.close();

        // V4L2 has no notion of facing, the first node is the best guess
        let device = match constraints.device() {
            Some(path) => Device::with_path(path)?,
            None => Device::new(0)?,
        };
        let current = Capture::format(&device)?;

        let size = constraints.size().unwrap_or(Vec2::new(
            current.width as usize,
            current.height as usize,
        ));

        // YUYV carries luma directly, MJPEG is the fallback most webcams offer
        let mut actual = Capture::set_format(
            &device,
            &Format::new(size.x as u32, size.y as u32, FourCC::new(b"YUYV")),
        )?;
        if actual.fourcc != FourCC::new(b"YUYV") {
            actual = Capture::set_format(
                &device,
                &Format::new(size.x as u32, size.y as u32, FourCC::new(b"MJPG")),
            )?;
        }
        self.format = match &actual.fourcc.repr {
            b"YUYV" => PixelFormat::Yuyv,
            b"MJPG" => PixelFormat::Jpeg,
            _ => {
                return Err(VideoError::Unavailable(format!(
                    "unsupported pixel format: {}",
                    actual.fourcc
                )));
            }
        };
        self.size = Vec2::new(actual.width as usize, actual.height as usize);

        let frame_rate = match constraints.frame_rate().filter(|rate| *rate >= 1.0) {
            Some(frame_rate) => {
                let params = Capture::set_params(
                    &device,
                    &v4l::video::capture::Parameters::with_fps(frame_rate as u32),
                )?;
                params.interval.denominator as f32 / params.interval.numerator.max(1) as f32
            }
            None => {
                let params = Capture::params(&device)?;
                params.interval.denominator as f32 / params.interval.numerator.max(1) as f32
            }
        };

        let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
            .map_err(|e| VideoError::Unavailable(e.to_string()))?;

        // a camera that stops delivering fails the capture instead of hanging it
        let timeout = Duration::try_from_secs_f32(TIMEOUT_FRAMES / frame_rate)
            .unwrap_or_default()
            .max(Duration::from_millis(MIN_TIMEOUT_MS));
        stream.set_timeout(timeout);
        self.stream = Some(stream);

        Ok(CaptureFormat {
            size: self.size,
            format: self.format,
            frame_rate,
            facing: None,
        })
    }

    fn close(&mut self) {
        // dropping the stream stops streaming and unmaps the buffers
        self.stream.take();
    }

    fn blocking_capture(&mut self) -> Result<Image, VideoError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| VideoError::Stream("no stream".to_string()))?;
        let (data, _metadata) =
            CaptureStream::next(stream).map_err(|e| VideoError::Stream(e.to_string()))?;
        Ok(Image::new(self.size, data.to_vec(), self.format))
    }
}
