use {crate::*, image::LumaImage};

/// Finds a QR symbol in a frame.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, image: &LumaImage) -> Option<DecodedPayload>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inversion {
    /// Only look for dark modules on a light background.
    #[default]
    DontInvert,
    /// Also try the inverted frame when nothing was found.
    AttemptBoth,
}

#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    inversion: Inversion,
}

impl DecodeOptions {
    pub fn with_inversion(mut self, inversion: Inversion) -> Self {
        self.inversion = inversion;
        self
    }

    pub fn inversion(&self) -> Inversion {
        self.inversion
    }
}

pub struct QrDecoder {
    options: DecodeOptions,
}

impl QrDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    fn scan(image: &LumaImage) -> Option<DecodedPayload> {
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(image.width(), image.height(), |x, y| {
                image.pixel(x, y)
            });
        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_, content)) => return Some(DecodedPayload::new(content)),
                Err(error) => log::trace!("skipping undecodable grid: {:?}", error),
            }
        }
        None
    }
}

impl FrameDecoder for QrDecoder {
    fn decode(&self, image: &LumaImage) -> Option<DecodedPayload> {
        if image.size.is_empty() {
            return None;
        }
        match Self::scan(image) {
            Some(payload) => Some(payload),
            None if self.options.inversion == Inversion::AttemptBoth => Self::scan(&image.inverted()),
            None => None,
        }
    }
}
