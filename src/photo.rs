//! Loaded photograph wrapper and PNG plumbing

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::RgbaImage;
use thiserror::Error;

/// Which overlay slot a photo occupies. The golf positions give the slots
/// their user-facing names: P-1 is address, P-7 is impact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhotoSlot {
    Reference,
    Target,
}

impl fmt::Display for PhotoSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhotoSlot::Reference => "P-1",
            PhotoSlot::Target => "P-7",
        })
    }
}

/// Errors loading, decoding or persisting photos
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("PNG encode error: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("not a base64 image data URL")]
    BadDataUrl,
    #[error("base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A decoded photograph with its natural pixel size and, when it came from
/// disk, the path it was loaded from.
#[derive(Clone, Debug)]
pub struct Photo {
    rgba: RgbaImage,
    source: Option<PathBuf>,
}

impl Photo {
    /// Decode a photo from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PhotoError> {
        let path = path.as_ref();
        let rgba = image::open(path)?.to_rgba8();
        log::debug!(
            "loaded {} ({}x{})",
            path.display(),
            rgba.width(),
            rgba.height()
        );
        Ok(Self {
            rgba,
            source: Some(path.to_path_buf()),
        })
    }

    /// Wrap an already-decoded raster
    pub fn from_rgba(rgba: RgbaImage) -> Self {
        Self { rgba, source: None }
    }

    /// Decode a `data:image/...;base64,` URL, as stored in session files
    pub fn from_data_url(url: &str) -> Result<Self, PhotoError> {
        let rest = url.strip_prefix("data:").ok_or(PhotoError::BadDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(PhotoError::BadDataUrl)?;
        if !header.ends_with(";base64") {
            return Err(PhotoError::BadDataUrl);
        }
        let bytes = STANDARD.decode(payload.trim())?;
        let rgba = image::load_from_memory(&bytes)?.to_rgba8();
        Ok(Self { rgba, source: None })
    }

    /// Encode as a PNG data URL for embedding in a session file
    pub fn to_data_url(&self) -> Result<String, PhotoError> {
        let mut buffer = Vec::new();
        write_png(&mut buffer, &self.rgba)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(&buffer)))
    }

    /// Write the photo to disk as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), PhotoError> {
        let path = path.as_ref();
        let mut file = File::create(path)?;
        write_png(&mut file, &self.rgba)?;
        log::info!("saved {}", path.display());
        Ok(())
    }

    /// The decoded pixels
    pub fn rgba(&self) -> &RgbaImage {
        &self.rgba
    }

    /// Natural width in pixels
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Natural height in pixels
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Natural size as a pair
    pub fn dimensions(&self) -> (u32, u32) {
        (self.rgba.width(), self.rgba.height())
    }

    /// Where the photo was loaded from, if it came from disk
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Record the path this photo should be identified by
    pub fn set_source(&mut self, path: PathBuf) {
        self.source = Some(path);
    }
}

/// Encode RGBA pixels as a PNG stream
pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}
