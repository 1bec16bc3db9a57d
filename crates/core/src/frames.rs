//! Camera frames and the off-screen raster surface they are sampled into.

use std::fmt::Debug;

use thiserror::Error;
use tracing::{debug, info, warn};

/// Bytes per pixel in a [`RasterSurface`] (RGBA8).
pub const BYTES_PER_PIXEL: usize = 4;

/// Off-screen RGBA8 pixel buffer that camera frames are drawn into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterSurface {
    /// Create a zero-filled surface of the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut surface = Self::default();

        surface.resize(width, height);

        surface
    }

    /// Wrap an existing RGBA8 buffer.
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == buffer_len(width, height)?).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Resize the surface, re-allocating only when the dimensions change.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height && !self.pixels.is_empty() {
            return;
        }

        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(buffer_len(width, height).unwrap_or(0), 0);
    }

    /// Surface width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access to the RGBA8 pixels, for camera streams drawing into the surface.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Whether the surface holds no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Convert the surface to 8-bit luma.
    #[must_use]
    pub fn luma(&self) -> Vec<u8> {
        rgba_to_luma(&self.pixels)
    }
}

/// Convert RGBA8 pixels to 8-bit luma using integer BT.601 weights.
#[must_use]
pub fn rgba_to_luma(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(BYTES_PER_PIXEL)
        .map(|px| match px {
            [r, g, b, _] => {
                let luma = (u32::from(*r) * 299 + u32::from(*g) * 587 + u32::from(*b) * 114) / 1000;

                u8::try_from(luma).unwrap_or(u8::MAX)
            }
            _ => 0,
        })
        .collect()
}

pub(crate) fn buffer_len(width: u32, height: u32) -> Option<usize> {
    let width = usize::try_from(width).ok()?;
    let height = usize::try_from(height).ok()?;

    width.checked_mul(height)?.checked_mul(BYTES_PER_PIXEL)
}

/// Which physical camera to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Rear camera, pointed away from the operator.
    #[default]
    Environment,

    /// Front camera.
    User,
}

/// Camera acquisition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraRequest {
    /// Requested camera.
    pub facing: Facing,

    /// Preferred capture width; the stream may deliver another resolution.
    pub preferred_width: u32,

    /// Preferred capture height; the stream may deliver another resolution.
    pub preferred_height: u32,
}

impl Default for CameraRequest {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            preferred_width: 1280,
            preferred_height: 720,
        }
    }
}

/// Errors raised while acquiring a camera.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// The operator (or platform policy) denied camera access.
    #[error("camera permission denied")]
    PermissionDenied,

    /// No camera matching the request exists.
    #[error("no camera found")]
    NotFound,

    /// The camera exists but could not be opened.
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

impl CameraError {
    /// Message suitable for showing to the operator.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Camera access was denied. Allow camera access and start the scanner again."
            }
            Self::NotFound => "No camera was found on this device.",
            Self::Unavailable(_) => "The camera could not be started. Try again.",
        }
    }
}

/// A device that can hand out live video streams.
pub trait Camera {
    /// Stream type produced by this camera.
    type Stream: CameraStream;

    /// Acquire a stream for the given request.
    ///
    /// # Errors
    ///
    /// Returns a [`CameraError`] when access is denied or no device can be opened.
    fn open(&mut self, request: &CameraRequest) -> Result<Self::Stream, CameraError>;
}

/// A live video stream.
pub trait CameraStream: Debug {
    /// Native resolution of the stream, once known.
    fn resolution(&self) -> Option<(u32, u32)>;

    /// Draw the current frame into `surface`, which has already been sized to
    /// [`CameraStream::resolution`]. Returns `false` when no frame is ready yet.
    fn draw_into(&mut self, surface: &mut RasterSurface) -> bool;

    /// Stop all tracks and release the device.
    fn stop(&mut self);
}

/// Copies frames from a camera stream into an off-screen surface.
#[derive(Debug)]
pub struct FrameSampler<C: Camera> {
    camera: C,
    request: CameraRequest,
    stream: Option<C::Stream>,
    surface: RasterSurface,
    error: Option<CameraError>,
}

impl<C: Camera> FrameSampler<C> {
    /// Create a sampler requesting the default (rear, 1280x720) camera.
    pub fn new(camera: C) -> Self {
        Self::with_request(camera, CameraRequest::default())
    }

    /// Create a sampler with an explicit camera request.
    pub fn with_request(camera: C, request: CameraRequest) -> Self {
        Self {
            camera,
            request,
            stream: None,
            surface: RasterSurface::default(),
            error: None,
        }
    }

    /// Acquire a fresh stream, tearing down any existing one first.
    ///
    /// A failure is terminal for the session: it is recorded and no retry is attempted.
    ///
    /// # Errors
    ///
    /// Returns the [`CameraError`] reported by the camera.
    pub fn start(&mut self) -> Result<(), CameraError> {
        self.stop();
        self.error = None;

        match self.camera.open(&self.request) {
            Ok(stream) => {
                info!(resolution = ?stream.resolution(), "camera stream started");

                self.stream = Some(stream);

                Ok(())
            }
            Err(error) => {
                warn!(%error, "camera acquisition failed");

                self.error = Some(error.clone());

                Err(error)
            }
        }
    }

    /// Draw the current frame into the surface at the stream's native resolution.
    ///
    /// Returns `None` when not running or when the stream has no frame ready.
    pub fn sample(&mut self) -> Option<&RasterSurface> {
        let stream = self.stream.as_mut()?;
        let (width, height) = stream.resolution()?;

        if width == 0 || height == 0 {
            return None;
        }

        self.surface.resize(width, height);

        if !stream.draw_into(&mut self.surface) {
            return None;
        }

        Some(&self.surface)
    }

    /// Stop all tracks and drop the stream. Safe to call when already stopped.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();

            debug!("camera stream stopped");
        }
    }

    /// Whether a stream is currently held.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// The terminal acquisition error of the current session, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&CameraError> {
        self.error.as_ref()
    }

    /// The surface as last drawn.
    #[must_use]
    pub const fn surface(&self) -> &RasterSurface {
        &self.surface
    }
}

impl<C: Camera> Drop for FrameSampler<C> {
    fn drop(&mut self) {
        self.stop();
    }
}
