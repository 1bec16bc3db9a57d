use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use clap::Args;
use tally::{
    frames::{Camera, CameraError, CameraRequest, CameraStream, RasterSurface},
    scanner::Scanner,
};
use tally_app::{desk::RedemptionDesk, session::RedemptionState};

use crate::cli::{redeem::complete, workspace::Workspace};

#[derive(Debug, Args)]
pub(crate) struct ScanArgs {
    /// Image (PNG or JPEG) showing the coupon's QR code
    image: PathBuf,

    /// Commit the redemption after a successful lookup
    #[arg(long)]
    confirm: bool,

    /// Simulated time between animation frames, in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Frames to sample before giving up
    #[arg(long, default_value_t = 300)]
    max_frames: u32,
}

pub(crate) async fn run(workspace: &Workspace, args: ScanArgs) -> Result<(), String> {
    let mut desk = RedemptionDesk::new(
        Scanner::new(StillImageCamera::new(args.image.clone())),
        Arc::clone(&workspace.app.redemptions),
        workspace.business()?,
    );

    let started = Instant::now();

    if let RedemptionState::Failed { message, .. } = desk
        .start_scan(started)
        .map_err(|error| error.to_string())?
    {
        return Err((*message).to_string());
    }

    let frame = Duration::from_millis(args.frame_ms);

    for tick in 0..args.max_frames {
        if let Some(scanned) = desk.tick(started + frame * tick) {
            println!("scanned: {}", scanned.raw);

            return complete(&mut desk, args.confirm).await;
        }
    }

    Err(format!("no QR code found in {}", args.image.display()))
}

/// Camera whose every frame is the same still image.
#[derive(Debug)]
pub(crate) struct StillImageCamera {
    path: Option<PathBuf>,
}

impl StillImageCamera {
    pub(crate) const fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A camera that is never available, for manual entry.
    pub(crate) const fn none() -> Self {
        Self { path: None }
    }
}

impl Camera for StillImageCamera {
    type Stream = StillImageStream;

    fn open(&mut self, _request: &CameraRequest) -> Result<StillImageStream, CameraError> {
        let Some(path) = &self.path else {
            return Err(CameraError::NotFound);
        };

        let image = image::open(path)
            .map_err(|error| CameraError::Unavailable(error.to_string()))?
            .to_rgba8();

        Ok(StillImageStream {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        })
    }
}

pub(crate) struct StillImageStream {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Debug for StillImageStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StillImageStream")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl CameraStream for StillImageStream {
    fn resolution(&self) -> Option<(u32, u32)> {
        (!self.pixels.is_empty()).then_some((self.width, self.height))
    }

    fn draw_into(&mut self, surface: &mut RasterSurface) -> bool {
        let target = surface.pixels_mut();

        if target.len() != self.pixels.len() {
            return false;
        }

        target.copy_from_slice(&self.pixels);

        true
    }

    fn stop(&mut self) {
        self.pixels = Vec::new();
    }
}
