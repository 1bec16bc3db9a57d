//! End-to-end scanner tests over rendered QR frames.

use std::time::{Duration, Instant};

use qrcode::{Color, QrCode};
use tally::prelude::*;
use testresult::TestResult;

const FRAME_STEP: Duration = Duration::from_millis(16);

#[derive(Debug)]
struct PosterStream {
    frames: Vec<RasterSurface>,
    next: usize,
}

impl CameraStream for PosterStream {
    fn resolution(&self) -> Option<(u32, u32)> {
        self.frames.first().map(|f| (f.width(), f.height()))
    }

    fn draw_into(&mut self, surface: &mut RasterSurface) -> bool {
        let Some(frame) = self.frames.get(self.next % self.frames.len().max(1)) else {
            return false;
        };

        surface.pixels_mut().copy_from_slice(frame.pixels());

        self.next += 1;

        true
    }

    fn stop(&mut self) {}
}

/// Camera pointed at a poster that cycles through fixed frames.
#[derive(Debug)]
struct PosterCamera {
    frames: Vec<RasterSurface>,
    denied: bool,
}

impl Camera for PosterCamera {
    type Stream = PosterStream;

    fn open(&mut self, _request: &CameraRequest) -> Result<PosterStream, CameraError> {
        if self.denied {
            return Err(CameraError::PermissionDenied);
        }

        Ok(PosterStream {
            frames: self.frames.clone(),
            next: 0,
        })
    }
}

fn render(data: &str, side_modules_padding: usize, scale: usize) -> TestResult<RasterSurface> {
    let code = QrCode::new(data.as_bytes())?;
    let modules = code.width();
    let colors = code.to_colors();
    let side = (modules + side_modules_padding * 2) * scale;

    let mut pixels = Vec::with_capacity(side * side * 4);

    for y in 0..side {
        for x in 0..side {
            let mx = (x / scale).checked_sub(side_modules_padding);
            let my = (y / scale).checked_sub(side_modules_padding);

            let dark = matches!(
                (mx, my),
                (Some(mx), Some(my))
                    if mx < modules && my < modules
                        && colors.get(my * modules + mx) == Some(&Color::Dark)
            );

            let shade = if dark { 0 } else { 255 };

            pixels.extend_from_slice(&[shade, shade, shade, 255]);
        }
    }

    let side = u32::try_from(side)?;

    Ok(RasterSurface::from_rgba(side, side, pixels).ok_or("frame size mismatch")?)
}

fn blank_like(frame: &RasterSurface) -> RasterSurface {
    let mut blank = RasterSurface::new(frame.width(), frame.height());

    blank.pixels_mut().fill(255);

    blank
}

fn run_until_accepted<C: Camera>(
    scanner: &mut Scanner<C>,
    start: Instant,
    max_ticks: u32,
) -> TestResult<(ScannedCode, Duration)> {
    let handle = scanner.start(start)?;
    let mut now = start;

    for _ in 0..max_ticks {
        if let ScanEvent::Accepted(scanned) = scanner.tick(handle, now) {
            return Ok((scanned, now - start));
        }

        now += FRAME_STEP;
    }

    Err("scanner never accepted a code".into())
}

#[test]
fn steady_frame_is_accepted_after_three_throttled_reads() -> TestResult {
    let frame = render(r#"{"type":"coupon","code":"SAVE10"}"#, 4, 4)?;

    let mut scanner = Scanner::new(PosterCamera {
        frames: vec![frame],
        denied: false,
    });

    let (scanned, elapsed) = run_until_accepted(&mut scanner, Instant::now(), 120)?;

    assert_eq!(scanned.code, "SAVE10");
    assert!(
        elapsed >= Duration::from_millis(200),
        "three reads need two full detection intervals, got {elapsed:?}"
    );
    assert!(!scanner.is_scanning());

    Ok(())
}

#[test]
fn intermittent_frames_still_converge() -> TestResult {
    let frame = render("CODE:xyz789", 4, 4)?;
    let blank = blank_like(&frame);

    let mut scanner = Scanner::new(PosterCamera {
        frames: vec![frame, blank.clone(), blank],
        denied: false,
    });

    let (scanned, _) = run_until_accepted(&mut scanner, Instant::now(), 600)?;

    assert_eq!(scanned.raw, "CODE:xyz789");
    assert_eq!(scanned.code, "xyz789");

    Ok(())
}

#[test]
fn denied_camera_ends_the_session() {
    let mut scanner = Scanner::new(PosterCamera {
        frames: Vec::new(),
        denied: true,
    });

    assert_eq!(
        scanner.start(Instant::now()),
        Err(CameraError::PermissionDenied)
    );
    assert!(!scanner.is_scanning());
    assert_eq!(scanner.camera_error(), Some(&CameraError::PermissionDenied));
}
