//! Per-tick scanning loop: sample, throttle, decode, debounce, extract.

use std::time::Instant;

use tracing::{debug, info};

use crate::{
    debounce::{DebounceConfig, Debouncer},
    decoder::{FrameDecoder, QrDecoder},
    extract::extract_payload,
    frames::{Camera, CameraError, FrameSampler},
};

/// Cancellation token for one scan session.
///
/// Every [`Scanner::start`] invalidates the previous handle, so a tick scheduled by an
/// earlier session can never sample a released camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

/// A code accepted by the scanner (or typed in by the operator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedCode {
    /// Raw decoded payload.
    pub raw: String,

    /// Canonical coupon code extracted from `raw`.
    pub code: String,

    /// Customer identifier embedded in the payload, if any.
    pub customer_hint: Option<String>,
}

impl ScannedCode {
    /// Build from a raw payload.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let payload = extract_payload(&raw);

        Self {
            raw,
            code: payload.code,
            customer_hint: payload.customer_hint,
        }
    }

    /// Build from a code typed in by the operator.
    #[must_use]
    pub fn manual(input: &str) -> Self {
        Self::from_raw(input.trim())
    }
}

/// Outcome of one [`Scanner::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// The handle no longer belongs to the running session.
    Cancelled,

    /// The camera had no frame ready.
    NoFrame,

    /// A frame was sampled but the detection interval has not elapsed.
    Throttled,

    /// Detection ran and found nothing.
    NoCode,

    /// A value was read but is not yet confirmed.
    Observed {
        /// Decoded value.
        value: String,

        /// Reads of `value` in the current window.
        count: u32,
    },

    /// A value reached the confidence threshold; the session has ended.
    Accepted(ScannedCode),
}

/// Drives one camera through the decode pipeline, one animation tick at a time.
#[derive(Debug)]
pub struct Scanner<C: Camera, D: FrameDecoder = QrDecoder> {
    sampler: FrameSampler<C>,
    decoder: D,
    debouncer: Debouncer,
    generation: u64,
    active: Option<TickHandle>,
}

impl<C: Camera> Scanner<C> {
    /// Scanner using the QR decoder and default debounce settings.
    pub fn new(camera: C) -> Self {
        Self::with_decoder(FrameSampler::new(camera), QrDecoder, DebounceConfig::default())
    }
}

impl<C: Camera, D: FrameDecoder> Scanner<C, D> {
    /// Scanner with explicit parts.
    pub fn with_decoder(sampler: FrameSampler<C>, decoder: D, config: DebounceConfig) -> Self {
        Self {
            sampler,
            decoder,
            debouncer: Debouncer::new(config),
            generation: 0,
            active: None,
        }
    }

    /// Start a new session, fully tearing down the previous one first.
    ///
    /// # Errors
    ///
    /// Returns the [`CameraError`] when the camera cannot be acquired; the session is then over.
    pub fn start(&mut self, now: Instant) -> Result<TickHandle, CameraError> {
        self.stop();

        self.generation += 1;

        self.sampler.start()?;
        self.debouncer.start(now);

        let handle = TickHandle(self.generation);

        self.active = Some(handle);

        info!(generation = self.generation, "scan session started");

        Ok(handle)
    }

    /// Animation-frame callback.
    pub fn tick(&mut self, handle: TickHandle, now: Instant) -> ScanEvent {
        if self.active != Some(handle) {
            return ScanEvent::Cancelled;
        }

        let Some(frame) = self.sampler.sample() else {
            return ScanEvent::NoFrame;
        };

        if !self.debouncer.ready(now) {
            return ScanEvent::Throttled;
        }

        let Some(value) = self.decoder.decode(frame) else {
            return ScanEvent::NoCode;
        };

        match self.debouncer.observe(&value, now) {
            Some(accepted) => {
                self.release();

                let scanned = ScannedCode::from_raw(accepted);

                info!(code = %scanned.code, "code accepted");

                ScanEvent::Accepted(scanned)
            }
            None => ScanEvent::Observed {
                count: self.debouncer.count(&value),
                value,
            },
        }
    }

    /// Cancel the session: invalidate the handle, release the camera, clear counts.
    pub fn stop(&mut self) {
        self.debouncer.reset();
        self.release();
    }

    /// Whether a session is running.
    #[must_use]
    pub const fn is_scanning(&self) -> bool {
        self.active.is_some()
    }

    /// The acquisition error that ended the last session, if any.
    #[must_use]
    pub const fn camera_error(&self) -> Option<&CameraError> {
        self.sampler.error()
    }

    fn release(&mut self) {
        if self.active.take().is_some() {
            debug!(generation = self.generation, "scan session released");
        }

        self.sampler.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

    use testresult::TestResult;

    use crate::frames::{CameraRequest, CameraStream, RasterSurface};

    use super::*;

    #[derive(Debug)]
    struct StubStream;

    impl CameraStream for StubStream {
        fn resolution(&self) -> Option<(u32, u32)> {
            Some((8, 8))
        }

        fn draw_into(&mut self, _surface: &mut RasterSurface) -> bool {
            true
        }

        fn stop(&mut self) {}
    }

    #[derive(Debug)]
    struct StubCamera;

    impl Camera for StubCamera {
        type Stream = StubStream;

        fn open(&mut self, _request: &CameraRequest) -> Result<StubStream, CameraError> {
            Ok(StubStream)
        }
    }

    #[derive(Debug, Clone, Default)]
    struct Script(Rc<RefCell<VecDeque<Option<String>>>>);

    impl Script {
        fn push(&self, read: Option<&str>) {
            self.0.borrow_mut().push_back(read.map(str::to_owned));
        }
    }

    impl FrameDecoder for Script {
        fn decode(&self, _frame: &RasterSurface) -> Option<String> {
            self.0.borrow_mut().pop_front().flatten()
        }
    }

    fn scanner() -> (Scanner<StubCamera, Script>, Script) {
        let script = Script::default();

        let scanner = Scanner::with_decoder(
            FrameSampler::new(StubCamera),
            script.clone(),
            DebounceConfig::default(),
        );

        (scanner, script)
    }

    #[test]
    fn accepts_after_three_reads_and_stops() -> TestResult {
        let (mut scanner, script) = scanner();
        let t0 = Instant::now();
        let step = Duration::from_millis(100);

        for _ in 0..3 {
            script.push(Some(r#"{"code":"SAVE10"}"#));
        }

        let handle = scanner.start(t0)?;

        assert!(matches!(
            scanner.tick(handle, t0),
            ScanEvent::Observed { count: 1, .. }
        ));
        assert!(matches!(
            scanner.tick(handle, t0 + step),
            ScanEvent::Observed { count: 2, .. }
        ));

        let ScanEvent::Accepted(scanned) = scanner.tick(handle, t0 + step * 2) else {
            return Err("expected acceptance".into());
        };

        assert_eq!(scanned.code, "SAVE10");
        assert!(!scanner.is_scanning());
        assert_eq!(scanner.tick(handle, t0 + step * 3), ScanEvent::Cancelled);

        Ok(())
    }

    #[test]
    fn ticks_inside_interval_are_throttled() -> TestResult {
        let (mut scanner, script) = scanner();
        let t0 = Instant::now();

        script.push(Some("SAVE10"));

        let handle = scanner.start(t0)?;

        assert!(matches!(scanner.tick(handle, t0), ScanEvent::Observed { .. }));
        assert_eq!(
            scanner.tick(handle, t0 + Duration::from_millis(16)),
            ScanEvent::Throttled
        );

        Ok(())
    }

    #[test]
    fn restart_invalidates_old_handle() -> TestResult {
        let (mut scanner, _script) = scanner();
        let t0 = Instant::now();

        let first = scanner.start(t0)?;
        let second = scanner.start(t0)?;

        assert_ne!(first, second);
        assert_eq!(scanner.tick(first, t0), ScanEvent::Cancelled);
        assert_eq!(scanner.tick(second, t0), ScanEvent::NoCode);

        Ok(())
    }

    #[test]
    fn manual_code_is_extracted() {
        let scanned = ScannedCode::manual("  code=SAVE10 ");

        assert_eq!(scanned.raw, "code=SAVE10");
        assert_eq!(scanned.code, "SAVE10");
    }
}
