//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    debounce::{DebounceConfig, DebounceState, Debouncer},
    decoder::{FrameDecoder, QrDecoder, decode},
    extract::{MIN_CODE_LENGTH, ScanPayload, extract, extract_payload, is_valid_code},
    frames::{Camera, CameraError, CameraRequest, CameraStream, Facing, FrameSampler, RasterSurface},
    scanner::{ScanEvent, ScannedCode, Scanner, TickHandle},
};
