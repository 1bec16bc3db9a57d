//! Tally
//!
//! Tally is the scanning half of a small-business coupon and loyalty desk: it turns a live
//! camera feed into a single, confidently-read coupon code.
//!
//! The pipeline stages are:
//!
//! 1. **Frames** – copy the current camera frame into an off-screen [`frames::RasterSurface`].
//! 2. **Decoder** – decode a QR symbol from the surface in either colour polarity.
//! 3. **Debounce** – only accept a value once it has been read several times within a window.
//! 4. **Extract** – normalise the accepted payload into a canonical coupon code.
//!
//! [`scanner::Scanner`] runs those stages once per animation tick.

pub mod debounce;
pub mod decoder;
pub mod extract;
pub mod frames;
pub mod prelude;
pub mod scanner;
