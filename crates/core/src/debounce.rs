//! Confidence-based debouncing of per-frame decode results.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Number of identical reads required before a value is accepted.
pub const CONFIDENCE_THRESHOLD: u32 = 3;

/// Minimum time between two detection attempts.
pub const DETECTION_INTERVAL: Duration = Duration::from_millis(100);

/// Length of the collection window, in detection intervals.
pub const WINDOW_INTERVALS: u32 = 20;

/// Maximum number of distinct values tracked at once.
pub const MAX_TRACKED_VALUES: usize = 8;

/// Debouncer tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Identical reads required to accept a value.
    pub threshold: u32,

    /// Minimum time between detection attempts.
    pub interval: Duration,

    /// Collection window length, in multiples of `interval`.
    pub window_intervals: u32,

    /// Maximum number of distinct values tracked at once.
    pub max_tracked: usize,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            threshold: CONFIDENCE_THRESHOLD,
            interval: DETECTION_INTERVAL,
            window_intervals: WINDOW_INTERVALS,
            max_tracked: MAX_TRACKED_VALUES,
        }
    }
}

impl DebounceConfig {
    /// Collection window after which unconfirmed counts are discarded.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.interval.saturating_mul(self.window_intervals)
    }
}

/// Debouncer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Not collecting; reads are ignored.
    Idle,

    /// Counting reads inside the window that began at `started_at`.
    Collecting {
        /// Start of the current collection window.
        started_at: Instant,
    },

    /// A value has been accepted; terminal until [`Debouncer::start`].
    Emitted,
}

/// Counts repeated decode results and accepts a value once it has been read
/// [`DebounceConfig::threshold`] times inside one collection window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    config: DebounceConfig,
    state: DebounceState,
    counts: FxHashMap<String, u32>,
    last_attempt: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

impl Debouncer {
    /// Create an idle debouncer.
    #[must_use]
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            state: DebounceState::Idle,
            counts: FxHashMap::default(),
            last_attempt: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> DebounceState {
        self.state
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DebounceConfig {
        &self.config
    }

    /// Number of reads of `value` in the current window.
    #[must_use]
    pub fn count(&self, value: &str) -> u32 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Number of distinct values currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.counts.len()
    }

    /// Begin a fresh collection window.
    pub fn start(&mut self, now: Instant) {
        self.counts.clear();
        self.last_attempt = None;
        self.state = DebounceState::Collecting { started_at: now };
    }

    /// Return to [`DebounceState::Idle`], discarding all counts.
    pub fn reset(&mut self) {
        self.counts.clear();
        self.last_attempt = None;
        self.state = DebounceState::Idle;
    }

    /// Whether a detection attempt may run at `now`.
    ///
    /// Enforces the minimum inter-attempt interval and records the attempt when allowed.
    pub fn ready(&mut self, now: Instant) -> bool {
        if !self.expire(now) {
            return false;
        }

        if self
            .last_attempt
            .is_some_and(|last| now.saturating_duration_since(last) < self.config.interval)
        {
            return false;
        }

        self.last_attempt = Some(now);

        true
    }

    /// Record one decoded value. Returns the value exactly once, when it reaches the threshold.
    pub fn observe(&mut self, value: &str, now: Instant) -> Option<String> {
        if value.is_empty() || !self.expire(now) {
            return None;
        }

        if !self.counts.contains_key(value) && self.counts.len() >= self.config.max_tracked {
            self.evict_weakest();
        }

        let count = self.counts.entry(value.to_owned()).or_insert(0);

        *count += 1;

        trace!(value, count = *count, "decode observed");

        if *count < self.config.threshold {
            return None;
        }

        debug!(value, "value accepted");

        self.counts.clear();
        self.state = DebounceState::Emitted;

        Some(value.to_owned())
    }

    /// Restart the window when it has elapsed. Returns whether the debouncer is collecting.
    fn expire(&mut self, now: Instant) -> bool {
        let DebounceState::Collecting { started_at } = self.state else {
            return false;
        };

        if now.saturating_duration_since(started_at) >= self.config.window() {
            if !self.counts.is_empty() {
                debug!(tracked = self.counts.len(), "collection window elapsed, clearing");
            }

            self.counts.clear();
            self.state = DebounceState::Collecting { started_at: now };
        }

        true
    }

    fn evict_weakest(&mut self) {
        let weakest = self
            .counts
            .iter()
            .min_by(|(ak, ac), (bk, bc)| ac.cmp(bc).then_with(|| ak.cmp(bk)))
            .map(|(key, _)| key.clone());

        if let Some(key) = weakest {
            trace!(value = %key, "evicting tracked value");

            self.counts.remove(&key);
        }
    }
}
