//! Client-side request gate enforcing two fixed counting windows at once.
//!
//! The gate is meant for a single sequential caller: every method takes
//! `&mut self` and there is no internal locking. Share it across tasks only
//! behind a lock that covers `try_admit` and `record_admission` together.

use crate::config::{GateConfig, WindowConfig};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RateWindow {
    pub limit: u32,
    pub window: Duration,
    count: u32,
    start: Option<Instant>,
}

impl RateWindow {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            count: 0,
            start: None,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    fn roll(&mut self, now: Instant) {
        let Some(start) = self.start else {
            return;
        };
        if now.saturating_duration_since(start) >= self.window {
            self.start = Some(now);
            self.count = 0;
        }
    }

    fn has_room(&self) -> bool {
        self.count < self.limit
    }
}

impl From<&WindowConfig> for RateWindow {
    fn from(cfg: &WindowConfig) -> Self {
        Self::new(cfg.capacity, cfg.interval())
    }
}

/// Point-in-time view of one window, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowUsage {
    pub count: u32,
    pub limit: u32,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct RateGate {
    short: RateWindow,
    long: RateWindow,
}

impl RateGate {
    pub fn new(short: RateWindow, long: RateWindow) -> Self {
        Self { short, long }
    }

    pub fn from_config(cfg: &GateConfig) -> Self {
        Self::new(RateWindow::from(&cfg.short), RateWindow::from(&cfg.long))
    }

    pub fn try_admit(&mut self) -> bool {
        self.try_admit_at(Instant::now())
    }

    /// Rolls over any expired window and reports whether both have room.
    /// Does not consume a slot.
    pub fn try_admit_at(&mut self, now: Instant) -> bool {
        if self.short.start.is_none() && self.long.start.is_none() {
            self.short.start = Some(now);
            self.short.count = 0;
            self.long.start = Some(now);
            self.long.count = 0;
        }
        self.short.roll(now);
        self.long.roll(now);
        self.short.has_room() && self.long.has_room()
    }

    /// Charges one request against both windows. Pair with a successful
    /// `try_admit`, once per request attempt.
    pub fn record_admission(&mut self) {
        self.short.count += 1;
        self.long.count += 1;
    }

    /// Blocks the calling task until both windows have room. Each failed
    /// poll sleeps `poll` and reports the total time waited so far.
    pub async fn await_admission<F>(&mut self, poll: Duration, mut on_wait_tick: F)
    where
        F: FnMut(Duration),
    {
        let mut waited = Duration::ZERO;
        while !self.try_admit() {
            tokio::time::sleep(poll).await;
            waited += poll;
            on_wait_tick(waited);
        }
        if !waited.is_zero() {
            debug!(waited_secs = waited.as_secs_f64(), "rate gate admitted");
        }
    }

    pub fn usage(&self) -> (WindowUsage, WindowUsage) {
        (usage_of(&self.short), usage_of(&self.long))
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::from_config(&GateConfig::default())
    }
}

fn usage_of(window: &RateWindow) -> WindowUsage {
    WindowUsage {
        count: window.count,
        limit: window.limit,
        window: window.window,
    }
}
