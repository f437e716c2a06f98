//! Frame ticker for progress polling.
//!
//! Runs only between `start` and `stop`; the controller starts it when
//! playback begins and stops it as soon as there is nothing to poll.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ProgressTicker {
    interval: Duration,
    running: bool,
    last_fired: Option<Instant>,
}

impl ProgressTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: false,
            last_fired: None,
        }
    }

    /// Start ticking. The first `due` check after a start always fires.
    pub fn start(&mut self) {
        self.running = true;
        self.last_fired = None;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.last_fired = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a tick should run at `now`. Records the tick when it does.
    pub fn due(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        let ready = self
            .last_fired
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if ready {
            self.last_fired = Some(now);
        }
        ready
    }
}
