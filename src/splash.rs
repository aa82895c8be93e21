use std::time::Duration;

pub const SPLASH_DURATION: Duration = Duration::from_secs(5);

/// Intro screen timer. No skip, no runtime override.
#[derive(Debug)]
pub struct SplashTimer {
    started_at: Duration,
    finished: bool,
}

impl SplashTimer {
    pub fn start(now: Duration) -> Self {
        Self {
            started_at: now,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// True exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.finished || now.saturating_sub(self.started_at) < SPLASH_DURATION {
            return false;
        }
        self.finished = true;
        true
    }
}
