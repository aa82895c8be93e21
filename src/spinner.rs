use std::time::Duration;

pub const SPINNER_PERIOD: Duration = Duration::from_millis(1500);

/// Looping 0→360° rotation with linear easing, shown while a clip is processing.
///
/// At most one loop exists at a time: starting while running restarts the same
/// loop instead of stacking a second one, and stopping always resets to 0°.
#[derive(Debug, Default)]
pub struct SpinnerAnimation {
    loop_started_at: Option<Duration>,
}

impl SpinnerAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Duration) {
        if self.loop_started_at.is_some() {
            tracing::trace!("spinner restarted while running");
        }
        self.loop_started_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.loop_started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.loop_started_at.is_some()
    }

    pub fn active_loops(&self) -> usize {
        usize::from(self.is_running())
    }

    /// Rotation in degrees, in `[0, 360)`.
    pub fn angle(&self, now: Duration) -> f32 {
        let Some(started_at) = self.loop_started_at else {
            return 0.0;
        };
        let period = SPINNER_PERIOD.as_millis();
        let elapsed = now.saturating_sub(started_at).as_millis() % period;
        elapsed as f32 / period as f32 * 360.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_linearly_and_wraps_each_period() {
        let mut spinner = SpinnerAnimation::new();
        spinner.start(Duration::from_secs(1));

        assert_eq!(spinner.angle(Duration::from_secs(1)), 0.0);
        assert_eq!(spinner.angle(Duration::from_millis(1750)), 180.0);
        assert_eq!(spinner.angle(Duration::from_millis(2500)), 0.0);
        assert_eq!(spinner.angle(Duration::from_millis(2875)), 90.0);
    }

    #[test]
    fn stop_resets_angle_and_releases_loop() {
        let mut spinner = SpinnerAnimation::new();
        spinner.start(Duration::ZERO);
        spinner.stop();

        assert_eq!(spinner.active_loops(), 0);
        assert_eq!(spinner.angle(Duration::from_millis(700)), 0.0);
    }

    #[test]
    fn rapid_restart_keeps_a_single_loop() {
        let mut spinner = SpinnerAnimation::new();
        for step in 0..10 {
            spinner.start(Duration::from_millis(step * 10));
            assert_eq!(spinner.active_loops(), 1);
        }
        assert_eq!(spinner.angle(Duration::from_millis(90)), 0.0);
    }
}
