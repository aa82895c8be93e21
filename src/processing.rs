use std::{sync::Arc, thread, time::Duration};

use crossbeam_channel::{bounded, Receiver, TryRecvError};

use crate::{
    error::RecognitionError,
    model::VideoAsset,
    provider::{CancelFlag, RecognitionProvider},
};

type Outcome = Result<String, RecognitionError>;

struct PendingJob {
    uri: String,
    due: Duration,
    rx: Receiver<Outcome>,
    cancel: CancelFlag,
}

/// Holds at most one submitted clip. The provider runs on a worker thread and
/// the outcome is picked up by [`ProcessingSimulator::poll`] once the provider
/// latency has elapsed and the worker has answered. Each accepted submission
/// yields exactly one outcome unless cancelled first.
pub struct ProcessingSimulator {
    provider: Arc<dyn RecognitionProvider>,
    pending: Option<PendingJob>,
    completed: u64,
}

impl ProcessingSimulator {
    pub fn new(provider: Box<dyn RecognitionProvider>) -> Self {
        Self {
            provider: Arc::from(provider),
            pending: None,
            completed: 0,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.display_name()
    }

    pub fn submit(&mut self, asset: VideoAsset, now: Duration) -> Result<(), RecognitionError> {
        if self.pending.is_some() {
            return Err(RecognitionError::Busy);
        }
        let due = now + self.provider.latency();
        let uri = asset.uri.clone();
        let (tx, rx) = bounded(1);
        let cancel = CancelFlag::default();
        let provider = Arc::clone(&self.provider);
        let worker_cancel = cancel.clone();
        thread::Builder::new()
            .name("recognizer".to_string())
            .spawn(move || {
                let outcome = provider.recognize(&asset, &worker_cancel);
                // Receiver is gone when the job was cancelled.
                let _ = tx.send(outcome);
            })
            .map_err(|err| RecognitionError::Spawn(err.to_string()))?;

        tracing::debug!(uri = %uri, provider = self.provider.display_name(), "clip submitted");
        self.pending = Some(PendingJob {
            uri,
            due,
            rx,
            cancel,
        });
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<Duration> {
        self.pending.as_ref().map(|job| job.due)
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Never blocks. Returns `None` until the latency has elapsed and the
    /// worker has reported.
    pub fn poll(&mut self, now: Duration) -> Option<Outcome> {
        let job = self.pending.as_ref()?;
        if job.due > now {
            return None;
        }
        let outcome = match job.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!(uri = %job.uri, "recognizer worker exited without a result");
                Err(RecognitionError::Interrupted)
            }
        };
        self.pending = None;
        self.completed += 1;
        Some(outcome)
    }

    pub fn cancel(&mut self) {
        if let Some(job) = self.pending.take() {
            job.cancel.cancel();
            tracing::debug!(uri = %job.uri, "pending recognition cancelled");
        }
    }
}

impl Drop for ProcessingSimulator {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QualityTier, VideoSource};
    use crate::provider::{CommandProvider, PlaceholderProvider};
    use pretty_assertions::assert_eq;
    use std::time::Instant;

    fn asset(uri: &str) -> VideoAsset {
        VideoAsset {
            uri: uri.to_string(),
            source: VideoSource::Library,
            duration_ms: None,
            quality: QualityTier::Highest,
        }
    }

    /// Poll at `now` until the worker answers.
    fn wait_for_outcome(simulator: &mut ProcessingSimulator, now: Duration) -> Outcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = simulator.poll(now) {
                return outcome;
            }
            assert!(Instant::now() < deadline, "recognizer worker never answered");
            thread::sleep(Duration::from_millis(1));
        }
    }

    struct PanickingProvider;

    impl RecognitionProvider for PanickingProvider {
        fn display_name(&self) -> &'static str {
            "Panicking"
        }

        fn latency(&self) -> Duration {
            Duration::ZERO
        }

        fn recognize(&self, _asset: &VideoAsset, _cancel: &CancelFlag) -> Outcome {
            panic!("model crashed");
        }
    }

    #[test]
    fn fires_exactly_once_after_latency() {
        let mut simulator = ProcessingSimulator::new(Box::new(PlaceholderProvider::default()));
        simulator
            .submit(asset("a.mp4"), Duration::from_secs(1))
            .expect("submit");

        assert_eq!(simulator.poll(Duration::from_millis(2999)), None);
        assert_eq!(
            wait_for_outcome(&mut simulator, Duration::from_secs(3)),
            Ok("Hello".to_string())
        );
        assert_eq!(simulator.poll(Duration::from_secs(10)), None);
        assert_eq!(simulator.completed(), 1);
    }

    #[test]
    fn rejects_second_submission_while_pending() {
        let mut simulator = ProcessingSimulator::new(Box::new(PlaceholderProvider::default()));
        simulator.submit(asset("a.mp4"), Duration::ZERO).expect("submit");

        assert_eq!(
            simulator.submit(asset("b.mp4"), Duration::ZERO),
            Err(RecognitionError::Busy)
        );
        assert_eq!(simulator.due_at(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn cancelled_job_never_reports() {
        let mut simulator = ProcessingSimulator::new(Box::new(PlaceholderProvider::default()));
        simulator.submit(asset("a.mp4"), Duration::ZERO).expect("submit");
        simulator.cancel();

        assert!(!simulator.is_pending());
        assert_eq!(simulator.poll(Duration::from_secs(5)), None);
        assert_eq!(simulator.completed(), 0);
    }

    #[test]
    fn slow_recognizer_does_not_block_poll() {
        let provider = CommandProvider::new(
            "sh",
            vec![
                "-c".to_string(),
                r#"cat >/dev/null; sleep 3; echo '{"text":"hi"}'"#.to_string(),
            ],
        );
        let mut simulator = ProcessingSimulator::new(Box::new(provider));
        simulator.submit(asset("a.mp4"), Duration::ZERO).expect("submit");

        let started = Instant::now();
        assert_eq!(simulator.poll(Duration::from_secs(1)), None);
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(simulator.is_pending());

        simulator.cancel();
        assert!(!simulator.is_pending());
    }

    #[test]
    fn worker_dying_without_answer_is_a_failure() {
        let mut simulator = ProcessingSimulator::new(Box::new(PanickingProvider));
        simulator.submit(asset("a.mp4"), Duration::ZERO).expect("submit");

        assert_eq!(
            wait_for_outcome(&mut simulator, Duration::ZERO),
            Err(RecognitionError::Interrupted)
        );
        assert!(!simulator.is_pending());
        assert_eq!(simulator.completed(), 1);
    }
}
