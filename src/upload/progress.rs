use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

pub const COMPLETE: u8 = 100;
/// Highest value the timer may report; only the host's answer reaches 100.
pub const MAX_SIMULATED: u8 = COMPLETE - 1;
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// Receives upload progress as a percentage.
pub trait ProgressReporter: Send + Sync {
    fn report_progress(&self, percent: u8);
}

impl<F> ProgressReporter for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report_progress(&self, percent: u8) {
        self(percent)
    }
}

/// Fake progress driven by a timer instead of bytes on the wire.
///
/// Every `tick` the counter rises by `step` until it reaches `cap`. The last
/// stretch up to 100 only happens once the host has answered, so `cap` never
/// goes above [`MAX_SIMULATED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedProgress {
    pub step: u8,
    pub tick: Duration,
    pub cap: u8,
}

impl Default for SimulatedProgress {
    fn default() -> Self {
        Self {
            step: 10,
            tick: Duration::from_millis(200),
            cap: 90,
        }
    }
}

impl SimulatedProgress {
    pub fn next(&self, current: u8) -> u8 {
        current.saturating_add(self.step).min(self.cap.min(MAX_SIMULATED))
    }

    /// Raises a zero `tick` to [`MIN_TICK`] and lowers `cap` to [`MAX_SIMULATED`].
    pub fn normalized(self) -> Self {
        Self {
            step: self.step,
            tick: self.tick.max(MIN_TICK),
            cap: self.cap.min(MAX_SIMULATED),
        }
    }
}

/// Forwards only values above the last one seen, clamped to 100.
pub struct MonotonicProgress<'a> {
    inner: &'a dyn ProgressReporter,
    last: Mutex<Option<u8>>,
}

impl<'a> MonotonicProgress<'a> {
    pub fn new(inner: &'a dyn ProgressReporter) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }

    pub fn complete(&self) {
        self.report_progress(COMPLETE);
    }

    pub fn last(&self) -> Option<u8> {
        *self.last.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProgressReporter for MonotonicProgress<'_> {
    fn report_progress(&self, percent: u8) {
        let percent = percent.min(COMPLETE);
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if last.is_some_and(|prev| percent <= prev) {
            return;
        }
        *last = Some(percent);
        self.inner.report_progress(percent);
    }
}

/// The progress bar a form shows. Falls back to 0 a moment after hitting 100.
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    percent: Arc<AtomicU8>,
    reset_after: Duration,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl ProgressTracker {
    pub fn new(reset_after: Duration) -> Self {
        Self {
            percent: Arc::new(AtomicU8::new(0)),
            reset_after,
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::SeqCst)
    }
}

impl ProgressReporter for ProgressTracker {
    fn report_progress(&self, percent: u8) {
        self.percent.store(percent, Ordering::SeqCst);
        if percent < COMPLETE {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let shared = self.percent.clone();
        let delay = self.reset_after;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            // A newer upload may already be moving the bar.
            let _ = shared.compare_exchange(COMPLETE, 0, Ordering::SeqCst, Ordering::SeqCst);
        });
    }
}
