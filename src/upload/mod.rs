pub mod field;
pub mod host;
pub mod progress;
pub mod validate;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ImageFile, UploadedImage};

pub use field::ImageField;
pub use host::{HttpImageHost, ImageHost};
pub use progress::{
    MAX_SIMULATED, MonotonicProgress, ProgressReporter, ProgressTracker, SimulatedProgress,
};
pub use validate::{ImageValidation, validate_image_file};

/// Validates, uploads and reports progress for one image at a time per call.
///
/// Calls are independent: two overlapping uploads run two timers and two
/// requests, and whichever answer lands last is what the caller ends up with.
/// Use [`UploadPipeline::upload_exclusive`] with an [`UploadGuard`] to refuse
/// overlap, or [`UploadPipeline::upload_image_cancellable`] to stop waiting.
#[derive(Clone)]
pub struct UploadPipeline {
    host: Arc<dyn ImageHost>,
    simulation: Option<SimulatedProgress>,
}

impl UploadPipeline {
    pub fn new(host: Arc<dyn ImageHost>) -> Self {
        Self {
            host,
            simulation: Some(SimulatedProgress::default()),
        }
    }

    /// For hosts that report real progress through the reporter they are given.
    pub fn without_simulation(host: Arc<dyn ImageHost>) -> Self {
        Self { host, simulation: None }
    }

    /// See [`SimulatedProgress::normalized`] for how the settings are clamped.
    pub fn with_simulation(mut self, simulation: SimulatedProgress) -> Self {
        self.simulation = Some(simulation.normalized());
        self
    }

    pub async fn upload_image(
        &self,
        file: &ImageFile,
        reporter: &dyn ProgressReporter,
    ) -> Result<UploadedImage, AppError> {
        self.run(file, reporter, None).await
    }

    pub async fn upload_image_cancellable(
        &self,
        file: &ImageFile,
        reporter: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<UploadedImage, AppError> {
        self.run(file, reporter, Some(cancel)).await
    }

    pub async fn upload_exclusive(
        &self,
        guard: &UploadGuard,
        file: &ImageFile,
        reporter: &dyn ProgressReporter,
    ) -> Result<UploadedImage, AppError> {
        let _permit = guard.try_acquire().ok_or(AppError::Busy)?;
        self.run(file, reporter, None).await
    }

    async fn run(
        &self,
        file: &ImageFile,
        reporter: &dyn ProgressReporter,
        cancel: Option<&CancellationToken>,
    ) -> Result<UploadedImage, AppError> {
        let attempt = Uuid::new_v4();
        let progress = MonotonicProgress::new(reporter);
        progress.report_progress(0);

        let result = match validate_image_file(Some(file)).into_result() {
            Ok(()) => self.send(file, &progress, cancel).await,
            Err(e) => Err(e),
        };

        // The timer is gone by now; nothing can report after this.
        progress.complete();

        match &result {
            Ok(image) => info!("upload {} of {} stored at {}", attempt, file.file_name, image.url),
            Err(e) => warn!("upload {} of {} failed: {}", attempt, file.file_name, e),
        }
        result
    }

    async fn send(
        &self,
        file: &ImageFile,
        progress: &MonotonicProgress<'_>,
        cancel: Option<&CancellationToken>,
    ) -> Result<UploadedImage, AppError> {
        let request = self.host.upload(file, progress);
        tokio::pin!(request);

        let cancelled = async move {
            match cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(cancelled);

        let Some(simulation) = self.simulation else {
            return tokio::select! {
                biased;
                _ = &mut cancelled => Err(AppError::Cancelled),
                result = &mut request => result,
            };
        };

        let mut ticker = tokio::time::interval(simulation.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick fires immediately
        ticker.tick().await;

        let mut percent = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut cancelled => return Err(AppError::Cancelled),
                result = &mut request => return result,
                _ = ticker.tick() => {
                    percent = simulation.next(percent);
                    progress.report_progress(percent);
                }
            }
        }
    }
}

/// Opt-in single-flight lock for uploads that share a consumer.
#[derive(Clone, Debug, Default)]
pub struct UploadGuard {
    busy: Arc<AtomicBool>,
}

impl UploadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<UploadPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| UploadPermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Released on drop.
#[derive(Debug)]
pub struct UploadPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for UploadPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
