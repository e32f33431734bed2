use std::sync::Arc;

use tokio::sync::RwLock;

use crate::catalog::{Catalog, CoursesClient};
use crate::upload::{ProgressTracker, UploadGuard, UploadPipeline};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<Catalog>>,
    pub courses: Arc<dyn CoursesClient>,
    pub uploads: UploadPipeline,
    /// One progress bar is shared, so uploads through the API go one at a time.
    pub guard: UploadGuard,
    pub progress: ProgressTracker,
}

impl AppState {
    pub fn new(courses: Arc<dyn CoursesClient>, uploads: UploadPipeline) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Catalog::new())),
            courses,
            uploads,
            guard: UploadGuard::new(),
            progress: ProgressTracker::default(),
        }
    }

    /// Reloads the catalog without holding the lock across the request, so
    /// readers see `loading` in the meantime. Safe to overlap with another refresh.
    pub async fn refresh_catalog(&self) -> bool {
        let ticket = self.catalog.write().await.begin_load();
        let result = self.courses.fetch_courses().await;
        self.catalog.write().await.settle(ticket, result)
    }
}
