use async_trait::async_trait;
use reqwest::Client;

use crate::error::AppError;
use crate::models::Course;

#[async_trait]
pub trait CoursesClient: Send + Sync {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError>;
}

/// Reads the full course list from `{base_url}/courses`.
///
/// One request per call. No paging, no retry, and no timeout beyond what
/// reqwest applies by default.
pub struct HttpCoursesClient {
    client: Client,
    base_url: String,
}

impl HttpCoursesClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn courses_url(&self) -> String {
        format!("{}/courses", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CoursesClient for HttpCoursesClient {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        let url = self.courses_url();
        tracing::debug!("fetching courses from {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Transport(format!("Courses API error {}: {}", status, body)));
        }

        let body_text = response.text().await?;
        serde_json::from_str::<Vec<Course>>(&body_text).map_err(|e| {
            tracing::error!("Failed to parse courses: {}", e);
            AppError::Transport(format!("Failed to parse courses response: {}", e))
        })
    }
}

pub struct NoopCoursesClient;

#[async_trait]
impl CoursesClient for NoopCoursesClient {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(Vec::new())
    }
}
