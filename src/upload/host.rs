use async_trait::async_trait;
use reqwest::{Client, Url, multipart};
use serde::Deserialize;

use crate::config::ImageHostConfig;
use crate::error::AppError;
use crate::models::{ImageFile, UploadedImage};
use crate::upload::progress::ProgressReporter;

/// Somewhere images can be stored and served from.
///
/// `progress` is handed over so hosts that can measure bytes sent report real
/// numbers. Hosts that can't simply ignore it.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(
        &self,
        file: &ImageFile,
        progress: &dyn ProgressReporter,
    ) -> Result<UploadedImage, AppError>;
}

#[derive(Debug, Deserialize)]
struct HostResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<HostData>,
    #[serde(default)]
    error: Option<HostError>,
}

#[derive(Debug, Deserialize)]
struct HostData {
    url: String,
    id: String,
    #[serde(default)]
    delete_url: String,
}

#[derive(Debug, Deserialize)]
struct HostError {
    message: String,
}

pub struct HttpImageHost {
    client: Client,
    config: ImageHostConfig,
}

impl HttpImageHost {
    pub fn new(config: ImageHostConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn upload_url(&self) -> Result<Url, AppError> {
        Url::parse_with_params(&self.config.upload_url, &[("key", &self.config.api_key)])
            .map_err(|e| AppError::Config(format!("Invalid image host url: {}", e)))
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(
        &self,
        file: &ImageFile,
        _progress: &dyn ProgressReporter,
    ) -> Result<UploadedImage, AppError> {
        let part = multipart::Part::bytes(file.data.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(self.upload_url()?)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        interpret_response(status, &body)
    }
}

fn interpret_response(status: reqwest::StatusCode, body: &str) -> Result<UploadedImage, AppError> {
    let parsed = serde_json::from_str::<HostResponse>(body);

    match parsed {
        Ok(HostResponse { success: true, data: Some(data), .. }) if status.is_success() => {
            Ok(UploadedImage {
                url: data.url,
                id: data.id,
                delete_url: data.delete_url,
            })
        }
        Ok(HostResponse { error: Some(error), .. }) => Err(AppError::HostRejection(error.message)),
        Ok(HostResponse { success: false, .. }) if status.is_success() => {
            Err(AppError::HostRejection("Upload failed".to_string()))
        }
        _ if !status.is_success() => {
            Err(AppError::Transport(format!("Image host error {}: {}", status, body)))
        }
        Ok(_) => Err(AppError::Transport("Image host response is missing data".to_string())),
        Err(e) => {
            tracing::error!("Failed to parse image host response: {}", e);
            Err(AppError::Transport(format!("Failed to parse image host response: {}", e)))
        }
    }
}
