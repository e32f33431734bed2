use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Query};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::info;

use crate::catalog::{CatalogView, CourseFilter, Notice};
use crate::error::AppError;
use crate::models::{Course, ImageFile, UploadedImage};
use crate::state::AppState;
use crate::upload::validate::{MAX_FILE_SIZE, NO_FILE_MESSAGE};
use crate::upload::{ImageValidation, validate_image_file};

/// Room for the multipart framing around a maximum-size image, so the size
/// check in validation gets to answer instead of the body limit.
const BODY_LIMIT: usize = MAX_FILE_SIZE + 8 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct CoursesResponse {
    pub loading: bool,
    pub coming_soon: bool,
    pub notice: Option<Notice>,
    pub courses: Vec<Course>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub loaded: bool,
    pub count: usize,
    pub notice: Option<Notice>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub percent: u8,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses))
        .route("/courses/latest", get(latest_courses))
        .route("/courses/refresh", post(refresh_courses))
        .route("/uploads", post(upload_image))
        .route("/uploads/validate", post(validate_upload))
        .route("/uploads/progress", get(upload_progress))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_courses(
    State(state): State<AppState>,
    query: Result<Query<CourseFilter>, QueryRejection>,
) -> Result<Json<CoursesResponse>, AppError> {
    let Query(filter) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let catalog = state.catalog.read().await;
    let (coming_soon, courses) = match catalog.view(&filter) {
        CatalogView::ComingSoon => (true, Vec::new()),
        CatalogView::Courses(courses) => (false, courses.into_iter().cloned().collect()),
    };

    Ok(Json(CoursesResponse {
        loading: catalog.is_loading(),
        coming_soon,
        notice: catalog.notice().cloned(),
        courses,
    }))
}

async fn latest_courses(State(state): State<AppState>) -> Json<Vec<Course>> {
    let catalog = state.catalog.read().await;
    Json(catalog.latest().to_vec())
}

async fn refresh_courses(State(state): State<AppState>) -> Json<RefreshResponse> {
    let loaded = state.refresh_catalog().await;

    let catalog = state.catalog.read().await;
    Json(RefreshResponse {
        loaded,
        count: catalog.courses().len(),
        notice: catalog.notice().cloned(),
    })
}

async fn upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadedImage>, AppError> {
    let file = read_image_field(multipart)
        .await?
        .ok_or_else(|| AppError::Validation(NO_FILE_MESSAGE.to_string()))?;

    info!("upload requested: {} ({} bytes)", file.file_name, file.size());
    let image = state
        .uploads
        .upload_exclusive(&state.guard, &file, &state.progress)
        .await?;
    Ok(Json(image))
}

async fn validate_upload(multipart: Multipart) -> Result<Json<ImageValidation>, AppError> {
    let file = read_image_field(multipart).await?;
    Ok(Json(validate_image_file(file.as_ref())))
}

async fn upload_progress(State(state): State<AppState>) -> Json<ProgressResponse> {
    Json(ProgressResponse {
        percent: state.progress.percent(),
    })
}

/// Pulls the `image` part out of a multipart body. Other parts are skipped.
async fn read_image_field(mut multipart: Multipart) -> Result<Option<ImageFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read image field: {}", e)))?;

        return Ok(Some(ImageFile::new(file_name, content_type, data.to_vec())));
    }
    Ok(None)
}
