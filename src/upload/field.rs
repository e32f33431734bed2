use crate::error::AppError;
use crate::models::UploadedImage;

/// Form-side state for an image input: the stored URL, whether the upload
/// button is disabled, and the inline error under it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageField {
    value: Option<String>,
    uploading: bool,
    error: Option<String>,
}

impl ImageField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(url: impl Into<String>) -> Self {
        Self {
            value: Some(url.into()),
            ..Self::default()
        }
    }

    /// Returns false while an upload is already running; the control is disabled then.
    pub fn begin(&mut self) -> bool {
        if self.uploading {
            return false;
        }
        self.uploading = true;
        self.error = None;
        true
    }

    /// On failure the previous value stays; the caller clears any preview itself.
    pub fn finish(&mut self, result: &Result<UploadedImage, AppError>) {
        self.uploading = false;
        match result {
            Ok(image) => {
                self.value = Some(image.url.clone());
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    pub fn clear(&mut self) {
        self.value = None;
        self.error = None;
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded(url: &str) -> UploadedImage {
        UploadedImage {
            url: url.to_string(),
            id: "abc".to_string(),
            delete_url: "https://host/delete/abc".to_string(),
        }
    }

    #[test]
    fn second_begin_is_refused_while_uploading() {
        let mut field = ImageField::new();
        assert!(field.begin());
        assert!(!field.begin());
        field.finish(&Ok(uploaded("https://host/a.png")));
        assert!(field.begin());
    }

    #[test]
    fn failure_keeps_previous_value_and_shows_message() {
        let mut field = ImageField::with_value("https://host/old.png");
        field.begin();
        field.finish(&Err(AppError::HostRejection("Invalid API v1 key.".to_string())));

        assert_eq!(field.value(), Some("https://host/old.png"));
        assert_eq!(field.error(), Some("Invalid API v1 key."));
        assert!(!field.is_uploading());
    }

    #[test]
    fn success_replaces_value_and_clears_error() {
        let mut field = ImageField::new();
        field.begin();
        field.finish(&Err(AppError::Transport("connection reset".to_string())));
        field.begin();
        field.finish(&Ok(uploaded("https://host/new.png")));

        assert_eq!(field.value(), Some("https://host/new.png"));
        assert_eq!(field.error(), None);

        field.clear();
        assert_eq!(field.value(), None);
    }
}
