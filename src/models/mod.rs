pub mod course;
pub mod image;

pub use course::{Category, Course};
pub use image::{ImageFile, UploadedImage};
