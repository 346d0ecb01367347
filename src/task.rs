//! Tasks submitted to an agent.
//!
//! A task is either plain text or a multimodal message carrying text and
//! images. Images are sent to the model as URLs; inline bytes become
//! base64 `data:` URLs.

use crate::error::{BreezeError, Result};
use base64::Engine;
use std::path::Path;

/// A unit of work for an agent.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Text(String),
    MultiModal(MultiModalMessage),
}

/// Text plus zero or more images.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiModalMessage {
    pub text: String,
    pub images: Vec<Image>,
}

/// An image attached to a task.
#[derive(Debug, Clone, PartialEq)]
pub enum Image {
    /// Publicly reachable image URL, fetched by the model provider.
    Url(String),
    /// Raw image bytes with their media type.
    Inline { media_type: String, data: Vec<u8> },
}

impl Task {
    /// Build a multimodal task.
    pub fn multimodal(text: impl Into<String>, images: Vec<Image>) -> Self {
        Task::MultiModal(MultiModalMessage {
            text: text.into(),
            images,
        })
    }

    /// The text component of the task.
    pub fn text(&self) -> &str {
        match self {
            Task::Text(text) => text,
            Task::MultiModal(message) => &message.text,
        }
    }

    /// Images attached to the task, if any.
    pub fn images(&self) -> &[Image] {
        match self {
            Task::Text(_) => &[],
            Task::MultiModal(message) => &message.images,
        }
    }

    pub fn has_images(&self) -> bool {
        !self.images().is_empty()
    }
}

impl From<&str> for Task {
    fn from(text: &str) -> Self {
        Task::Text(text.to_string())
    }
}

impl From<String> for Task {
    fn from(text: String) -> Self {
        Task::Text(text)
    }
}

impl Image {
    /// Reference an image by URL. Only http(s) and data URLs are accepted.
    pub fn from_url(raw: &str) -> Result<Self> {
        let parsed = url::Url::parse(raw)
            .map_err(|e| BreezeError::InvalidInput(format!("Invalid image URL '{}': {}", raw, e)))?;
        match parsed.scheme() {
            "http" | "https" | "data" => Ok(Image::Url(raw.to_string())),
            other => Err(BreezeError::InvalidInput(format!(
                "Unsupported image URL scheme: {}",
                other
            ))),
        }
    }

    /// Read an image from disk, inferring the media type from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let media_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(media_type_for_extension)
            .ok_or_else(|| {
                BreezeError::InvalidInput(format!(
                    "Unsupported image type: {}",
                    path.display()
                ))
            })?;
        let data = std::fs::read(path)?;
        Ok(Image::Inline {
            media_type: media_type.to_string(),
            data,
        })
    }

    /// Either a URL or a local path.
    pub fn from_location(location: &str) -> Result<Self> {
        if location.starts_with("http://")
            || location.starts_with("https://")
            || location.starts_with("data:")
        {
            Self::from_url(location)
        } else {
            Self::from_path(Path::new(location))
        }
    }

    /// URL form sent to the model.
    pub fn to_url(&self) -> String {
        match self {
            Image::Url(url) => url.clone(),
            Image::Inline { media_type, data } => format!(
                "data:{};base64,{}",
                media_type,
                base64::engine::general_purpose::STANDARD.encode(data)
            ),
        }
    }
}

fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_text_task() {
        let task: Task = "tell me a joke".into();
        assert_eq!(task.text(), "tell me a joke");
        assert!(!task.has_images());
    }

    #[test]
    fn test_inline_image_data_url() {
        let image = Image::Inline {
            media_type: "image/png".to_string(),
            data: b"abc".to_vec(),
        };
        assert_eq!(image.to_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_image_from_path() {
        let mut file = tempfile::Builder::new().suffix(".JPG").tempfile().unwrap();
        file.write_all(&[0xff, 0xd8, 0xff]).unwrap();

        let image = Image::from_path(file.path()).unwrap();
        match image {
            Image::Inline { media_type, data } => {
                assert_eq!(media_type, "image/jpeg");
                assert_eq!(data, vec![0xff, 0xd8, 0xff]);
            }
            _ => panic!("Expected inline image"),
        }
    }

    #[test]
    fn test_image_location_rules() {
        let task = Task::multimodal(
            "What is in this image?",
            vec![Image::from_location("https://picsum.photos/id/237/200/300").unwrap()],
        );
        assert!(task.has_images());
        assert!(Image::from_url("ftp://example.com/cat.png").is_err());
        assert!(Image::from_path(Path::new("notes.txt")).is_err());
    }
}
