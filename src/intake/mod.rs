//! Normalizes every way a calendar image enters the app into one
//! `SelectedImage`

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::core::WorkflowError;
use crate::session::{Session, SessionProvider, wait_for_session};

pub const NOT_AN_IMAGE_MESSAGE: &str = "Please select an image file";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeSource {
    FilePicker,
    DragDrop,
    ShareSheet,
    Clipboard,
}

/// The user's chosen calendar photo
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub content: Vec<u8>,
    pub media_type: String,
    pub filename: String,
    pub size: u64,
}

// Keep the bytes out of logs
impl fmt::Debug for SelectedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedImage")
            .field("media_type", &self.media_type)
            .field("filename", &self.filename)
            .field("size", &self.size)
            .finish()
    }
}

impl SelectedImage {
    pub fn new(content: Vec<u8>, media_type: &str, filename: &str) -> Self {
        let size = content.len() as u64;
        Self {
            content,
            media_type: media_type.to_string(),
            filename: filename.to_string(),
            size,
        }
    }

    /// Read an image from disk, declaring its media type from the
    /// file extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("image"));
        let media_type = media_type_for_filename(&filename);
        Ok(Self::new(content, media_type, &filename))
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// HEIC/HEIF photos are only labeled, the backend converts them
    pub fn is_heic(&self) -> bool {
        let media_type = self.media_type.to_lowercase();
        let filename = self.filename.to_lowercase();
        media_type == "image/heic"
            || media_type == "image/heif"
            || filename.ends_with(".heic")
            || filename.ends_with(".heif")
    }

    pub fn preview_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.content))
    }

    /// Size for display, e.g. "2.00 MB"
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }
}

pub fn media_type_for_filename(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Reject anything that is not declared as an image
pub fn validate(image: &SelectedImage) -> Result<(), WorkflowError> {
    if image.is_image() {
        Ok(())
    } else {
        tracing::debug!("Rejected non-image intake: {:?}", image);
        Err(WorkflowError::validation(NOT_AN_IMAGE_MESSAGE))
    }
}

/// A drop only ever uses the first file
pub fn pick_dropped(files: Vec<SelectedImage>) -> Option<SelectedImage> {
    files.into_iter().next()
}

/// A paste uses the first clipboard item that is an image
pub fn pick_pasted(items: Vec<SelectedImage>) -> Option<SelectedImage> {
    items.into_iter().find(SelectedImage::is_image)
}

/// Hold a shared image until someone is signed in.
pub async fn receive_shared<P>(
    image: SelectedImage,
    sessions: &P,
    timeout: std::time::Duration,
    interval: std::time::Duration,
) -> Result<(SelectedImage, Session), WorkflowError>
where
    P: SessionProvider + ?Sized,
{
    validate(&image)?;
    tracing::debug!("Shared image received: {}", image.filename);
    let session = wait_for_session(sessions, timeout, interval).await?;
    Ok((image, session))
}

/// Owns the selected image between intake and upload
#[derive(Debug, Default)]
pub struct IntakeController {
    selected: Option<SelectedImage>,
    preview: Option<String>,
    source: Option<IntakeSource>,
}

impl IntakeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and hold `image`. A rejected image leaves the current
    /// selection untouched.
    pub fn accept(
        &mut self,
        source: IntakeSource,
        image: SelectedImage,
    ) -> Result<(), WorkflowError> {
        validate(&image)?;
        if image.is_heic() {
            tracing::debug!("HEIC file detected, backend will handle conversion");
        }
        tracing::debug!("Accepted {:?} from {:?}", image, source);
        self.preview = Some(image.preview_data_url());
        self.selected = Some(image);
        self.source = Some(source);
        Ok(())
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn source(&self) -> Option<IntakeSource> {
        self.source
    }

    pub fn reset(&mut self) {
        self.selected = None;
        self.preview = None;
        self.source = None;
    }
}
