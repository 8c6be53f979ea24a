use axum::extract::Multipart;

use crate::api::public::ApiError;
use crate::intake::{SelectedImage, media_type_for_filename};

/// Read the multipart field `name` as an image. Returns `None` when the
/// form has no such field. The declared content type wins over the
/// filename extension.
pub async fn read_image_field(
    multipart: &mut Multipart,
    name: &str,
    default_filename: &str,
) -> Result<Option<SelectedImage>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(name) {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|f| !f.is_empty())
            .unwrap_or(default_filename)
            .to_string();
        let media_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| media_type_for_filename(&filename).to_string());
        let content = field.bytes().await?;
        tracing::debug!(
            "Received {} ({}, {} bytes)",
            filename,
            media_type,
            content.len()
        );
        return Ok(Some(SelectedImage::new(
            content.to_vec(),
            &media_type,
            &filename,
        )));
    }
    Ok(None)
}
