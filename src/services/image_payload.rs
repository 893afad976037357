// src/services/image_payload.rs
use crate::errors::SocialSyncError;
use base64::{Engine as _, engine::general_purpose};
use image::ImageFormat;

/// An image as the remote API carries it: a media type plus a base64 payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Validates an `inlineData` part. The payload must decode as base64 and look like an
    /// image; a missing media type is sniffed from the decoded bytes.
    pub fn from_inline(mime_type: Option<&str>, data: &str) -> Result<Self, SocialSyncError> {
        let bytes = general_purpose::STANDARD
            .decode(data)
            .map_err(|e| SocialSyncError::Generation(format!("Failed to decode image: {}", e)))?;

        if bytes.is_empty() {
            return Err(SocialSyncError::Generation(
                "Image payload is empty".to_string(),
            ));
        }

        let mime_type = match mime_type.map(str::trim).filter(|m| !m.is_empty()) {
            Some(declared) => declared.to_string(),
            None => sniff_mime_type(&bytes)?.to_string(),
        };

        Ok(Self {
            mime_type,
            data: data.to_string(),
        })
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Splits a `data:<mime>;base64,<payload>` reference back into its parts.
    pub fn parse_data_uri(uri: &str) -> Result<Self, SocialSyncError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| SocialSyncError::Validation("Image is not a data URI".to_string()))?;

        let (header, data) = rest.split_once(',').ok_or_else(|| {
            SocialSyncError::Validation("Data URI has no payload".to_string())
        })?;

        let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
            SocialSyncError::Validation("Data URI is not base64 encoded".to_string())
        })?;

        if mime_type.is_empty() || data.is_empty() {
            return Err(SocialSyncError::Validation(
                "Data URI is missing its media type or payload".to_string(),
            ));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }
}

fn sniff_mime_type(bytes: &[u8]) -> Result<&'static str, SocialSyncError> {
    let format = image::guess_format(bytes).map_err(|e| {
        SocialSyncError::Generation(format!("Unrecognised image data: {}", e))
    })?;

    Ok(match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        _ => "application/octet-stream",
    })
}
