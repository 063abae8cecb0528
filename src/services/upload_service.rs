use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageFormat;

use crate::{
    cache::LeaderboardCache,
    config::Config,
    error::{AppError, Result},
    models::Car,
    store::CarStore,
};

const ALLOWED_FORMATS: [ImageFormat; 3] = [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// Turns inbound photo payloads into the opaque image reference stored on a
/// car. Only the container signature is sniffed; pixels are never decoded.
#[derive(Debug, Clone)]
pub struct UploadService {
    max_image_size: usize,
}

impl UploadService {
    pub fn new(max_image_size: usize) -> Self {
        Self { max_image_size }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_image_size)
    }

    /// Accepts either raw base64 or a `data:image/<type>;base64,` URL and
    /// returns a normalized data URL carrying the sniffed MIME type.
    pub fn normalize_image(&self, payload: &str) -> Result<String> {
        let payload = payload.trim();

        let data = match payload.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| AppError::BadRequest("Malformed data URL".to_string()))?;
                let declared = header.strip_suffix(";base64").ok_or_else(|| {
                    AppError::BadRequest("Data URL must be base64 encoded".to_string())
                })?;
                let declared: mime::Mime = declared
                    .parse()
                    .map_err(|_| AppError::BadRequest("Invalid media type".to_string()))?;
                if declared.type_() != mime::IMAGE {
                    return Err(AppError::UnsupportedMediaType);
                }
                data
            }
            None => payload,
        };

        let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        if data.is_empty() {
            return Err(AppError::BadRequest("Photo is empty".to_string()));
        }

        // Reject oversized payloads before allocating the decoded buffer.
        if data.len() / 4 * 3 > self.max_image_size + 3 {
            return Err(AppError::ContentTooLarge);
        }

        let bytes = STANDARD
            .decode(data.as_bytes())
            .map_err(|_| AppError::BadRequest("Photo is not valid base64".to_string()))?;
        if bytes.len() > self.max_image_size {
            return Err(AppError::ContentTooLarge);
        }

        let format = image::guess_format(&bytes).map_err(|_| AppError::UnsupportedMediaType)?;
        if !ALLOWED_FORMATS.contains(&format) {
            return Err(AppError::UnsupportedMediaType);
        }

        Ok(format!("data:{};base64,{}", format.to_mime_type(), data))
    }

    pub async fn upload_car(
        &self,
        store: &dyn CarStore,
        cache: Option<&dyn LeaderboardCache>,
        payload: &str,
    ) -> Result<Car> {
        let image = self.normalize_image(payload)?;
        let car = store.create(image).await?;

        tracing::info!(car_id = %car.id, "Car uploaded");

        if let Some(cache) = cache {
            if let Err(e) = cache.invalidate().await {
                tracing::warn!("Failed to invalidate leaderboard cache: {}", e);
            }
        }

        Ok(car)
    }
}
