//! Order extraction endpoint.
//!
//! `POST /orders/extract` accepts pasted text or a photographed order and
//! returns the extracted order lines. When the caller does not send a
//! catalog snapshot, free-form orders are matched against the ERP catalog.

use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};
use crate::models::{ExtractionSource, InputKind, OrderLine, RawCatalogRow};
use crate::pipeline::OrderInput;

/// Maximum decoded image size (10 MB).
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// Omitted: images are detected by `image`, text is auto-classified.
    #[serde(default)]
    pub kind: Option<InputKind>,
    #[serde(default)]
    pub text: Option<String>,
    /// Raw base64 or a `data:` URL.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub catalog: Option<Vec<RawCatalogRow>>,
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub ok: bool,
    pub source: ExtractionSource,
    pub count: usize,
    pub lines: Vec<OrderLine>,
}

/// `POST /orders/extract`: turn a raw order into order lines.
pub async fn extract(
    State(ctx): State<ApiContext>,
    Json(payload): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let input = order_input(&payload)?;

    let needs_catalog = !matches!(input, OrderInput::Delimited(_));
    let catalog = match payload.catalog {
        Some(rows) => rows,
        None if needs_catalog => match ctx.erp.clone() {
            Some(erp) => run_blocking(move || erp.fetch_catalog().map_err(ApiError::from)).await?,
            None => {
                tracing::warn!("No catalog supplied and no ERP configured; extracting without catalog");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let extractor = ctx.extractor.clone();
    let outcome = run_blocking(move || {
        extractor
            .extract(&input, &catalog)
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(ExtractResponse {
        ok: true,
        source: outcome.source,
        count: outcome.lines.len(),
        lines: outcome.lines,
    }))
}

fn order_input(payload: &ExtractRequest) -> Result<OrderInput, ApiError> {
    let kind = match payload.kind {
        Some(kind) => kind,
        None if payload.image.is_some() => InputKind::Image,
        None => {
            let text = required_text(payload)?;
            return Ok(OrderInput::from_text(text));
        }
    };

    match kind {
        InputKind::Delimited => Ok(OrderInput::Delimited(required_text(payload)?.to_string())),
        InputKind::Text => Ok(OrderInput::Text(required_text(payload)?.to_string())),
        InputKind::Image => {
            let image = payload
                .image
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| ApiError::BadRequest("image is required".into()))?;
            image_input(image, payload.media_type.as_deref())
        }
    }
}

fn required_text(payload: &ExtractRequest) -> Result<&str, ApiError> {
    payload
        .text
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("text is required".into()))
}

/// Validate an uploaded image and keep it base64-encoded for the assistant.
fn image_input(image: &str, declared: Option<&str>) -> Result<OrderInput, ApiError> {
    let (url_media_type, data) = split_data_url(image);
    let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&data)
        .map_err(|e| ApiError::BadRequest(format!("Invalid image data: {e}")))?;

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("image is empty".into()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::BadRequest(format!(
            "Image exceeds 10 MB size limit ({} bytes)",
            bytes.len()
        )));
    }

    let media_type = detect_media_type(&bytes)
        .or(declared)
        .or(url_media_type)
        .unwrap_or(DEFAULT_MEDIA_TYPE)
        .to_ascii_lowercase();

    if !ALLOWED_MEDIA_TYPES.contains(&media_type.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Unsupported image type {media_type}"
        )));
    }

    Ok(OrderInput::Image { media_type, data })
}

/// Split `data:image/png;base64,...` into its media type and payload.
fn split_data_url(image: &str) -> (Option<&str>, &str) {
    let trimmed = image.trim();
    match trimmed.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((header, data)) => {
            let media_type = header.split(';').next().filter(|m| !m.is_empty());
            (media_type, data)
        }
        None => (None, trimmed),
    }
}

/// Detect image media type from magic bytes.
fn detect_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> ExtractRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn text_is_auto_classified() {
        let input = order_input(&request(serde_json::json!({
            "text": "CANT.;1;COD. TN;A;DESCRIPCION;D;PRECIO;1"
        })))
        .unwrap();
        assert!(matches!(input, OrderInput::Delimited(_)));

        let input = order_input(&request(serde_json::json!({"text": "3 relojes"}))).unwrap();
        assert!(matches!(input, OrderInput::Text(_)));
    }

    #[test]
    fn explicit_kind_wins_over_detection() {
        let input = order_input(&request(serde_json::json!({
            "kind": "text",
            "text": "CANT.;1;COD. TN;A;DESCRIPCION;D;PRECIO;1"
        })))
        .unwrap();
        assert!(matches!(input, OrderInput::Text(_)));
    }

    #[test]
    fn missing_text_is_bad_request() {
        let result = order_input(&request(serde_json::json!({"kind": "delimited"})));
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn data_url_jpeg_is_accepted() {
        let input = image_input("data:image/jpeg;base64,/9j/4AAQ", None).unwrap();
        assert_eq!(
            input,
            OrderInput::Image {
                media_type: "image/jpeg".into(),
                data: "/9j/4AAQ".into(),
            }
        );
    }

    #[test]
    fn magic_bytes_override_declared_type() {
        let png = base64::engine::general_purpose::STANDARD
            .encode([0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00]);
        match image_input(&png, Some("image/jpeg")).unwrap() {
            OrderInput::Image { media_type, .. } => assert_eq!(media_type, "image/png"),
            other => panic!("unexpected input {other:?}"),
        }
    }

    #[test]
    fn unknown_bytes_fall_back_to_declared_type() {
        let raw = base64::engine::general_purpose::STANDARD.encode(b"hello");
        match image_input(&raw, Some("image/webp")).unwrap() {
            OrderInput::Image { media_type, .. } => assert_eq!(media_type, "image/webp"),
            other => panic!("unexpected input {other:?}"),
        }
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let raw = base64::engine::general_purpose::STANDARD.encode(b"%PDF-1.4");
        assert!(matches!(
            image_input(&raw, Some("application/pdf")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(matches!(
            image_input("not-valid-base64!!!", None),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn detect_gif_and_webp() {
        assert_eq!(detect_media_type(b"GIF89a...."), Some("image/gif"));
        assert_eq!(detect_media_type(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(detect_media_type(&[0x00, 0x01]), None);
    }
}
