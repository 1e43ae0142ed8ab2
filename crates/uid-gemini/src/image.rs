//! Turn the `imageData` tool argument into a request part.
//!
//! Accepted forms, checked in order:
//! - `http(s)://…` URL, sent as a `fileData` reference
//! - `data:image/<type>;base64,<data>` URI
//! - a filesystem path (contains a separator or ends in an image extension)
//! - anything else is treated as raw base64 JPEG data
//!
//! Standard base64 uses `/`, so a path-like input that names no existing
//! file but decodes as base64 is sent as raw data rather than failing.

use base64::Engine;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;
use uid_core::DesignerError;

use crate::types::Part;

const DEFAULT_MIME: &str = "image/jpeg";

static DATA_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^data:(image/\w+);base64,(.+)$").expect("valid data URI regex")
});

static DATA_URI_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/\w+;base64,").expect("valid data URI prefix regex"));

static IMAGE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(png|jpg|jpeg|gif|webp|bmp|svg|tiff|ico)$").expect("valid image path regex")
});

pub async fn resolve_image(input: &str) -> Result<Part, DesignerError> {
    if input.starts_with("http") {
        return Ok(Part::file(image_mime_for(input), input));
    }

    if input.starts_with("data:") {
        if let Some(caps) = DATA_URI_RE.captures(input) {
            return Ok(Part::inline(&caps[1], &caps[2]));
        }
        let data = DATA_URI_PREFIX_RE.replace(input, "");
        return Ok(Part::inline(DEFAULT_MIME, data));
    }

    if looks_like_path(input) {
        let exists = tokio::fs::try_exists(input).await.unwrap_or(false);
        if exists || !is_base64(input) {
            return read_image_file(input).await;
        }
        debug!("Path-like image input names no file, sending it as base64");
    }

    Ok(Part::inline(DEFAULT_MIME, input))
}

fn looks_like_path(input: &str) -> bool {
    input.contains('/') || input.contains('\\') || IMAGE_PATH_RE.is_match(input)
}

fn is_base64(input: &str) -> bool {
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .is_ok()
}

async fn read_image_file(path: &str) -> Result<Part, DesignerError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DesignerError::ImageRead {
            path: path.to_string(),
            message: e.to_string(),
        })?;
    debug!(path, bytes = bytes.len(), "Read image file");

    let data = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(Part::inline(image_mime_for(path), data))
}

/// Image mime type guessed from the extension, else JPEG.
fn image_mime_for(path: &str) -> String {
    let clean = path.split(['?', '#']).next().unwrap_or(path);
    mime_guess::from_path(Path::new(clean))
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_MIME.to_string())
}
