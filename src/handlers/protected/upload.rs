// handlers/protected/upload.rs - POST /api/file_upload handler

use std::path::{Path, PathBuf};

use axum::{body::Bytes, extract::Multipart, Extension};
use serde::Serialize;
use uuid::Uuid;

use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Public prefix the upload directory is served under.
pub const UPLOADS_ROUTE: &str = "uploads";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
}

/// First multipart field named `file`: its client file name and contents.
pub(crate) async fn read_file_field(multipart: &mut Multipart) -> Result<(Option<String>, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await?;
            return Ok((file_name, data));
        }
    }
    Err(ApiError::invalid_field("file", "multipart field is missing"))
}

/// `<uuid v4><.ext>`, keeping only the extension of the client's name.
pub fn stored_file_name(original: Option<&str>) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    format!("{}{}", Uuid::new_v4(), ext)
}

/// POST /api/file_upload - multipart `file`
pub async fn file_upload_post(Extension(auth): Extension<AuthUser>, mut multipart: Multipart) -> ApiResult<UploadResponse> {
    auth.require_admin()?;
    let (original, data) = read_file_field(&mut multipart).await?;

    let dir = PathBuf::from(&config::config().api.upload_dir);
    let name = stored_file_name(original.as_deref());
    let save = async {
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), &data).await
    };
    save.await.map_err(|e| {
        tracing::error!("Failed to save upload {}: {}", name, e);
        ApiError::internal_server_error("Failed to save file")
    })?;

    tracing::info!("Stored upload {} ({} bytes)", name, data.len());
    Ok(ApiResponse::success(UploadResponse {
        message: "File uploaded successfully".to_string(),
        url: format!("{}/{}", UPLOADS_ROUTE, name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_extension() {
        let name = stored_file_name(Some("../../etc/poster.PNG"));
        assert!(name.ends_with(".PNG"));
        assert!(!name.contains('/'));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn missing_or_odd_extension_is_dropped() {
        assert_eq!(stored_file_name(None).len(), 36);
        assert_eq!(stored_file_name(Some("README")).len(), 36);
        assert_eq!(stored_file_name(Some("a.t xt")).len(), 36);
    }
}
