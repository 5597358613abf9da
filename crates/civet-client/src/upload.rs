// SPDX-License-Identifier: AGPL-3.0
// Civet Client - Receipt image upload
//
// The backend parses the image server-side and answers with the image hash;
// `existing: true` means this exact image was uploaded before and no new
// receipt was created.

use crate::api::ApiClient;
use civet_core::{AppError, UploadOutcome};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;

impl ApiClient {
    /// `POST receipt/upload` - upload a receipt photo for an outing.
    ///
    /// Only image files are accepted; the check happens here before any
    /// bytes leave the machine. Optional EXIF metadata rides along as a
    /// second form field.
    pub async fn upload_receipt(
        &self,
        outing_id: &str,
        path: &Path,
        exif: Option<String>,
    ) -> Result<UploadOutcome, AppError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::FileIo("Invalid file path".to_string()))?
            .to_string();

        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(AppError::FileIo(format!(
                "Only image files can be uploaded, got {}",
                mime
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::FileIo(format!("Failed to read {}: {}", file_name, e)))?;

        tracing::info!("Uploading {} ({} bytes)", file_name, bytes.len());

        let photo = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.as_ref())
            .map_err(|e| AppError::Serialization(format!("Invalid MIME type: {}", e)))?;

        let mut form = Form::new().part("photo.0", photo);
        if let Some(exif) = exif {
            form = form.text("exif.0", exif);
        }

        self.send_json(
            self.request(Method::POST, "receipt/upload")
                .header("outingId", outing_id)
                .multipart(form),
            "upload receipt",
        )
        .await
    }
}
