//! Supabase Storage operations for the `plant-images` bucket.
//!
//! Images live under `{user_id}/{millis}_{file_name}` so per-user RLS
//! policies can key on the first path segment.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use plantdoc_core::PlantDocError;

use crate::SupabaseClient;

const BUCKET: &str = "plant-images";

/// Upload result: the object path (kept in the scan row for later
/// deletion) and the public URL used for display.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub path: String,
    pub public_url: String,
}

/// Replace anything outside `[A-Za-z0-9.]` so the name is a safe path
/// segment.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}

impl SupabaseClient {
    /// Upload an image to the user's folder in the plant-images bucket.
    pub async fn upload_image(
        &self,
        user_id: Uuid,
        original_name: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<StoredImage> {
        let path = format!(
            "{}/{}_{}",
            user_id,
            Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );

        let response = self
            .authed(
                self.http
                    .post(self.storage_endpoint(&format!("object/{BUCKET}/{path}"))),
            )
            .header("Content-Type", mime_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .context("image upload request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlantDocError::StorageError(format!("{status}: {body}")).into());
        }

        info!("[Storage] Uploaded {}", path);
        let public_url = self.public_image_url(&path);
        Ok(StoredImage { path, public_url })
    }

    /// Public URL for an uploaded object. The bucket is public-read, so
    /// no token is needed to fetch it.
    pub fn public_image_url(&self, path: &str) -> String {
        self.storage_endpoint(&format!("object/public/{BUCKET}/{path}"))
    }

    /// Remove an uploaded object. Missing objects are reported by the
    /// server as an error; callers deleting a scan treat that as
    /// non-fatal.
    pub async fn remove_image(&self, path: &str) -> Result<()> {
        let response = self
            .authed(
                self.http
                    .delete(self.storage_endpoint(&format!("object/{BUCKET}/{path}"))),
            )
            .send()
            .await
            .context("image delete request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("[Storage] Delete of {} failed: {} {}", path, status, body);
            return Err(PlantDocError::StorageError(format!("{status}: {body}")).into());
        }
        Ok(())
    }
}
