use std::sync::Arc;

use tracing::debug;

use crate::classroom::ClassroomClient;
use crate::error::AppError;
use crate::graph::EducationClient;
use crate::models::{DriveItem, ResourcesFolder};

/// Moves file bytes from Drive into a Teams resources folder.
pub struct FileTransferAgent {
    source: Arc<dyn ClassroomClient>,
    destination: Arc<dyn EducationClient>,
}

impl FileTransferAgent {
    pub fn new(source: Arc<dyn ClassroomClient>, destination: Arc<dyn EducationClient>) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// `context` names the coursework item the file belongs to, for reporting.
    pub async fn fetch_source_file(
        &self,
        context: &str,
        file_id: &str,
        target_mime: &str,
        is_export: bool,
    ) -> Result<Vec<u8>, AppError> {
        let result = if is_export {
            self.source.export_file(file_id, target_mime).await
        } else {
            self.source.download_file(file_id).await
        };

        let bytes = result.map_err(|e| AppError::file_fetch(context, file_id, e))?;
        debug!(
            "Fetched {} bytes for file {} (export: {})",
            bytes.len(),
            file_id,
            is_export
        );
        Ok(bytes)
    }

    pub async fn upload_to_destination(
        &self,
        context: &str,
        folder: &ResourcesFolder,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DriveItem, AppError> {
        let size = bytes.len();
        let item = self
            .destination
            .upload_file(&folder.drive_id, &folder.item_id, file_name, bytes)
            .await
            .map_err(|e| AppError::file_upload(context, file_name, e))?;
        debug!("Uploaded {} ({} bytes) as item {}", file_name, size, item.id);
        Ok(item)
    }
}
