//! Final payload assembly and upload.

use std::sync::Arc;

use astrovault_core::payload::SubmissionPayload;
use astrovault_core::snapshot::WizardSnapshot;
use astrovault_platform::{PlatformError, PlatformTransport};

/// Endpoint receiving the finished submission.
pub const UPLOAD_PATH: &str = "/upload-image";

/// Flattens a finished wizard into the wire payload and performs the
/// upload. The call is a single atomic multipart request: if any required
/// part is missing the backend rejects the whole submission, and no
/// re-validation happens here beyond what the step validators already
/// guaranteed.
pub struct SubmissionAssembler {
    transport: Arc<dyn PlatformTransport>,
}

impl SubmissionAssembler {
    pub fn new(transport: Arc<dyn PlatformTransport>) -> Self {
        Self { transport }
    }

    /// Build the payload from the snapshot and upload it.
    pub async fn submit(&self, snapshot: &WizardSnapshot) -> Result<(), PlatformError> {
        let payload = SubmissionPayload::from_snapshot(snapshot);
        tracing::info!(
            file_parts = payload.files.len(),
            field_parts = payload.fields.len(),
            "Submitting observation",
        );
        self.transport.upload(UPLOAD_PATH, &payload).await
    }
}
