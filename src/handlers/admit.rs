use axum::{
    extract::{Multipart, State},
    response::Json,
    Extension,
};
use bytes::{Bytes, BytesMut};
use std::io::Cursor;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, Rejection};
use crate::middleware::RequestId;
use crate::models::{AdmitResponse, ClassificationData, ClassifyResponse, UploadDescriptor};
use crate::state::AppState;

/// Runs the full admission policy on the `file` field of a multipart form.
pub async fn admit_handler(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    mut multipart: Multipart,
) -> AppResult<Json<AdmitResponse>> {
    let start = Instant::now();

    info!(request_id = %request_id, "Starting upload admission request");

    let _permit = state.gate.try_acquire()?;

    let (file_name, data) = match extract_file_from_multipart(&mut multipart, &state).await {
        Ok(file) => file,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Upload not read from multipart form");
            return Err(e);
        }
    };
    let declared_size = i64::try_from(data.len()).unwrap_or(i64::MAX);

    info!(
        request_id = %request_id,
        file_name = %file_name,
        file_size = declared_size,
        "File extracted from multipart form"
    );

    let mut descriptor = UploadDescriptor::new(Cursor::new(data), file_name, declared_size);
    let media_type = state.policy.admit(&mut descriptor, &state.admission)?;

    let total_time = start.elapsed().as_millis() as u64;
    info!(
        request_id = %request_id,
        media_type = %media_type,
        total_time_ms = total_time,
        "Upload admitted"
    );

    Ok(Json(AdmitResponse::accepted(
        descriptor.declared_name,
        declared_size,
        media_type,
        total_time,
    )))
}

/// Reads the `file` field. The declared name is checked before any content
/// is read, and reading stops as soon as the size limit is passed.
async fn extract_file_from_multipart(
    multipart: &mut Multipart,
    state: &AppState,
) -> AppResult<(String, Bytes)> {
    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        AppError::invalid_file(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        // An absent filename is left for the extension check to reject.
        let file_name = field.file_name().unwrap_or_default().to_string();
        state.policy.check_name(&file_name, &state.admission)?;

        let limit = state.admission.max_size_bytes();
        let mut data = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::invalid_file(format!("Failed to read file data: {}", e)))?
        {
            data.extend_from_slice(&chunk);
            let received = i64::try_from(data.len()).unwrap_or(i64::MAX);
            if received > limit {
                info!(
                    file_name = %file_name,
                    received_bytes = received,
                    max_size = limit,
                    "Upload exceeds size limit, stopped reading"
                );
                return Err(Rejection::FileTooLarge {
                    size: received,
                    limit,
                }
                .into());
            }
        }

        debug!(file_name = %file_name, file_size = data.len(), "Read multipart file field");
        return Ok((file_name, data.freeze()));
    }

    Err(AppError::MissingFile)
}

/// Classifies a raw request body without applying any admission policy.
pub async fn classify_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ClassifyResponse>> {
    let start = Instant::now();
    let _permit = state.gate.try_acquire()?;

    let size_bytes = body.len();
    let mut stream = Cursor::new(body);
    let media_type = state.policy.classifier().classify(&mut stream)?;

    info!(
        media_type = %media_type,
        file_size = size_bytes,
        "Classified binary upload"
    );

    Ok(Json(ClassifyResponse::new(
        ClassificationData {
            media_type,
            size_bytes,
        },
        start.elapsed().as_millis() as u64,
    )))
}
