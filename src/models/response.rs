use serde::Serialize;

use super::MediaType;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub processing_time_ms: u64,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, processing_time_ms: u64) -> Self {
        Self {
            success: true,
            data,
            processing_time_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdmissionData {
    pub file_name: String,
    pub size_bytes: i64,
    pub media_type: MediaType,
    pub accepted: bool,
}

#[derive(Debug, Serialize)]
pub struct ClassificationData {
    pub media_type: MediaType,
    pub size_bytes: usize,
}

pub type AdmitResponse = ApiResponse<AdmissionData>;
pub type ClassifyResponse = ApiResponse<ClassificationData>;

impl AdmitResponse {
    pub fn accepted(
        file_name: String,
        size_bytes: i64,
        media_type: MediaType,
        processing_time_ms: u64,
    ) -> Self {
        ApiResponse::new(
            AdmissionData {
                file_name,
                size_bytes,
                media_type,
                accepted: true,
            },
            processing_time_ms,
        )
    }
}
