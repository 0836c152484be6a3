//! Integration tests for the upload admission service

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use tower::ServiceExt;

use upload_guard::{config::Config, handlers::create_router, AppState};

const BOUNDARY: &str = "upload-guard-test-boundary";

fn app_with(vars: &[(&str, &str)]) -> Router {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = Config::from_source(|name| vars.get(name).cloned()).unwrap();
    create_router(AppState::new(config).unwrap())
}

fn app() -> Router {
    app_with(&[
        ("ALLOWED_FILE_TYPES", "application/pdf; text/csv"),
        ("MAX_FILE_SIZE_KB", "1"),
    ])
}

fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn admit_request(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/admit")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, file_name, content)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_admits_allowed_pdf() {
    let response = app()
        .oneshot(admit_request("file", "report.pdf", b"%PDF-1.4\nbody"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["file_name"], "report.pdf");
    assert_eq!(body["data"]["media_type"], "application/pdf");
    assert_eq!(body["data"]["size_bytes"], 13);
    assert_eq!(body["data"]["accepted"], true);
}

#[tokio::test]
async fn test_rejects_denied_extension() {
    let response = app()
        .oneshot(admit_request("file", "malware.exe", b"%PDF-1.4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "FILETYPE_NOT_ACCEPTABLE");
    assert_eq!(body["error"]["message"], "Filetype not acceptable.");
}

#[tokio::test]
async fn test_rejects_oversized_upload() {
    let content = vec![b'a'; 1025];
    let response = app()
        .oneshot(admit_request("file", "data.csv", &content))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "FILE_TOO_LARGE");
    assert_eq!(body["error"]["message"], "File size exceeds max file size.");
}

#[tokio::test]
async fn test_rejects_type_not_on_allow_list() {
    let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
    let response = app()
        .oneshot(admit_request("file", "renamed.pdf", &png))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "FILE_TYPE_NOT_MATCHED");
    assert_eq!(body["error"]["message"], "File Type Not Matched..");
}

// Well past the configured limit plus the multipart framing allowance.
const LARGE_UPLOAD: usize = 200 * 1024;

#[tokio::test]
async fn test_large_upload_is_rejected_for_size() {
    let content = vec![b'a'; LARGE_UPLOAD];
    let response = app()
        .oneshot(admit_request("file", "data.csv", &content))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "FILE_TOO_LARGE");
    assert_eq!(body["error"]["message"], "File size exceeds max file size.");
}

#[tokio::test]
async fn test_large_upload_with_denied_extension_is_rejected_for_name() {
    let content = vec![b'a'; LARGE_UPLOAD];
    let response = app()
        .oneshot(admit_request("file", "malware.exe", &content))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "FILETYPE_NOT_ACCEPTABLE");
    assert_eq!(body["error"]["message"], "Filetype not acceptable.");
}

#[tokio::test]
async fn test_error_body_carries_header_request_id() {
    let response = app()
        .oneshot(admit_request("file", "malware.exe", b"%PDF-1.4"))
        .await
        .unwrap();

    let header_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["error"]["request_id"], header_id.as_str());
}

#[tokio::test]
async fn test_client_request_id_is_reused() {
    let mut request = admit_request("file", "data.csv", &vec![b'a'; 2048]);
    request
        .headers_mut()
        .insert("x-request-id", "client-supplied-42".parse().unwrap());

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()["x-request-id"], "client-supplied-42");
    let body = json_body(response).await;
    assert_eq!(body["error"]["request_id"], "client-supplied-42");
}

#[tokio::test]
async fn test_missing_file_field() {
    let response = app()
        .oneshot(admit_request("attachment", "report.pdf", b"%PDF-1.4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_classify_binary_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/classify")
        .body(Body::from(b"GIF89a\x01\x00\x01\x00".to_vec()))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["media_type"], "image/gif");
    assert_eq!(body["data"]["size_bytes"], 10);
}

#[tokio::test]
async fn test_health_reports_admission_config() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["admission"]["max_size_kb"], 1);
    assert_eq!(
        body["admission"]["allowed_types"],
        serde_json::json!(["application/pdf", "text/csv"])
    );
    assert_eq!(body["classifier"]["signatures"], 11);
}

#[tokio::test]
async fn test_ready() {
    let request = Request::builder()
        .uri("/ready")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_max_size_config_is_rejected() {
    let vars: HashMap<String, String> =
        [("MAX_FILE_SIZE_KB".to_string(), "big".to_string())].into();
    assert!(Config::from_source(|name| vars.get(name).cloned()).is_err());
}
