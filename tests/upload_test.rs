use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use filestream::config::UploadConfig;
use filestream::utils::size::pretty_byte_size;
use filestream::{AppState, create_app};
use http_body_util::BodyExt;
use image::{ImageFormat, RgbImage};
use serde_json::Value;
use std::io::Cursor;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

fn setup() -> (TempDir, Router) {
    setup_with(|_| {})
}

fn setup_with(configure: impl FnOnce(&mut UploadConfig)) -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let mut config = UploadConfig::with_upload_dir(dir.path());
    config.allowed_extensions = vec![".txt".to_string(), ".png".to_string()];
    configure(&mut config);
    (dir, create_app(AppState::new(config)))
}

fn multipart_body(fields: &[(&str, String)], filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
            Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn chunk_body(filename: &str, chunk: &str, max_range: u64, file_size: u64, unique: bool) -> Vec<u8> {
    multipart_body(
        &[
            ("max_range", max_range.to_string()),
            ("file_size", file_size.to_string()),
            ("unique_name", unique.to_string()),
        ],
        filename,
        chunk.as_bytes(),
    )
}

fn strip_body(filename: &str, data: &[u8]) -> Vec<u8> {
    let size = data.len().to_string();
    multipart_body(
        &[
            ("max_range", size.clone()),
            ("file_size", size),
            ("unique_name", "true".to_string()),
            ("strip_metadata", "true".to_string()),
        ],
        filename,
        data,
    )
}

async fn post_chunk(app: &Router, body: Vec<u8>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn delete_file(app: &Router, file_name: &str) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/upload/{}", file_name))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_chunked_upload_flow() {
    let (dir, app) = setup();

    // 1. First chunk is stored but the upload is not complete
    let (status, json) = post_chunk(&app, chunk_body("notes.txt", "Hello, ", 7, 13, true)).await;
    assert_eq!(status, StatusCode::ACCEPTED, "body: {}", json);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["file_name"], "notes.txt");

    // 2. Last chunk completes it
    let (status, json) = post_chunk(&app, chunk_body("notes.txt", "world!", 13, 13, true)).await;
    assert_eq!(status, StatusCode::OK, "body: {}", json);
    assert_eq!(json["file_name"], "notes.txt");
    assert_eq!(json["file_extension"], ".txt");
    assert_eq!(json["file_size"], "13.0B");
    let unique = json["file_unique_name"].as_str().unwrap();
    assert!(unique.ends_with(".txt"));
    assert_ne!(unique, "notes.txt");

    let content = std::fs::read_to_string(dir.path().join("notes.txt")).unwrap();
    assert_eq!(content, "Hello, world!");

    // 3. Late chunk is refused and the file is untouched
    let (status, _) = post_chunk(&app, chunk_body("notes.txt", "again", 18, 13, false)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let content = std::fs::read_to_string(dir.path().join("notes.txt")).unwrap();
    assert_eq!(content, "Hello, world!");

    // 4. Remove, then removing again is a 404
    assert_eq!(delete_file(&app, "notes.txt").await, StatusCode::NO_CONTENT);
    assert!(!dir.path().join("notes.txt").exists());
    assert_eq!(delete_file(&app, "notes.txt").await, StatusCode::NOT_FOUND);

    // 5. The name is free again after removal
    let (status, json) = post_chunk(&app, chunk_body("notes.txt", "fresh", 5, 5, false)).await;
    assert_eq!(status, StatusCode::OK, "body: {}", json);
    assert_eq!(json["file_unique_name"], "");
    assert_eq!(json["file_size"], "5.0B");
}

#[tokio::test]
async fn test_disallowed_extension_rejected() {
    let (dir, app) = setup();

    let (status, json) = post_chunk(&app, chunk_body("run.EXE", "MZ", 2, 2, false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains(".exe"));
    assert!(!dir.path().join("run.EXE").exists());
}

#[tokio::test]
async fn test_uppercase_extension_allowed() {
    let (_dir, app) = setup();

    let (status, json) = post_chunk(&app, chunk_body("README.TXT", "hi", 2, 2, false)).await;
    assert_eq!(status, StatusCode::OK, "body: {}", json);
    assert_eq!(json["file_extension"], ".TXT");
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let (_dir, app) = setup();

    let body = multipart_body(&[], "a.txt", b"data");
    let (status, json) = post_chunk(&app, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("max_range"));

    let malformed = multipart_body(
        &[
            ("max_range", "four".to_string()),
            ("file_size", "4".to_string()),
        ],
        "a.txt",
        b"data",
    );
    let (status, _) = post_chunk(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_rejects_dot_dot() {
    let (_dir, app) = setup();

    assert_eq!(delete_file(&app, "..").await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_strip_metadata_reports_final_size() {
    let (dir, app) = setup();

    let mut png = Vec::new();
    RgbImage::from_pixel(64, 64, image::Rgb([12, 200, 40]))
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();

    let (status, json) = post_chunk(&app, strip_body("photo.png", &png)).await;
    assert_eq!(status, StatusCode::OK, "body: {}", json);
    assert_eq!(json["metadata_stripped"], true);

    let on_disk = std::fs::read(dir.path().join("photo.png")).unwrap();
    assert_eq!(image::guess_format(&on_disk).unwrap(), ImageFormat::Jpeg);
    assert_eq!(json["file_size"], pretty_byte_size(on_disk.len() as u64));
}

#[tokio::test]
async fn test_failed_strip_keeps_upload() {
    let (dir, app) = setup();

    let (status, json) = post_chunk(&app, strip_body("bad.png", b"not an image")).await;
    assert_eq!(status, StatusCode::OK, "body: {}", json);
    assert_eq!(json["metadata_stripped"], false);
    assert_eq!(json["file_size"], "12.0B");
    assert!(json["file_unique_name"].as_str().unwrap().ends_with(".png"));
    assert_eq!(
        std::fs::read(dir.path().join("bad.png")).unwrap(),
        b"not an image"
    );

    assert_eq!(delete_file(&app, "bad.png").await, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_oversized_chunk_rejected() {
    let (dir, app) = setup_with(|config| config.max_chunk_size = 1024);

    let chunk = vec![b'a'; 2 * 1024 * 1024];
    let size = chunk.len().to_string();
    let body = multipart_body(
        &[("max_range", size.clone()), ("file_size", size)],
        "huge.txt",
        &chunk,
    );

    let (status, json) = post_chunk(&app, body).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "body: {}", json);
    assert!(!dir.path().join("huge.txt").exists());
}

#[tokio::test]
async fn test_health_check() {
    let (_dir, app) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["upload_dir"], "ready");
}
