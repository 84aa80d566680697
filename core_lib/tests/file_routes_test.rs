use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use depot_core::{create_app, AppState, FileManager, FileManagerConfig};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "depot-test-boundary";

async fn setup_app(max_content_length: u64) -> (Router, FileManager, TempDir) {
    let temp_dir = TempDir::new().unwrap();

    let manager = FileManager::new(FileManagerConfig {
        storage_path: temp_dir.path().join("fichiers"),
        max_content_length,
    });
    manager.initialize().await.unwrap();

    let app = create_app(AppState::new(manager.clone()));
    (app, manager, temp_dir)
}

fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    field, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

fn delete_request(form: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/delete")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn stored_names(temp_dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(temp_dir.path().join("fichiers"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_list_empty_repository() {
    let (app, _manager, _temp_dir) = setup_app(512 * 1024 * 1024).await;

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["count"], 0);
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["max_upload_mb"], 512);
}

#[tokio::test]
async fn test_upload_list_and_download() {
    let (app, _manager, temp_dir) = setup_app(1024 * 1024).await;

    let body = multipart_body(&[
        ("files", Some("hello.txt"), b"Hello, World!"),
        ("files", Some("../../notes v2.md"), b"# notes"),
    ]);
    let response = app.clone().oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["level"], "success");
    assert_eq!(body["message"], "2 file(s) uploaded successfully.");
    assert_eq!(stored_names(&temp_dir), vec!["hello.txt", "notes_v2.md"]);

    let response = app.clone().oneshot(get("/")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["count"], 2);
    let hello = body["data"]["files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "hello.txt")
        .unwrap();
    assert_eq!(hello["size"], 13);
    assert_eq!(hello["size_human"], "13 o");

    let response = app.oneshot(get("/download/hello.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"hello.txt\""
    );
    assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Hello, World!");
}

#[tokio::test]
async fn test_upload_without_files_warns() {
    let (app, _manager, temp_dir) = setup_app(1024 * 1024).await;

    let body = multipart_body(&[("comment", None, b"no files here")]);
    let response = app.clone().oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["level"], "warning");
    assert_eq!(body["message"], "No file selected.");

    let body = multipart_body(&[("files", Some(""), b"")]);
    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["level"], "warning");
    assert_eq!(body["data"]["skipped"], 1);

    assert!(stored_names(&temp_dir).is_empty());
}

#[tokio::test]
async fn test_oversized_upload_rejected_without_writes() {
    let (app, _manager, temp_dir) = setup_app(64).await;

    let payload = vec![b'x'; 256];
    let body = multipart_body(&[("files", Some("big.bin"), &payload)]);
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(stored_names(&temp_dir).is_empty());
}

#[tokio::test]
async fn test_oversized_upload_without_content_length_rejected() {
    let (app, _manager, temp_dir) = setup_app(64).await;

    let payload = vec![b'x'; 256];
    let body = multipart_body(&[("files", Some("big.bin"), &payload)]);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(stored_names(&temp_dir).is_empty());
}

#[tokio::test]
async fn test_download_missing_file_is_404() {
    let (app, _manager, _temp_dir) = setup_app(1024).await;

    let response = app.oneshot(get("/download/ghost.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_traversal_stays_inside_storage() {
    let (app, manager, temp_dir) = setup_app(1024).await;

    std::fs::write(temp_dir.path().join("secret.txt"), b"outside").unwrap();

    let response = app.clone().oneshot(get("/download/..%2Fsecret.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(get("/download/a/b/../../secret.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    manager
        .store(vec![depot_core::FileUpload::new("secret.txt", b"inside".to_vec())])
        .await
        .unwrap();

    let response = app.oneshot(get("/download/nested/dir/secret.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"inside");
}

#[tokio::test]
async fn test_delete_outcomes() {
    let (app, manager, temp_dir) = setup_app(1024).await;

    manager
        .store(vec![depot_core::FileUpload::new("old.log", b"log".to_vec())])
        .await
        .unwrap();

    let response = app.clone().oneshot(delete_request("filename=old.log")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["level"], "success");
    assert_eq!(body["message"], "'old.log' deleted.");
    assert!(stored_names(&temp_dir).is_empty());

    let response = app.clone().oneshot(delete_request("filename=old.log")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["level"], "warning");
    assert_eq!(body["message"], "File not found.");

    let response = app.oneshot(delete_request("filename=")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["level"], "warning");
    assert_eq!(body["message"], "Missing file name.");
}

#[tokio::test]
async fn test_delete_traversal_does_not_touch_outside_files() {
    let (app, _manager, temp_dir) = setup_app(1024).await;

    let outside = temp_dir.path().join("passwd");
    std::fs::write(&outside, b"root").unwrap();

    let response = app.oneshot(delete_request("filename=..%2Fpasswd")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["message"], "File not found.");
    assert!(outside.exists());
}

#[tokio::test]
async fn test_health_reports_storage() {
    let (app, manager, temp_dir) = setup_app(1024).await;

    manager
        .store(vec![depot_core::FileUpload::new("a.bin", vec![0u8; 10])])
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["storage"]["file_count"], 1);
    assert_eq!(body["data"]["storage"]["total_size"], 10);

    std::fs::remove_dir_all(temp_dir.path().join("fichiers")).unwrap();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_list_fails_hard_when_storage_missing() {
    let (app, _manager, temp_dir) = setup_app(1024).await;

    std::fs::remove_dir_all(temp_dir.path().join("fichiers")).unwrap();

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
