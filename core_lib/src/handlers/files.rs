use axum::{
    body::Body,
    extract::{multipart::MultipartError, Form, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use crate::{
    error::{AppError, Result},
    files::{DeleteOutcome, FileListing, FileUpload, StorageError},
    models::{ApiResponse, DeleteForm, DeleteResponse, FileListResponse, NoticeLevel, UploadResponse},
    AppState,
};

/// Multipart field carrying uploaded files.
pub const UPLOAD_FIELD: &str = "files";

pub async fn list_files(State(state): State<AppState>) -> Result<Json<ApiResponse<FileListResponse>>> {
    let files: Vec<FileListing> = state
        .file_manager
        .list()
        .await?
        .into_iter()
        .map(FileListing::from)
        .collect();

    Ok(Json(ApiResponse::success(FileListResponse {
        count: files.len(),
        files,
        max_upload_mb: state.max_upload_mb(),
    })))
}

pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>> {
    let limit = state.file_manager.max_content_length();
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let raw_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

        uploads.push(FileUpload { raw_name, data });
    }

    if uploads.is_empty() {
        warn!("upload request without any file part");
        return Ok(Json(no_file_selected(0)));
    }

    let report = state.file_manager.store(uploads).await?;

    if report.stored_count() == 0 {
        return Ok(Json(no_file_selected(report.skipped)));
    }

    info!(stored = report.stored_count(), skipped = report.skipped, "upload processed");

    let message = format!("{} file(s) uploaded successfully.", report.stored_count());
    Ok(Json(ApiResponse::with_message(
        UploadResponse {
            level: NoticeLevel::Success,
            stored: report.stored,
            skipped: report.skipped,
        },
        message,
    )))
}

pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let opened = state.file_manager.open(&filename).await?;

    let content_type = mime_guess::from_path(&opened.name).first_or_octet_stream();

    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type.as_ref())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );

    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(opened.size));

    let disposition = format!("attachment; filename=\"{}\"", opened.name);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::Other(anyhow::anyhow!("invalid disposition header: {}", e)))?,
    );

    let body = Body::from_stream(ReaderStream::new(opened.file));

    Ok((StatusCode::OK, headers, body).into_response())
}

pub async fn delete_file(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> Result<Json<ApiResponse<DeleteResponse>>> {
    let response = match state.file_manager.delete(&form.filename).await {
        Ok(DeleteOutcome::Deleted(name)) => {
            let message = format!("'{}' deleted.", name);
            ApiResponse::with_message(
                DeleteResponse {
                    level: NoticeLevel::Success,
                    deleted: Some(name),
                },
                message,
            )
        }
        Ok(DeleteOutcome::NotFound) => ApiResponse::with_message(
            DeleteResponse {
                level: NoticeLevel::Warning,
                deleted: None,
            },
            "File not found.",
        ),
        Err(StorageError::InvalidName(_)) => ApiResponse::with_message(
            DeleteResponse {
                level: NoticeLevel::Warning,
                deleted: None,
            },
            "Missing file name.",
        ),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(response))
}

fn no_file_selected(skipped: usize) -> ApiResponse<UploadResponse> {
    ApiResponse::with_message(
        UploadResponse {
            level: NoticeLevel::Warning,
            stored: Vec::new(),
            skipped,
        },
        "No file selected.",
    )
}

fn multipart_error(err: MultipartError, limit: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(limit = limit, "multipart body exceeded size limit");
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::BadRequest(format!("Failed to read multipart field: {}", err))
    }
}
