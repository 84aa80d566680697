//! Route table

use crate::{
    handlers::{files, health},
    AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(files::list_files).post(files::upload_files))
        .route("/download/*filename", get(files::download_file))
        .route("/delete", post(files::delete_file))
        .route("/health", get(health::handle_health))
}
