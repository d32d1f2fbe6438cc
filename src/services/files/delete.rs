use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::path::Path;

use crate::config::AppConfig;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};
use crate::try_response;
use crate::utils::{SafeFilePath, upload_path::resolve_upload_path};

pub async fn handle_delete(request: &HttpRequest, file: SafeFilePath) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));

    if !user.is_admin() && file.user_id != user.id {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Only the uploader or an admin can delete this file",
        )));
    }

    let config = AppConfig::get();
    let relative = file.relative_path();
    let path = match resolve_upload_path(Path::new(&config.upload.dir), &relative) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Rejected file path {}: {}", relative, e);
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                "File not found",
            )));
        }
    };

    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::info!(user_id = user.id, path = %relative, "File deleted");
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("File deleted successfully")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::FileNotFound, "File not found"))),
        Err(e) => Ok(internal_error("Failed to delete file", e)),
    }
}
