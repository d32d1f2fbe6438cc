use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::require_jwt::invalidate_user_cache;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{cache_from_request, current_user, internal_error};
use crate::try_response;

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current = try_response!(current_user(request));

    // 禁止删除当前用户
    if user_id == current.id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        )));
    }

    let storage = service.get_storage(request)?;

    match storage.delete_user(user_id).await {
        Ok(true) => {
            if let Some(cache) = cache_from_request(request) {
                invalidate_user_cache(cache.as_ref(), user_id).await;
            }
            tracing::info!("User {} deleted by admin {}", user_id, current.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(internal_error("User deletion failed", e)),
    }
}
