use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::require_jwt::invalidate_user_cache;
use crate::models::{ApiResponse, ErrorCode, users::requests::UpdateUserRequest};
use crate::services::{cache_from_request, internal_error};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    normalize_email, validate_email, validate_name, validate_password_simple,
};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Some(ref name) = update_data.name {
        if let Err(msg) = validate_name(name) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
        }
        update_data.name = Some(name.trim().to_string());
    }

    if let Some(ref email) = update_data.email {
        let email = normalize_email(email);
        if let Err(msg) = validate_email(&email) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
        }
        match storage.get_user_by_email(&email).await {
            Ok(Some(existing)) if existing.id != user_id => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::UserEmailAlreadyExists,
                    "Email already exists",
                )));
            }
            Ok(_) => {}
            Err(e) => return Ok(internal_error("User email lookup failed", e)),
        }
        update_data.email = Some(email);
    }

    if let Some(ref password) = update_data.password {
        if let Err(msg) = validate_password_simple(password) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
        }
        match hash_password(password) {
            Ok(hash) => update_data.password = Some(hash),
            Err(e) => return Ok(internal_error("Password hashing failed", e)),
        }
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => {
            // 角色或邮箱可能已变更，清除认证缓存
            if let Some(cache) = cache_from_request(request) {
                invalidate_user_cache(cache.as_ref(), user_id).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                user,
                "User information updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(internal_error("Failed to update user", e)),
    }
}
