use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::require_jwt::invalidate_user_cache;
use crate::models::auth::requests::UpdateProfileRequest;
use crate::models::auth::responses::UserInfoResponse;
use crate::models::users::requests::UpdateUserRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{cache_from_request, current_user, internal_error};
use crate::try_response;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::{
    normalize_email, validate_email, validate_name, validate_password_simple,
};

use super::AuthService;

pub async fn handle_update_profile(
    service: &AuthService,
    update_data: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let current = try_response!(current_user(request));

    if let Some(ref name) = update_data.name
        && let Err(msg) = validate_name(name)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 邮箱格式与唯一性
    let email = update_data.email.as_deref().map(normalize_email);
    if let Some(ref email) = email {
        if let Err(msg) = validate_email(email) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
        }
        match storage.get_user_by_email(email).await {
            Ok(Some(existing)) if existing.id != current.id => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::UserEmailAlreadyExists,
                    "Email already exists",
                )));
            }
            Ok(_) => {}
            Err(e) => return Ok(internal_error("Profile email lookup failed", e)),
        }
    }

    // 修改密码必须校验当前密码；缓存中的用户不含密码哈希，从存储重新读取
    let password_hash = match update_data.password {
        Some(ref password) => {
            let Some(ref current_password) = update_data.current_password else {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::CurrentPasswordIncorrect,
                    "current_password is required to change password",
                )));
            };
            let stored = match storage.get_user_by_id(current.id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    return Ok(HttpResponse::NotFound()
                        .json(ApiResponse::error_empty(ErrorCode::UserNotFound, "User not found")));
                }
                Err(e) => return Ok(internal_error("Profile user lookup failed", e)),
            };
            if !verify_password(current_password, &stored.password_hash) {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::CurrentPasswordIncorrect,
                    "Current password is incorrect",
                )));
            }
            if let Err(msg) = validate_password_simple(password) {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
            }
            match hash_password(password) {
                Ok(hash) => Some(hash),
                Err(e) => return Ok(internal_error("Password hashing failed", e)),
            }
        }
        None => None,
    };

    // 不包含 role，普通用户无权修改
    let storage_update = UpdateUserRequest {
        email,
        password: password_hash,
        name: update_data.name.map(|n| n.trim().to_string()),
        role: None,
    };

    match storage.update_user(current.id, storage_update).await {
        Ok(Some(user)) => {
            if let Some(cache) = cache_from_request(request) {
                invalidate_user_cache(cache.as_ref(), user.id).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserInfoResponse { user },
                "Profile updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::UserNotFound, "User not found"))),
        Err(e) => Ok(internal_error("Failed to update profile", e)),
    }
}
