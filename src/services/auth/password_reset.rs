use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use crate::middlewares::require_jwt::invalidate_user_cache;
use crate::models::auth::{ForgotPasswordRequest, ForgotPasswordResponse, ResetPasswordRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{cache_from_request, internal_error};
use crate::utils::password::hash_password;
use crate::utils::validate::{normalize_email, validate_password_simple};

use super::AuthService;

const FORGOT_PASSWORD_MESSAGE: &str =
    "If the email is registered, a password reset link has been sent";

pub async fn handle_forgot_password(
    service: &AuthService,
    forgot_request: ForgotPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let config = service.get_config();
    let email = normalize_email(&forgot_request.email);

    let user = match storage.get_user_by_email(&email).await {
        Ok(user) => user,
        Err(e) => return Ok(internal_error("Forgot password lookup failed", e)),
    };

    // 邮箱是否存在都返回相同信息
    let mut issued_token = None;
    if let Some(user) = user {
        let token = Uuid::new_v4().to_string();
        let expires_at = chrono::Utc::now().timestamp()
            + config.auth.reset_token_expiry_minutes * 60;
        if let Err(e) = storage.set_reset_token(user.id, &token, expires_at).await {
            return Ok(internal_error("Failed to store reset token", e));
        }
        tracing::info!("Password reset token issued for user {}", user.id);
        issued_token = Some(token);
    }

    let response = ForgotPasswordResponse {
        reset_token: issued_token.filter(|_| config.is_development()),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, FORGOT_PASSWORD_MESSAGE)))
}

pub async fn handle_reset_password(
    service: &AuthService,
    reset_request: ResetPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let token = reset_request.token.trim();
    if token.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ResetTokenInvalid,
            "Reset token is invalid or expired",
        )));
    }

    if let Err(msg) = validate_password_simple(&reset_request.new_password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    let password_hash = match hash_password(&reset_request.new_password) {
        Ok(hash) => hash,
        Err(e) => return Ok(internal_error("Password hashing failed", e)),
    };

    match storage
        .reset_password_with_token(token, &password_hash, chrono::Utc::now().timestamp())
        .await
    {
        Ok(Some(user)) => {
            if let Some(cache) = cache_from_request(request) {
                invalidate_user_cache(cache.as_ref(), user.id).await;
            }
            tracing::info!("Password reset for user {}", user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Password has been reset, please login again",
            )))
        }
        Ok(None) => Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ResetTokenInvalid,
            "Reset token is invalid or expired",
        ))),
        Err(e) => Ok(internal_error("Failed to reset password", e)),
    }
}
