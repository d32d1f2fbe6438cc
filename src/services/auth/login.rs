use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{AuthResponse, LoginRequest},
};
use crate::services::internal_error;
use crate::utils::jwt;
use crate::utils::password::verify_password;
use crate::utils::validate::normalize_email;

use super::AuthService;

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::AuthFailed,
        "Email or password is incorrect",
    ))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let email = normalize_email(&login_request.email);

    // 1. 根据邮箱获取用户
    let user = match storage.get_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(invalid_credentials()),
        Err(e) => return Ok(internal_error("Login lookup failed", e)),
    };

    // 2. 验证密码
    if !verify_password(&login_request.password, &user.password_hash) {
        tracing::info!("Failed login attempt for user {}", user.id);
        return Ok(invalid_credentials());
    }

    // 3. 更新最后登录时间
    if let Err(e) = storage.update_last_login(user.id).await {
        tracing::warn!("Failed to update last login for user {}: {}", user.id, e);
    }

    // 4. 生成令牌对
    let token_pair = match user.generate_token_pair() {
        Ok(pair) => pair,
        Err(e) => return Ok(internal_error("Failed to generate JWT token", e)),
    };

    tracing::info!("User {} logged in successfully", user.id);

    let response = AuthResponse {
        access_token: token_pair.access_token,
        expires_in: jwt::JwtUtils::access_token_expires_in(),
        user,
        created_at: chrono::Utc::now(),
    };

    // 5. refresh token 写入 cookie
    let refresh_cookie = jwt::JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token);

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie)
        .json(ApiResponse::success(response, "Login successful")))
}
