use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::auth::responses::{RefreshTokenResponse, UserInfoResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};
use crate::try_response;
use crate::utils::jwt;

use super::AuthService;

fn refresh_rejected(message: &str) -> HttpResponse {
    // 清除无效的 refresh token cookie
    HttpResponse::Unauthorized()
        .cookie(jwt::JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::error_empty(ErrorCode::Unauthorized, message))
}

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(refresh_token) = jwt::JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let claims = match jwt::JwtUtils::verify_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::info!("Refresh token rejected: {}", e);
            return Ok(refresh_rejected("Login expired or invalid, please login again"));
        }
    };

    let Some(user_id) = claims.user_id() else {
        return Ok(refresh_rejected("Invalid user ID in token"));
    };

    // 以数据库中的当前角色签发，角色变更后立即生效
    let storage = service.get_storage(request)?;
    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(refresh_rejected("User no longer exists")),
        Err(e) => return Ok(internal_error("Refresh token user lookup failed", e)),
    };

    let access_token = match jwt::JwtUtils::generate_access_token(user.id, &user.role.to_string()) {
        Ok(token) => token,
        Err(e) => return Ok(internal_error("Failed to generate access token", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        RefreshTokenResponse {
            access_token,
            expires_in: jwt::JwtUtils::access_token_expires_in(),
        },
        "Token refreshed successfully",
    )))
}

pub async fn handle_get_user(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserInfoResponse { user },
        "User information retrieved successfully",
    )))
}
