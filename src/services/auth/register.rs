use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{AuthResponse, RegisterRequest},
    users::{entities::UserRole, requests::CreateUserRequest},
};
use crate::services::internal_error;
use crate::utils::jwt;
use crate::utils::password::hash_password;
use crate::utils::validate::{
    normalize_email, validate_email, validate_name, validate_password_simple,
};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 自助注册只能是学生或教师
    let role = register_request.role.unwrap_or(UserRole::Student);
    if role == UserRole::Admin {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserRoleInvalid,
            "Role must be STUDENT or TEACHER",
        )));
    }

    let email = normalize_email(&register_request.email);
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    if let Err(msg) = validate_name(&register_request.name) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    if let Err(msg) = validate_password_simple(&register_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    // 检查邮箱是否已存在
    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(internal_error("Register lookup failed", e)),
    }

    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(internal_error("Password hashing failed", e)),
    };

    let user = match storage
        .create_user(CreateUserRequest {
            email,
            password: password_hash,
            name: register_request.name.trim().to_string(),
            role,
        })
        .await
    {
        Ok(user) => user,
        Err(e) => return Ok(internal_error("Failed to create user", e)),
    };

    let token_pair = match user.generate_token_pair() {
        Ok(pair) => pair,
        Err(e) => return Ok(internal_error("Failed to generate JWT token", e)),
    };

    tracing::info!("User {} registered as {}", user.id, user.role);

    let response = AuthResponse {
        access_token: token_pair.access_token,
        expires_in: jwt::JwtUtils::access_token_expires_in(),
        user,
        created_at: chrono::Utc::now(),
    };

    Ok(HttpResponse::Created()
        .cookie(jwt::JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token))
        .json(ApiResponse::success(response, "Registration successful")))
}
