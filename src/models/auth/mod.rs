pub mod requests;
pub mod responses;

pub use requests::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    UpdateProfileRequest,
};
pub use responses::{AuthResponse, ForgotPasswordResponse, RefreshTokenResponse, UserInfoResponse};
