pub mod assignments;
pub mod auth;
pub mod common;
pub mod consultations;
pub mod courses;
pub mod enrollments;
pub mod files;
pub mod lessons;
pub mod statistics;
pub mod submissions;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery, error_code::ErrorCode};

/// 进程启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
