pub mod attachments;
pub mod error_code;
pub mod pagination;
pub mod response;

pub use pagination::{PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
