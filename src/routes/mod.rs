pub mod assignments;

pub mod auth;

pub mod consultations;

pub mod courses;

pub mod enrollments;

pub mod lessons;

pub mod statistics;

pub mod submissions;

pub mod upload;

pub mod users;

pub use auth::configure_auth_routes;
pub use consultations::configure_consultation_routes;
pub use courses::configure_course_routes;
pub use enrollments::configure_enrollment_routes;
pub use statistics::configure_statistics_routes;
pub use submissions::configure_submission_routes;
pub use upload::configure_upload_routes;
pub use users::configure_user_routes;

#[cfg(test)]
mod tests;
