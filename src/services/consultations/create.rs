use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ConsultationService;
use crate::models::{
    ApiResponse, ErrorCode,
    consultations::{
        entities::{DEFAULT_DURATION_MINUTES, validate_schedule},
        requests::{CreateConsultationRequest, NewConsultation},
    },
    users::entities::UserRole,
};
use crate::services::{current_user, internal_error};
use crate::storage::Storage;
use crate::try_response;

fn invalid(msg: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::ConsultationInvalid, msg))
}

fn trimmed(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

async fn is_actively_enrolled(
    storage: &dyn Storage,
    student_id: i64,
    course_id: i64,
) -> crate::errors::Result<bool> {
    Ok(storage
        .get_enrollment(student_id, course_id)
        .await?
        .is_some_and(|e| e.is_active))
}

pub async fn create_consultation(
    service: &ConsultationService,
    consultation: CreateConsultationRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));

    let duration_minutes = consultation
        .duration_minutes
        .unwrap_or(DEFAULT_DURATION_MINUTES);
    if let Err(msg) = validate_schedule(
        consultation.scheduled_at,
        duration_minutes,
        chrono::Utc::now(),
    ) {
        return Ok(invalid(msg));
    }

    let storage = service.get_storage(request)?;

    let course = match storage.get_course_by_id(consultation.course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to load course", e)),
    };

    // 教师为自己课程的选课学生预约；学生为自己已选的课程预约
    let student_id = match user.role {
        UserRole::Student => user.id,
        UserRole::Teacher | UserRole::Admin => {
            if !course.can_be_managed_by(&user) {
                return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                    ErrorCode::CoursePermissionDenied,
                    "Consultations can only be scheduled for your own courses",
                )));
            }
            let Some(student_id) = consultation.student_id else {
                return Ok(invalid("student_id is required"));
            };
            student_id
        }
    };

    match is_actively_enrolled(storage.as_ref(), student_id, course.id).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::NotEnrolled,
                "The student is not enrolled in this course",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to check enrollment", e)),
    }

    let new = NewConsultation {
        teacher_id: course.teacher_id,
        student_id,
        course_id: course.id,
        scheduled_at: consultation.scheduled_at,
        duration_minutes,
        topic: trimmed(consultation.topic),
        notes: trimmed(consultation.notes),
    };

    match storage.create_consultation(new).await {
        Ok(created) => {
            tracing::info!(
                "Consultation {} scheduled for course {} by user {}",
                created.id,
                course.id,
                user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                created,
                "Consultation scheduled successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create consultation", e)),
    }
}
