use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ConsultationService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn delete_consultation(
    service: &ConsultationService,
    consultation_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    let consultation = match storage.get_consultation_by_id(consultation_id).await {
        Ok(Some(consultation)) => consultation,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ConsultationNotFound,
                "Consultation not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to load consultation", e)),
    };

    // 参与者或管理员
    if !user.is_admin() && !consultation.involves(user.id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "No permission to cancel this consultation",
        )));
    }

    match storage.delete_consultation(consultation_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Consultation cancelled successfully",
        ))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ConsultationNotFound,
            "Consultation not found",
        ))),
        Err(e) => Ok(internal_error("Failed to delete consultation", e)),
    }
}
