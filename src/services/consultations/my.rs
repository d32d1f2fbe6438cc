use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ConsultationService;
use crate::models::{
    ApiResponse, consultations::requests::ConsultationFilter, users::entities::UserRole,
};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn list_my_consultations(
    service: &ConsultationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    let filter = match user.role {
        UserRole::Admin => ConsultationFilter::default(),
        UserRole::Teacher => ConsultationFilter {
            teacher_id: Some(user.id),
            ..Default::default()
        },
        UserRole::Student => ConsultationFilter {
            student_id: Some(user.id),
            ..Default::default()
        },
    };

    match storage.list_consultations(filter).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            items,
            "Consultations retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list consultations", e)),
    }
}
