use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::consultations::requests::CreateConsultationRequest;
use crate::services::ConsultationService;
use crate::utils::SafeIDI64;

// 懒加载的全局 ConsultationService 实例
static CONSULTATION_SERVICE: Lazy<ConsultationService> =
    Lazy::new(ConsultationService::new_lazy);

pub async fn create_consultation(
    req: HttpRequest,
    body: web::Json<CreateConsultationRequest>,
) -> ActixResult<HttpResponse> {
    CONSULTATION_SERVICE
        .create_consultation(body.into_inner(), &req)
        .await
}

pub async fn list_my_consultations(req: HttpRequest) -> ActixResult<HttpResponse> {
    CONSULTATION_SERVICE.list_my_consultations(&req).await
}

pub async fn delete_consultation(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    CONSULTATION_SERVICE.delete_consultation(path.0, &req).await
}

// 配置路由
pub fn configure_consultation_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/consultations")
            .wrap(middlewares::RequireJWT)
            .route("", web::post().to(create_consultation))
            .route("/my", web::get().to(list_my_consultations))
            .route("/{id}", web::delete().to(delete_consultation)),
    );
}
