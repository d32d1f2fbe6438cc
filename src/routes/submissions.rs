use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::submissions::requests::{
    GradeSubmissionRequest, MySubmissionsQuery, UpdateSubmissionRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::SubmissionService;
use crate::utils::SafeIDI64;

// 懒加载的全局 SubmissionService 实例
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

pub async fn list_my_submissions(
    req: HttpRequest,
    query: web::Query<MySubmissionsQuery>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_my_submissions(query.into_inner(), &req)
        .await
}

pub async fn get_submission(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.get_submission(path.0, &req).await
}

pub async fn update_submission(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .update_submission(path.0, body.into_inner(), &req)
        .await
}

pub async fn delete_submission(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.delete_submission(path.0, &req).await
}

pub async fn grade_submission(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .grade_submission(path.0, body.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/submissions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/my")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route(web::get().to(list_my_submissions)),
            )
            .service(
                web::resource("/{id}/grade")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route(web::put().to(grade_submission)),
            )
            .route("/{id}", web::get().to(get_submission))
            .route("/{id}", web::put().to(update_submission))
            .route("/{id}", web::delete().to(delete_submission)),
    );
}
