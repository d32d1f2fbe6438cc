use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireCourseAccess};
use crate::models::enrollments::requests::{EnrollRequest, UpdateProgressRequest};
use crate::models::users::entities::UserRole;
use crate::services::EnrollmentService;
use crate::utils::SafeCourseIdI64;

// 懒加载的全局 EnrollmentService 实例
static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

pub async fn enroll(req: HttpRequest, body: web::Json<EnrollRequest>) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.enroll(body.into_inner(), &req).await
}

pub async fn list_my_enrollments(req: HttpRequest) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.list_my_enrollments(&req).await
}

pub async fn get_status(req: HttpRequest, course_id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.get_status(course_id.0, &req).await
}

pub async fn update_progress(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    body: web::Json<UpdateProgressRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .update_progress(course_id.0, body.into_inner(), &req)
        .await
}

pub async fn unenroll(req: HttpRequest, course_id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.unenroll(course_id.0, &req).await
}

pub async fn list_students(req: HttpRequest) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.list_students(&req).await
}

// 配置路由
pub fn configure_enrollment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/enrollments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route(web::post().to(enroll)),
            )
            .route("/my", web::get().to(list_my_enrollments))
            .service(
                web::resource("/courses/{course_id}/students")
                    .wrap(RequireCourseAccess::manage())
                    .route(web::get().to(list_students)),
            )
            .service(
                web::resource("/courses/{course_id}/progress")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route(web::put().to(update_progress)),
            )
            .route("/courses/{course_id}", web::get().to(get_status))
            .route("/courses/{course_id}", web::delete().to(unenroll)),
    );
}
