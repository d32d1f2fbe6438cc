use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::{assignments, lessons};
use crate::middlewares;
use crate::models::courses::requests::{
    CourseApprovalRequest, CourseListParams, CreateCourseRequest, UpdateCourseRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::CourseService;
use crate::utils::SafeIDI64;

// 懒加载的全局 CourseService 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn list_categories(req: HttpRequest) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_categories(&req).await
}

pub async fn list_my_courses(req: HttpRequest) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_my_courses(&req).await
}

pub async fn get_course(req: HttpRequest, course_id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(course_id.0, &req).await
}

pub async fn create_course(
    req: HttpRequest,
    course_data: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_course(course_data.into_inner(), &req)
        .await
}

pub async fn update_course(
    req: HttpRequest,
    course_id: SafeIDI64,
    update_data: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(course_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_course(req: HttpRequest, course_id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(course_id.0, &req).await
}

pub async fn set_approval(
    req: HttpRequest,
    course_id: SafeIDI64,
    approval: web::Json<CourseApprovalRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .set_approval(course_id.0, approval.into_inner(), &req)
        .await
}

// 配置路由；课时与作业挂在课程下，需先于 /{id} 注册
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/courses")
            .wrap(middlewares::RequireJWT)
            .configure(lessons::configure_lesson_routes)
            .configure(assignments::configure_assignment_routes)
            .route("", web::get().to(list_courses))
            .route("", web::post().to(create_course))
            .route("/categories", web::get().to(list_categories))
            .route("/my", web::get().to(list_my_courses))
            .service(
                web::resource("/{id}/approval")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route(web::put().to(set_approval)),
            )
            .route("/{id}", web::get().to(get_course))
            .route("/{id}", web::put().to(update_course))
            .route("/{id}", web::delete().to(delete_course)),
    );
}
