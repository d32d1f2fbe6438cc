use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::RequireCourseAccess;
use crate::models::lessons::requests::{
    CreateLessonRequest, ReorderLessonsRequest, UpdateLessonRequest,
};
use crate::services::LessonService;
use crate::utils::SafeIDI64;

// 懒加载的全局 LessonService 实例
static LESSON_SERVICE: Lazy<LessonService> = Lazy::new(LessonService::new_lazy);

pub async fn list_lessons(req: HttpRequest) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.list_lessons(&req).await
}

pub async fn get_lesson(req: HttpRequest, lesson_id: SafeIDI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.get_lesson(lesson_id.0, &req).await
}

pub async fn create_lesson(
    req: HttpRequest,
    body: web::Json<CreateLessonRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.create_lesson(body.into_inner(), &req).await
}

pub async fn update_lesson(
    req: HttpRequest,
    lesson_id: SafeIDI64,
    body: web::Json<UpdateLessonRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .update_lesson(lesson_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_lesson(req: HttpRequest, lesson_id: SafeIDI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.delete_lesson(lesson_id.0, &req).await
}

pub async fn reorder_lessons(
    req: HttpRequest,
    body: web::Json<ReorderLessonsRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.reorder_lessons(body.into_inner(), &req).await
}

// 挂在 /api/courses 之下，JWT 由外层 scope 校验
pub fn configure_lesson_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/{course_id}/lessons")
            .wrap(RequireCourseAccess::member())
            .route("", web::get().to(list_lessons))
            .route("", web::post().to(create_lesson))
            .route("/reorder", web::put().to(reorder_lessons))
            .route("/{id}", web::get().to(get_lesson))
            .route("/{id}", web::put().to(update_lesson))
            .route("/{id}", web::delete().to(delete_lesson)),
    );
}
