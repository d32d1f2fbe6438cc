use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireCourseAccess};
use crate::models::statistics::requests::MonthlyRevenueQuery;
use crate::models::users::entities::UserRole;
use crate::services::StatisticsService;

// 懒加载的全局 StatisticsService 实例
static STATISTICS_SERVICE: Lazy<StatisticsService> = Lazy::new(StatisticsService::new_lazy);

pub async fn admin_overview(req: HttpRequest) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE.admin_overview(&req).await
}

pub async fn monthly_revenue(
    req: HttpRequest,
    query: web::Query<MonthlyRevenueQuery>,
) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE
        .monthly_revenue(query.into_inner(), &req)
        .await
}

pub async fn revenue_by_teacher(req: HttpRequest) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE.revenue_by_teacher(&req).await
}

pub async fn revenue_by_category(req: HttpRequest) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE.revenue_by_category(&req).await
}

pub async fn teacher_overview(req: HttpRequest) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE.teacher_overview(&req).await
}

pub async fn student_overview(req: HttpRequest) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE.student_overview(&req).await
}

pub async fn course_statistics(req: HttpRequest) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE.course_statistics(&req).await
}

// 配置路由
pub fn configure_statistics_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/statistics")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("/admin")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/overview", web::get().to(admin_overview))
                    .route("/revenue/monthly", web::get().to(monthly_revenue))
                    .route("/revenue/teachers", web::get().to(revenue_by_teacher))
                    .route("/revenue/categories", web::get().to(revenue_by_category)),
            )
            .service(
                web::resource("/teacher/overview")
                    .wrap(middlewares::RequireRole::new(&UserRole::Teacher))
                    .route(web::get().to(teacher_overview)),
            )
            .service(
                web::resource("/student/overview")
                    .wrap(middlewares::RequireRole::new(&UserRole::Student))
                    .route(web::get().to(student_overview)),
            )
            .service(
                web::resource("/courses/{course_id}")
                    .wrap(RequireCourseAccess::manage())
                    .route(web::get().to(course_statistics)),
            ),
    );
}
