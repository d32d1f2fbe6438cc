/*!
 * 课程访问控制中间件
 *
 * 必须在 RequireJWT 之后使用。从路径段 `course_id` 读取课程，按所需级别校验
 * 当前用户，并把 [`CourseAccess`] 放入请求扩展。
 *
 * - `manage()`：课程教师本人或管理员
 * - `member()`：课程教师本人、管理员或有效选课的学生
 *
 * ```rust,ignore
 * web::scope("/api/courses/{course_id}/lessons")
 *     .wrap(RequireCourseAccess::member())
 *     .wrap(RequireJWT)
 * ```
 *
 * 课程不存在时返回 404，无权限时返回 403。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{error, info};

use crate::{
    models::{
        ErrorCode,
        courses::entities::Course,
        users::entities::{User, UserRole},
    },
    storage::Storage,
    utils::extractor::parse_positive_id,
};

use super::create_error_response;

/// 当前用户对课程的访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseAccessLevel {
    /// 课程教师本人或管理员
    Manager,
    /// 有效选课的学生
    Enrolled,
}

/// 中间件放入请求扩展的课程与访问级别
#[derive(Debug, Clone)]
pub struct CourseAccess {
    pub course: Course,
    pub level: CourseAccessLevel,
}

impl CourseAccess {
    pub fn can_manage(&self) -> bool {
        self.level == CourseAccessLevel::Manager
    }

    pub fn is_enrolled_student(&self) -> bool {
        self.level == CourseAccessLevel::Enrolled
    }
}

#[derive(Clone)]
pub struct RequireCourseAccess {
    allow_enrolled: bool,
}

impl RequireCourseAccess {
    /// 仅课程教师本人或管理员
    pub fn manage() -> Self {
        Self {
            allow_enrolled: false,
        }
    }

    /// 课程教师本人、管理员或有效选课学生
    pub fn member() -> Self {
        Self {
            allow_enrolled: true,
        }
    }

    /// 从请求扩展中提取课程访问信息
    pub fn extract_course_access(req: &actix_web::HttpRequest) -> Option<CourseAccess> {
        req.extensions().get::<CourseAccess>().cloned()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireCourseAccess
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireCourseAccessMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireCourseAccessMiddleware {
            service: Rc::new(service),
            allow_enrolled: self.allow_enrolled,
        }))
    }
}

pub struct RequireCourseAccessMiddleware<S> {
    service: Rc<S>,
    allow_enrolled: bool,
}

/// 解析访问级别，无权限时返回 None
async fn resolve_access_level(
    storage: &dyn Storage,
    user: &User,
    course: &Course,
    allow_enrolled: bool,
) -> crate::errors::Result<Option<CourseAccessLevel>> {
    if course.can_be_managed_by(user) {
        return Ok(Some(CourseAccessLevel::Manager));
    }
    if !allow_enrolled || user.role != UserRole::Student {
        return Ok(None);
    }
    let enrolled = storage
        .get_enrollment(user.id, course.id)
        .await?
        .is_some_and(|e| e.is_active);
    Ok(enrolled.then_some(CourseAccessLevel::Enrolled))
}

impl<S, B> Service<ServiceRequest> for RequireCourseAccessMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let allow_enrolled = self.allow_enrolled;

        Box::pin(async move {
            // 1. 当前用户
            let Some(user) = req.extensions().get::<User>().cloned() else {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    )
                    .map_into_right_body(),
                ));
            };

            // 2. course_id
            let Some(course_id) = req.match_info().get("course_id").and_then(parse_positive_id)
            else {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::BAD_REQUEST,
                        ErrorCode::BadRequest,
                        "Missing or invalid course_id",
                    )
                    .map_into_right_body(),
                ));
            };

            let Some(storage) = req
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .map(|s| s.get_ref().clone())
            else {
                error!("Storage not found in app data");
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        "Internal server error",
                    )
                    .map_into_right_body(),
                ));
            };

            // 3. 课程
            let course = match storage.get_course_by_id(course_id).await {
                Ok(Some(course)) => course,
                Ok(None) => {
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::NOT_FOUND,
                            ErrorCode::CourseNotFound,
                            "Course not found",
                        )
                        .map_into_right_body(),
                    ));
                }
                Err(e) => {
                    error!("Failed to load course {}: {}", course_id, e);
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Internal server error",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            // 4. 访问级别
            let level =
                match resolve_access_level(storage.as_ref(), &user, &course, allow_enrolled).await {
                    Ok(level) => level,
                    Err(e) => {
                        error!("Failed to check access to course {}: {}", course_id, e);
                        return Ok(req.into_response(
                            create_error_response(
                                StatusCode::INTERNAL_SERVER_ERROR,
                                ErrorCode::InternalServerError,
                                "Internal server error",
                            )
                            .map_into_right_body(),
                        ));
                    }
                };

            match level {
                Some(level) => {
                    req.extensions_mut().insert(CourseAccess { course, level });
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                None => {
                    info!("User {} denied access to course {}", user.id, course_id);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::CoursePermissionDenied,
                            "No permission for this course",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::tests::{course, memory_storage, user};
    use actix_web::{App, HttpRequest, HttpResponse, test};

    async fn access_level(req: HttpRequest) -> HttpResponse {
        match RequireCourseAccess::extract_course_access(&req) {
            Some(access) if access.can_manage() => HttpResponse::Ok().body("manager"),
            Some(_) => HttpResponse::Ok().body("enrolled"),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    async fn load_user(storage: &dyn Storage, id: i64) -> User {
        storage.get_user_by_id(id).await.unwrap().unwrap()
    }

    #[actix_web::test]
    async fn test_course_access_levels() {
        let db = memory_storage().await;
        let teacher = user(&db, "t@example.com", UserRole::Teacher).await;
        let other_teacher = user(&db, "o@example.com", UserRole::Teacher).await;
        let student = user(&db, "s@example.com", UserRole::Student).await;
        let outsider = user(&db, "x@example.com", UserRole::Student).await;
        let admin = user(&db, "admin@example.com", UserRole::Admin).await;
        let course_id = course(&db, teacher, "Rust", true).await;
        db.enroll_student(student, course_id).await.unwrap();

        let storage: Arc<dyn Storage> = Arc::new(db);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .service(
                    web::resource("/member/{course_id}")
                        .wrap(RequireCourseAccess::member())
                        .route(web::get().to(access_level)),
                )
                .service(
                    web::resource("/manage/{course_id}")
                        .wrap(RequireCourseAccess::manage())
                        .route(web::get().to(access_level)),
                ),
        )
        .await;

        let teacher = load_user(storage.as_ref(), teacher).await;
        let other_teacher = load_user(storage.as_ref(), other_teacher).await;
        let student = load_user(storage.as_ref(), student).await;
        let outsider = load_user(storage.as_ref(), outsider).await;
        let admin = load_user(storage.as_ref(), admin).await;

        let cases = [
            ("member", &teacher, StatusCode::OK, "manager"),
            ("member", &admin, StatusCode::OK, "manager"),
            ("member", &student, StatusCode::OK, "enrolled"),
            ("member", &outsider, StatusCode::FORBIDDEN, ""),
            ("member", &other_teacher, StatusCode::FORBIDDEN, ""),
            ("manage", &teacher, StatusCode::OK, "manager"),
            ("manage", &admin, StatusCode::OK, "manager"),
            ("manage", &student, StatusCode::FORBIDDEN, ""),
            ("manage", &other_teacher, StatusCode::FORBIDDEN, ""),
        ];
        for (level, caller, status, body) in cases {
            let req = test::TestRequest::get()
                .uri(&format!("/{level}/{course_id}"))
                .to_request();
            req.extensions_mut().insert(caller.clone());
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), status, "{level} as user {}", caller.id);
            if status == StatusCode::OK {
                assert_eq!(test::read_body(resp).await, body.as_bytes());
            }
        }

        // 退课后不再是成员
        storage.unenroll_student(student.id, course_id).await.unwrap();
        let req = test::TestRequest::get()
            .uri(&format!("/member/{course_id}"))
            .to_request();
        req.extensions_mut().insert(student.clone());
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );

        let req = test::TestRequest::get().uri("/member/9999").to_request();
        req.extensions_mut().insert(teacher.clone());
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = test::TestRequest::get()
            .uri(&format!("/member/{course_id}"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
