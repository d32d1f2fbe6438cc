use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::json;

use super::{configure_course_routes, configure_statistics_routes, configure_submission_routes};
use crate::models::ErrorCode;
use crate::models::assignments::requests::SubmitAssignmentRequest;
use crate::models::users::entities::UserRole;
use crate::storage::Storage;
use crate::storage::sea_orm_storage::tests::{assignment, course, memory_storage, user};
use crate::utils::jwt::JwtUtils;

fn bearer(user_id: i64) -> (header::HeaderName, String) {
    // 角色以数据库中的用户为准，token 中的角色不参与鉴权
    let token = JwtUtils::generate_access_token(user_id, "STUDENT").unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

macro_rules! lms_app {
    ($storage:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($storage.clone()))
                .configure(configure_course_routes)
                .configure(configure_submission_routes)
                .configure(configure_statistics_routes),
        )
        .await
    };
}

macro_rules! status {
    ($app:expr, $req:expr) => {
        test::call_service(&$app, $req.to_request()).await.status()
    };
}

#[actix_web::test]
async fn test_lessons_require_manager_or_active_enrollment() {
    let db = memory_storage().await;
    let teacher = user(&db, "t@example.com", UserRole::Teacher).await;
    let other_teacher = user(&db, "o@example.com", UserRole::Teacher).await;
    let student = user(&db, "s@example.com", UserRole::Student).await;
    let outsider = user(&db, "x@example.com", UserRole::Student).await;
    let admin = user(&db, "admin@example.com", UserRole::Admin).await;
    let course_id = course(&db, teacher, "Rust", true).await;
    db.enroll_student(student, course_id).await.unwrap();

    let storage: Arc<dyn Storage> = Arc::new(db);
    let app = lms_app!(storage);
    let lessons = format!("/api/courses/{course_id}/lessons");
    let list = |id: i64| {
        test::TestRequest::get()
            .uri(&lessons)
            .insert_header(bearer(id))
    };
    let create = |id: i64| {
        test::TestRequest::post()
            .uri(&lessons)
            .insert_header(bearer(id))
            .set_json(json!({ "title": "Ownership" }))
    };

    assert_eq!(status!(app, list(teacher)), StatusCode::OK);
    assert_eq!(status!(app, list(admin)), StatusCode::OK);
    assert_eq!(status!(app, list(student)), StatusCode::OK);
    assert_eq!(status!(app, list(outsider)), StatusCode::FORBIDDEN);
    assert_eq!(status!(app, list(other_teacher)), StatusCode::FORBIDDEN);

    assert_eq!(status!(app, create(student)), StatusCode::FORBIDDEN);
    assert_eq!(status!(app, create(other_teacher)), StatusCode::FORBIDDEN);
    assert_eq!(status!(app, create(teacher)), StatusCode::CREATED);
    assert_eq!(status!(app, create(admin)), StatusCode::CREATED);

    // 退课后失去访问权限
    storage.unenroll_student(student, course_id).await.unwrap();
    assert_eq!(status!(app, list(student)), StatusCode::FORBIDDEN);

    let missing = test::TestRequest::get()
        .uri("/api/courses/9999/lessons")
        .insert_header(bearer(teacher));
    assert_eq!(status!(app, missing), StatusCode::NOT_FOUND);

    let anonymous = test::TestRequest::get().uri(&lessons);
    assert_eq!(status!(app, anonymous), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_course_statistics_only_for_course_managers() {
    let db = memory_storage().await;
    let teacher = user(&db, "t@example.com", UserRole::Teacher).await;
    let other_teacher = user(&db, "o@example.com", UserRole::Teacher).await;
    let student = user(&db, "s@example.com", UserRole::Student).await;
    let admin = user(&db, "admin@example.com", UserRole::Admin).await;
    let course_id = course(&db, teacher, "Rust", true).await;
    db.enroll_student(student, course_id).await.unwrap();

    let storage: Arc<dyn Storage> = Arc::new(db);
    let app = lms_app!(storage);
    let stats = |id: i64| {
        test::TestRequest::get()
            .uri(&format!("/api/statistics/courses/{course_id}"))
            .insert_header(bearer(id))
    };

    assert_eq!(status!(app, stats(teacher)), StatusCode::OK);
    assert_eq!(status!(app, stats(admin)), StatusCode::OK);
    assert_eq!(status!(app, stats(other_teacher)), StatusCode::FORBIDDEN);
    assert_eq!(status!(app, stats(student)), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_only_course_teacher_or_admin_can_grade() {
    let db = memory_storage().await;
    let teacher = user(&db, "t@example.com", UserRole::Teacher).await;
    let other_teacher = user(&db, "o@example.com", UserRole::Teacher).await;
    let student = user(&db, "s@example.com", UserRole::Student).await;
    let admin = user(&db, "admin@example.com", UserRole::Admin).await;
    let course_id = course(&db, teacher, "Rust", true).await;
    db.enroll_student(student, course_id).await.unwrap();
    let target = db
        .create_assignment(course_id, assignment(7, 100.0))
        .await
        .unwrap();
    let submission = db
        .create_submission(
            &target,
            student,
            SubmitAssignmentRequest {
                content: Some("my essay".into()),
                attachments: None,
            },
        )
        .await
        .unwrap();

    let storage: Arc<dyn Storage> = Arc::new(db);
    let app = lms_app!(storage);
    let grade = |id: i64, score: f64| {
        test::TestRequest::put()
            .uri(&format!("/api/submissions/{}/grade", submission.id))
            .insert_header(bearer(id))
            .set_json(json!({ "score": score }))
    };

    assert_eq!(status!(app, grade(student, 100.0)), StatusCode::FORBIDDEN);
    assert_eq!(
        status!(app, grade(other_teacher, 80.0)),
        StatusCode::FORBIDDEN
    );
    assert_eq!(status!(app, grade(teacher, 120.0)), StatusCode::BAD_REQUEST);
    assert_eq!(status!(app, grade(teacher, 85.0)), StatusCode::OK);
    assert_eq!(status!(app, grade(admin, 90.0)), StatusCode::OK);

    let graded = storage
        .get_submission_by_id(submission.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(graded.score, Some(90.0));
    assert_eq!(graded.graded_by_teacher_id, Some(admin));
}

#[actix_web::test]
async fn test_invisible_course_is_not_found_for_outsiders() {
    let db = memory_storage().await;
    let teacher = user(&db, "t@example.com", UserRole::Teacher).await;
    let other_teacher = user(&db, "o@example.com", UserRole::Teacher).await;
    let student = user(&db, "s@example.com", UserRole::Student).await;
    let admin = user(&db, "admin@example.com", UserRole::Admin).await;
    let draft = course(&db, teacher, "Draft", false).await;
    let public = course(&db, teacher, "Public", true).await;

    let storage: Arc<dyn Storage> = Arc::new(db);
    let app = lms_app!(storage);
    let detail = |id: i64, course_id: i64| {
        test::TestRequest::get()
            .uri(&format!("/api/courses/{course_id}"))
            .insert_header(bearer(id))
    };

    assert_eq!(status!(app, detail(student, draft)), StatusCode::NOT_FOUND);
    assert_eq!(
        status!(app, detail(other_teacher, draft)),
        StatusCode::NOT_FOUND
    );
    assert_eq!(status!(app, detail(teacher, draft)), StatusCode::OK);
    assert_eq!(status!(app, detail(admin, draft)), StatusCode::OK);
    assert_eq!(status!(app, detail(student, public)), StatusCode::OK);

    // 列表同样不包含草稿课程
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/courses")
            .insert_header(bearer(student))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let body = body.to_string();
    assert!(body.contains("Public"));
    assert!(!body.contains("Draft"));
}

#[actix_web::test]
async fn test_submission_cannot_reference_foreign_upload() {
    let db = memory_storage().await;
    let teacher = user(&db, "t@example.com", UserRole::Teacher).await;
    let victim = user(&db, "v@example.com", UserRole::Student).await;
    let student = user(&db, "s@example.com", UserRole::Student).await;
    let course_id = course(&db, teacher, "Rust", true).await;
    db.enroll_student(victim, course_id).await.unwrap();
    db.enroll_student(student, course_id).await.unwrap();
    let target = db
        .create_assignment(course_id, assignment(7, 100.0))
        .await
        .unwrap();

    let storage: Arc<dyn Storage> = Arc::new(db);
    let app = lms_app!(storage);
    let submit = |attachment: String| {
        test::TestRequest::post()
            .uri(&format!(
                "/api/courses/{course_id}/assignments/{}/submissions",
                target.id
            ))
            .insert_header(bearer(student))
            .set_json(json!({ "attachments": [attachment] }))
    };

    let resp = test::call_service(
        &app,
        submit(format!("attachment/{victim}/1700000000-secret.pdf")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], ErrorCode::FileReferenceDenied as i32);
    assert!(
        storage
            .get_submission_by_assignment_and_student(target.id, student)
            .await
            .unwrap()
            .is_none()
    );

    assert_eq!(
        status!(
            app,
            submit(format!("/api/upload/files/attachment/{student}/1-mine.pdf"))
        ),
        StatusCode::CREATED
    );
}

#[actix_web::test]
async fn test_lesson_cannot_reference_foreign_upload() {
    let db = memory_storage().await;
    let teacher = user(&db, "t@example.com", UserRole::Teacher).await;
    let other_teacher = user(&db, "o@example.com", UserRole::Teacher).await;
    let course_id = course(&db, teacher, "Rust", true).await;

    let storage: Arc<dyn Storage> = Arc::new(db);
    let app = lms_app!(storage);
    let create = |video_url: String| {
        test::TestRequest::post()
            .uri(&format!("/api/courses/{course_id}/lessons"))
            .insert_header(bearer(teacher))
            .set_json(json!({ "title": "Intro", "video_url": video_url }))
    };

    assert_eq!(
        status!(
            app,
            create(format!("/api/upload/files/video/{other_teacher}/1-theirs.mp4"))
        ),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        status!(
            app,
            create(format!("/api/upload/files/video/{teacher}/1-mine.mp4"))
        ),
        StatusCode::CREATED
    );
    assert_eq!(
        status!(app, create("https://videos.example.com/intro".to_string())),
        StatusCode::CREATED
    );
}
