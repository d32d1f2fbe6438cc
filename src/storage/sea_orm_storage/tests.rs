use super::SeaOrmStorage;
use crate::errors::LmsError;
use crate::models::{
    assignments::requests::{CreateAssignmentRequest, SubmitAssignmentRequest},
    courses::{
        entities::{CourseStatus, CourseVisibility},
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
    },
    lessons::requests::CreateLessonRequest,
    submissions::requests::UpdateSubmissionRequest,
    users::{entities::UserRole, requests::CreateUserRequest},
};
use crate::storage::Storage;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};

pub(crate) async fn memory_storage() -> SeaOrmStorage {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    SeaOrmStorage::from_connection(db)
}

pub(crate) async fn user(storage: &SeaOrmStorage, email: &str, role: UserRole) -> i64 {
    storage
        .create_user(CreateUserRequest {
            email: email.to_string(),
            password: "hash".to_string(),
            name: email.to_string(),
            role,
        })
        .await
        .unwrap()
        .id
}

pub(crate) async fn course(
    storage: &SeaOrmStorage,
    teacher_id: i64,
    title: &str,
    publish: bool,
) -> i64 {
    let created = storage
        .create_course(
            teacher_id,
            CreateCourseRequest {
                title: title.to_string(),
                description: None,
                category: "programming".to_string(),
                duration: Some(10),
                price: Some(9.5),
                thumbnail_url: None,
                teacher_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.status, CourseStatus::Draft);
    assert!(!created.is_approved);

    if publish {
        storage
            .update_course(
                created.id,
                UpdateCourseRequest {
                    status: Some(CourseStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        storage.set_course_approval(created.id, true).await.unwrap();
    }
    created.id
}

pub(crate) fn lesson(title: &str, video_url: Option<&str>) -> CreateLessonRequest {
    CreateLessonRequest {
        title: title.to_string(),
        content: None,
        video_url: video_url.map(str::to_string),
        attachments: None,
        order_index: None,
        duration_minutes: None,
    }
}

pub(crate) fn assignment(due_in_days: i64, max_score: f64) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        title: "Homework".to_string(),
        description: None,
        due_date: Some(chrono::Utc::now() + chrono::Duration::days(due_in_days)),
        max_score,
        attachments: None,
    }
}

#[tokio::test]
async fn test_reenroll_reactivates_row_and_keeps_progress() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
    let student = user(&storage, "s@example.com", UserRole::Student).await;
    let course_id = course(&storage, teacher, "Rust", true).await;

    let first = storage.enroll_student(student, course_id).await.unwrap();
    assert!(matches!(
        storage.enroll_student(student, course_id).await,
        Err(LmsError::Conflict(_))
    ));

    storage
        .update_enrollment_progress(student, course_id, 40)
        .await
        .unwrap();
    assert!(storage.unenroll_student(student, course_id).await.unwrap());
    assert!(
        storage
            .update_enrollment_progress(student, course_id, 50)
            .await
            .unwrap()
            .is_none()
    );

    let again = storage.enroll_student(student, course_id).await.unwrap();
    assert_eq!(again.id, first.id);
    assert!(again.is_active);
    assert_eq!(again.progress, 40);

    // 收入统计按行计算，重新激活不会新增记录
    let all = storage.list_enrollments(Some(&[course_id][..])).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_progress_is_clamped_and_completion_tracked() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
    let student = user(&storage, "s@example.com", UserRole::Student).await;
    let course_id = course(&storage, teacher, "Rust", true).await;
    storage.enroll_student(student, course_id).await.unwrap();

    let done = storage
        .update_enrollment_progress(student, course_id, 150)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.progress, 100);
    assert!(done.completed_at.is_some());

    let back = storage
        .update_enrollment_progress(student, course_id, -5)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(back.progress, 0);
    assert!(back.completed_at.is_none());
}

#[tokio::test]
async fn test_duplicate_submission_and_grading_rules() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
    let student = user(&storage, "s@example.com", UserRole::Student).await;
    let course_id = course(&storage, teacher, "Rust", true).await;
    storage.enroll_student(student, course_id).await.unwrap();

    let overdue = storage
        .create_assignment(course_id, assignment(-1, 50.0))
        .await
        .unwrap();
    let submit = || SubmitAssignmentRequest {
        content: Some("answer".to_string()),
        attachments: None,
    };

    let submission = storage
        .create_submission(&overdue, student, submit())
        .await
        .unwrap();
    assert!(submission.is_late);
    assert!(matches!(
        storage.create_submission(&overdue, student, submit()).await,
        Err(LmsError::Conflict(_))
    ));

    assert!(matches!(
        storage
            .grade_submission(submission.id, 51.0, None, teacher)
            .await,
        Err(LmsError::Validation(_))
    ));
    let graded = storage
        .grade_submission(submission.id, 50.0, Some("good".to_string()), teacher)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(graded.score, Some(50.0));
    assert_eq!(graded.graded_by_teacher_id, Some(teacher));
    assert!(graded.graded_at.is_some());

    assert!(matches!(
        storage
            .update_submission(
                submission.id,
                UpdateSubmissionRequest {
                    content: Some("changed".to_string()),
                    attachments: None,
                },
            )
            .await,
        Err(LmsError::Conflict(_))
    ));
    assert_eq!(
        storage
            .count_ungraded_submissions_by_courses(&[course_id])
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_lessons_append_and_reorder() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
    let course_id = course(&storage, teacher, "Rust", false).await;

    let a = storage.create_lesson(course_id, lesson("a", None)).await.unwrap();
    let b = storage.create_lesson(course_id, lesson("b", None)).await.unwrap();
    let c = storage.create_lesson(course_id, lesson("c", None)).await.unwrap();
    assert_eq!((a.order_index, b.order_index, c.order_index), (0, 1, 2));

    let reordered = storage
        .reorder_lessons(course_id, vec![c.id, a.id, b.id])
        .await
        .unwrap();
    let ids: Vec<i64> = reordered.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![c.id, a.id, b.id]);
    assert!(reordered.iter().enumerate().all(|(i, l)| l.order_index == i as i32));

    assert!(matches!(
        storage.reorder_lessons(course_id, vec![a.id, b.id]).await,
        Err(LmsError::Validation(_))
    ));
    assert!(matches!(
        storage
            .reorder_lessons(course_id, vec![a.id, a.id, b.id])
            .await,
        Err(LmsError::Validation(_))
    ));
}

#[tokio::test]
async fn test_course_visibility() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
    let other = user(&storage, "o@example.com", UserRole::Teacher).await;
    course(&storage, teacher, "Published", true).await;
    course(&storage, teacher, "Draft", false).await;

    let query = |visibility| CourseListQuery {
        page: Some(1),
        size: Some(20),
        search: None,
        category: None,
        teacher_id: None,
        status: None,
        visibility,
    };

    let public = storage
        .list_courses_with_pagination(query(CourseVisibility::Public))
        .await
        .unwrap();
    assert_eq!(public.items.len(), 1);
    assert_eq!(public.items[0].course.title, "Published");
    assert_eq!(public.items[0].teacher_name.as_deref(), Some("t@example.com"));

    let owner = storage
        .list_courses_with_pagination(query(CourseVisibility::PublicOrOwnedBy(teacher)))
        .await
        .unwrap();
    assert_eq!(owner.items.len(), 2);

    let stranger = storage
        .list_courses_with_pagination(query(CourseVisibility::PublicOrOwnedBy(other)))
        .await
        .unwrap();
    assert_eq!(stranger.items.len(), 1);

    let all = storage
        .list_courses_with_pagination(query(CourseVisibility::All))
        .await
        .unwrap();
    assert_eq!(all.pagination.total, 2);
}

#[tokio::test]
async fn test_file_references_match_exact_paths() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
    let student = user(&storage, "s@example.com", UserRole::Student).await;
    let course_id = course(&storage, teacher, "Rust", true).await;
    storage.enroll_student(student, course_id).await.unwrap();

    let video = format!("video/{teacher}/1-intro.mp4");
    storage
        .create_lesson(
            course_id,
            lesson("intro", Some(&format!("/api/upload/files/{video}"))),
        )
        .await
        .unwrap();

    let target = storage
        .create_assignment(course_id, assignment(7, 100.0))
        .await
        .unwrap();
    let attachment = format!("attachment/{student}/2-answer.pdf");
    storage
        .create_submission(
            &target,
            student,
            SubmitAssignmentRequest {
                content: None,
                attachments: Some(vec![attachment.clone()]),
            },
        )
        .await
        .unwrap();

    let video_refs = storage.find_file_references(&video).await.unwrap();
    assert_eq!(video_refs.course_ids, vec![course_id]);
    assert!(video_refs.submissions.is_empty());

    let attachment_refs = storage.find_file_references(&attachment).await.unwrap();
    assert!(attachment_refs.course_ids.is_empty());
    assert_eq!(attachment_refs.submissions, vec![(student, course_id)]);

    // 前缀相同但不是同一个文件
    let prefix = format!("video/{teacher}/1-intro");
    assert!(storage.find_file_references(&prefix).await.unwrap().is_empty());
}
