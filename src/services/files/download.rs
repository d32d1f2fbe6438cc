use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header, web::Bytes};
use std::path::Path;
use tokio::io::AsyncReadExt;

use super::{FileService, content_type_for, extension_of};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{ApiResponse, ErrorCode, files::entities::UploadCategory, users::entities::User};
use crate::services::{current_user, internal_error};
use crate::storage::Storage;
use crate::try_response;
use crate::utils::{SafeFilePath, upload_path::resolve_upload_path};

const CHUNK_SIZE: usize = 64 * 1024;

fn file_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::FileNotFound,
        "File not found",
    ))
}

/// 上传者本人与管理员可直接访问；其他人需要通过引用该文件的课程或提交获得权限
async fn can_access(storage: &dyn Storage, user: &User, file: &SafeFilePath) -> Result<bool> {
    if user.is_admin() || file.user_id == user.id {
        return Ok(true);
    }

    let refs = storage.find_file_references(&file.relative_path()).await?;

    for course_id in &refs.course_ids {
        if let Some(course) = storage.get_course_by_id(*course_id).await?
            && course.can_be_managed_by(user)
        {
            return Ok(true);
        }
        if let Some(enrollment) = storage.get_enrollment(user.id, *course_id).await?
            && enrollment.is_active
        {
            return Ok(true);
        }
    }

    // 提交只为提交者本人上传的文件授权
    for (_, course_id) in refs
        .submissions
        .iter()
        .filter(|(student_id, _)| *student_id == file.user_id)
    {
        if let Some(course) = storage.get_course_by_id(*course_id).await?
            && course.can_be_managed_by(user)
        {
            return Ok(true);
        }
    }

    Ok(false)
}

pub async fn handle_download(
    service: &FileService,
    request: &HttpRequest,
    file: SafeFilePath,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    if file.category.parse::<UploadCategory>().is_err() {
        return Ok(file_not_found());
    }

    match can_access(storage.as_ref(), &user, &file).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::Forbidden,
                "No permission to access this file",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to check file access", e)),
    }

    let config = AppConfig::get();
    let path = match resolve_upload_path(Path::new(&config.upload.dir), &file.relative_path()) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Rejected file path {}: {}", file.relative_path(), e);
            return Ok(file_not_found());
        }
    };

    let handle = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(file_not_found()),
        Err(e) => return Ok(internal_error("Failed to open file", e)),
    };
    let length = match handle.metadata().await {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => return Ok(file_not_found()),
        Err(e) => return Ok(internal_error("Failed to read file metadata", e)),
    };

    let content_type = extension_of(&file.file_name)
        .map(|ext| content_type_for(&ext))
        .unwrap_or("application/octet-stream");

    let body = futures_util::stream::unfold(handle, |mut handle| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        match handle.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok::<_, std::io::Error>(Bytes::from(buf)), handle))
            }
            Err(e) => Some((Err(e), handle)),
        }
    });

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .no_chunking(length)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", file.file_name),
        ))
        .streaming(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::requests::SubmitAssignmentRequest;
    use crate::models::lessons::requests::CreateLessonRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::tests::{assignment, course, memory_storage, user};
    use crate::utils::upload_path::file_url;

    async fn load_user(storage: &dyn Storage, id: i64) -> User {
        storage.get_user_by_id(id).await.unwrap().unwrap()
    }

    fn attachment_of(user_id: i64, name: &str) -> SafeFilePath {
        SafeFilePath {
            category: "attachment".into(),
            user_id,
            file_name: name.into(),
        }
    }

    #[tokio::test]
    async fn test_foreign_file_in_own_submission_grants_nothing() {
        let storage = memory_storage().await;
        let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
        let victim = user(&storage, "v@example.com", UserRole::Student).await;
        let attacker = user(&storage, "a@example.com", UserRole::Student).await;
        let course_id = course(&storage, teacher, "Rust", true).await;
        storage.enroll_student(victim, course_id).await.unwrap();
        storage.enroll_student(attacker, course_id).await.unwrap();

        let target = storage
            .create_assignment(course_id, assignment(7, 100.0))
            .await
            .unwrap();
        let secret = attachment_of(victim, "1700000000-secret.pdf");
        storage
            .create_submission(
                &target,
                attacker,
                SubmitAssignmentRequest {
                    content: None,
                    attachments: Some(vec![secret.relative_path()]),
                },
            )
            .await
            .unwrap();

        let attacker_user = load_user(&storage, attacker).await;
        assert!(!can_access(&storage, &attacker_user, &secret).await.unwrap());
        // 课程教师也不能借此读取
        let teacher_user = load_user(&storage, teacher).await;
        assert!(!can_access(&storage, &teacher_user, &secret).await.unwrap());
    }

    #[tokio::test]
    async fn test_submission_file_visible_to_owner_and_course_teacher() {
        let storage = memory_storage().await;
        let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
        let other_teacher = user(&storage, "o@example.com", UserRole::Teacher).await;
        let student = user(&storage, "s@example.com", UserRole::Student).await;
        let classmate = user(&storage, "c@example.com", UserRole::Student).await;
        let admin = user(&storage, "admin@example.com", UserRole::Admin).await;
        let course_id = course(&storage, teacher, "Rust", true).await;
        storage.enroll_student(student, course_id).await.unwrap();
        storage.enroll_student(classmate, course_id).await.unwrap();

        let target = storage
            .create_assignment(course_id, assignment(7, 100.0))
            .await
            .unwrap();
        let answer = attachment_of(student, "1700000000-answer.pdf");
        storage
            .create_submission(
                &target,
                student,
                SubmitAssignmentRequest {
                    content: None,
                    attachments: Some(vec![answer.relative_path()]),
                },
            )
            .await
            .unwrap();

        for (id, expected) in [
            (student, true),
            (teacher, true),
            (admin, true),
            (other_teacher, false),
            (classmate, false),
        ] {
            let caller = load_user(&storage, id).await;
            assert_eq!(
                can_access(&storage, &caller, &answer).await.unwrap(),
                expected,
                "user {id}"
            );
        }
    }

    #[tokio::test]
    async fn test_lesson_file_requires_active_enrollment() {
        let storage = memory_storage().await;
        let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
        let student = user(&storage, "s@example.com", UserRole::Student).await;
        let outsider = user(&storage, "x@example.com", UserRole::Student).await;
        let course_id = course(&storage, teacher, "Rust", true).await;
        storage.enroll_student(student, course_id).await.unwrap();

        let video = SafeFilePath {
            category: "video".into(),
            user_id: teacher,
            file_name: "1700000000-intro.mp4".into(),
        };
        storage
            .create_lesson(
                course_id,
                CreateLessonRequest {
                    title: "intro".into(),
                    content: None,
                    video_url: Some(file_url(&video.relative_path())),
                    attachments: None,
                    order_index: None,
                    duration_minutes: None,
                },
            )
            .await
            .unwrap();

        let enrolled = load_user(&storage, student).await;
        let outsider = load_user(&storage, outsider).await;
        assert!(can_access(&storage, &enrolled, &video).await.unwrap());
        assert!(!can_access(&storage, &outsider, &video).await.unwrap());

        storage.unenroll_student(student, course_id).await.unwrap();
        assert!(!can_access(&storage, &enrolled, &video).await.unwrap());
    }
}
