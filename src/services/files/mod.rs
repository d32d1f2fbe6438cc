pub mod delete;
pub mod download;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{ApiResponse, ErrorCode, users::entities::User};
use crate::storage::Storage;
use crate::utils::SafeFilePath;
use crate::utils::upload_path::{relative_from_reference, upload_owner};

pub struct FileService {
    storage: Option<Arc<dyn Storage>>,
}

impl FileService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 上传文件
    pub async fn handle_upload(
        &self,
        request: &HttpRequest,
        category: String,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::handle_upload(request, category, payload).await
    }

    // 下载文件
    pub async fn handle_download(
        &self,
        request: &HttpRequest,
        file: SafeFilePath,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, request, file).await
    }

    // 删除文件
    pub async fn handle_delete(
        &self,
        request: &HttpRequest,
        file: SafeFilePath,
    ) -> ActixResult<HttpResponse> {
        delete::handle_delete(request, file).await
    }
}

/// 校验写入课时、作业或提交的文件引用
///
/// 只能引用自己上传的文件。管理员不受限；课程管理者还可以引用已经出现在
/// 本课程课时、作业或本课程学生自己提交中的文件。外部链接不做限制。
pub(crate) async fn check_file_references<'a>(
    storage: &dyn Storage,
    writer: &User,
    course_id: i64,
    can_manage: bool,
    references: impl IntoIterator<Item = &'a str>,
) -> Result<(), HttpResponse> {
    if writer.is_admin() {
        return Ok(());
    }

    for reference in references {
        let Some(owner) = upload_owner(reference) else {
            continue;
        };
        if owner == writer.id {
            continue;
        }

        if can_manage && let Some(relative) = relative_from_reference(reference) {
            match storage.find_file_references(relative).await {
                Ok(refs)
                    if refs.course_ids.contains(&course_id)
                        || refs
                            .submissions
                            .iter()
                            .any(|(student_id, c)| *c == course_id && *student_id == owner) =>
                {
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(super::internal_error("Failed to check file references", e));
                }
            }
        }

        tracing::info!(
            "User {} tried to reference upload of user {}: {}",
            writer.id,
            owner,
            reference
        );
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::FileReferenceDenied,
            "Attachments must reference your own uploads",
        )));
    }

    Ok(())
}

/// 按扩展名推断的 Content-Type
pub(crate) fn content_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "zip" => "application/zip",
        "rar" => "application/vnd.rar",
        "7z" => "application/x-7z-compressed",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// 文件名中的小写扩展名
pub(crate) fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Lecture.MP4").as_deref(), Some("mp4"));
        assert_eq!(extension_of("notes.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(""), None);
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("PDF"), "application/pdf");
        assert_eq!(content_type_for("unknown"), "application/octet-stream");
    }

    mod references {
        use super::super::check_file_references;
        use crate::models::assignments::requests::SubmitAssignmentRequest;
        use crate::models::users::entities::{User, UserRole};
        use crate::storage::Storage;
        use crate::storage::sea_orm_storage::tests::{assignment, course, memory_storage, user};
        use actix_web::http::StatusCode;

        async fn load_user(storage: &dyn Storage, id: i64) -> User {
            storage.get_user_by_id(id).await.unwrap().unwrap()
        }

        #[tokio::test]
        async fn test_student_may_only_reference_own_uploads() {
            let storage = memory_storage().await;
            let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
            let student = user(&storage, "s@example.com", UserRole::Student).await;
            let course_id = course(&storage, teacher, "Rust", true).await;
            let student = load_user(&storage, student).await;

            let own = format!("attachment/{}/1-answer.pdf", student.id);
            let foreign = format!("/api/upload/files/attachment/{teacher}/1-key.pdf");

            assert!(
                check_file_references(&storage, &student, course_id, false, [own.as_str()])
                    .await
                    .is_ok()
            );
            assert!(
                check_file_references(
                    &storage,
                    &student,
                    course_id,
                    false,
                    ["https://example.com/reading.pdf"],
                )
                .await
                .is_ok()
            );

            let denied = check_file_references(
                &storage,
                &student,
                course_id,
                false,
                [own.as_str(), foreign.as_str()],
            )
            .await
            .unwrap_err();
            assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        }

        #[tokio::test]
        async fn test_manager_may_reattach_files_already_in_course() {
            let storage = memory_storage().await;
            let teacher = user(&storage, "t@example.com", UserRole::Teacher).await;
            let student = user(&storage, "s@example.com", UserRole::Student).await;
            let admin = user(&storage, "admin@example.com", UserRole::Admin).await;
            let course_id = course(&storage, teacher, "Rust", true).await;
            let other_course = course(&storage, teacher, "Go", true).await;
            storage.enroll_student(student, course_id).await.unwrap();

            let target = storage
                .create_assignment(course_id, assignment(7, 100.0))
                .await
                .unwrap();
            let answer = format!("attachment/{student}/1-answer.pdf");
            storage
                .create_submission(
                    &target,
                    student,
                    SubmitAssignmentRequest {
                        content: None,
                        attachments: Some(vec![answer.clone()]),
                    },
                )
                .await
                .unwrap();

            let teacher = load_user(&storage, teacher).await;
            assert!(
                check_file_references(&storage, &teacher, course_id, true, [answer.as_str()])
                    .await
                    .is_ok()
            );
            assert!(
                check_file_references(&storage, &teacher, other_course, true, [answer.as_str()])
                    .await
                    .is_err()
            );
            // 非管理者身份不能借用
            assert!(
                check_file_references(&storage, &teacher, course_id, false, [answer.as_str()])
                    .await
                    .is_err()
            );

            let unrelated = format!("document/{student}/2-private.pdf");
            assert!(
                check_file_references(&storage, &teacher, course_id, true, [unrelated.as_str()])
                    .await
                    .is_err()
            );

            let admin = load_user(&storage, admin).await;
            assert!(
                check_file_references(&storage, &admin, other_course, true, [unrelated.as_str()])
                    .await
                    .is_ok()
            );
        }
    }
}
