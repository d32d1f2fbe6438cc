use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::{StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{content_type_for, extension_of};
use crate::config::{AppConfig, UploadConfig};
use crate::models::{
    ApiResponse, ErrorCode,
    files::{entities::UploadCategory, responses::FileUploadResponse},
};
use crate::services::current_user;
use crate::try_response;
use crate::utils::{file_magic::MAGIC_PREFIX_LEN, upload_path, validate_magic_bytes};

enum WriteError {
    Empty,
    ContentMismatch,
    TooLarge,
    Payload(MultipartError),
    Io(std::io::Error),
}

impl From<std::io::Error> for WriteError {
    fn from(e: std::io::Error) -> Self {
        WriteError::Io(e)
    }
}

impl From<MultipartError> for WriteError {
    fn from(e: MultipartError) -> Self {
        WriteError::Payload(e)
    }
}

fn bad_request(code: ErrorCode, msg: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg))
}

fn upload_failed(context: &str, err: impl std::fmt::Display) -> HttpResponse {
    tracing::error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::FileUploadFailed,
        "File upload failed",
    ))
}

/// 写入单个文件字段，先凑够魔术字节前缀再校验，返回写入的字节数
async fn write_field(
    field: &mut Field,
    path: &Path,
    extension: &str,
    max_size: usize,
) -> Result<usize, WriteError> {
    let mut prefix: Vec<u8> = Vec::with_capacity(MAGIC_PREFIX_LEN);
    let mut file: Option<tokio::fs::File> = None;
    let mut total = 0usize;

    while let Some(chunk) = field.next().await {
        let data = chunk?;
        total += data.len();
        if total > max_size {
            return Err(WriteError::TooLarge);
        }

        match file.as_mut() {
            Some(f) => f.write_all(&data).await?,
            None => {
                prefix.extend_from_slice(&data);
                if prefix.len() >= MAGIC_PREFIX_LEN {
                    if !validate_magic_bytes(&prefix, extension) {
                        return Err(WriteError::ContentMismatch);
                    }
                    let mut f = tokio::fs::File::create(path).await?;
                    f.write_all(&prefix).await?;
                    file = Some(f);
                }
            }
        }
    }

    // 文件比前缀短
    let mut f = match file {
        Some(f) => f,
        None => {
            if !validate_magic_bytes(&prefix, extension) {
                return Err(if prefix.is_empty() {
                    WriteError::Empty
                } else {
                    WriteError::ContentMismatch
                });
            }
            let mut f = tokio::fs::File::create(path).await?;
            f.write_all(&prefix).await?;
            f
        }
    };
    f.flush().await?;

    Ok(total)
}

pub async fn handle_upload(
    req: &HttpRequest,
    category: String,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    store_upload(req, category, payload, &AppConfig::get().upload).await
}

/// 按给定上传配置接收文件
pub(crate) async fn store_upload(
    req: &HttpRequest,
    category: String,
    mut payload: Multipart,
    upload: &UploadConfig,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(req));

    let category: UploadCategory = match category.parse() {
        Ok(c) => c,
        Err(msg) => return Ok(bad_request(ErrorCode::FileCategoryInvalid, &msg)),
    };

    let rule = upload.rule(category);
    let user_dir = PathBuf::from(&upload.dir)
        .join(category.as_str())
        .join(user.id.to_string());

    let mut uploaded: Option<FileUploadResponse> = None;

    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Malformed multipart payload: {}", e);
                return Ok(bad_request(ErrorCode::BadRequest, "Malformed multipart payload"));
            }
        };

        let disposition = field.content_disposition();
        let name = disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        if name != "file" {
            continue;
        }
        if uploaded.is_some() {
            return Ok(bad_request(
                ErrorCode::MultifileUploadNotAllowed,
                "Only one file can be uploaded at a time",
            ));
        }

        let original_name = disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let extension = match extension_of(&original_name) {
            Some(ext) if rule.allows_extension(&ext) => ext,
            _ => {
                return Ok(bad_request(ErrorCode::FileTypeNotAllowed, "File type not allowed"));
            }
        };

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| content_type_for(&extension).to_string());

        if let Err(e) = tokio::fs::create_dir_all(&user_dir).await {
            return Ok(upload_failed("Failed to create upload directory", e));
        }

        let now = chrono::Utc::now();
        let stored_name = format!("{}-{}.{}", now.timestamp(), Uuid::new_v4(), extension);
        let file_path = user_dir.join(&stored_name);

        let size = match write_field(&mut field, &file_path, &extension, rule.max_size).await {
            Ok(size) => size,
            Err(err) => {
                let _ = tokio::fs::remove_file(&file_path).await;
                return Ok(match err {
                    WriteError::Empty => {
                        bad_request(ErrorCode::FileEmpty, "Uploaded file is empty")
                    }
                    WriteError::ContentMismatch => bad_request(
                        ErrorCode::FileTypeNotAllowed,
                        "File content does not match its extension",
                    ),
                    WriteError::TooLarge => bad_request(
                        ErrorCode::FileSizeExceeded,
                        "File size exceeds the limit",
                    ),
                    WriteError::Payload(e) => {
                        tracing::warn!("Upload stream interrupted: {}", e);
                        bad_request(ErrorCode::FileUploadFailed, "Upload stream interrupted")
                    }
                    WriteError::Io(e) => upload_failed("Failed to write uploaded file", e),
                });
            }
        };

        let relative = format!("{}/{}/{}", category.as_str(), user.id, stored_name);
        tracing::info!(
            user_id = user.id,
            path = %relative,
            size,
            "File uploaded"
        );

        uploaded = Some(FileUploadResponse {
            url: upload_path::file_url(&relative),
            path: relative,
            file_name: original_name,
            size: size as i64,
            category,
            content_type,
            uploaded_at: now,
        });
    }

    match uploaded {
        Some(file) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(file, "File uploaded successfully"))),
        None => Ok(bad_request(ErrorCode::FileNotFound, "No file found in upload payload")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadRule;
    use crate::models::courses::entities::tests::user;
    use crate::models::users::entities::UserRole;
    use actix_web::{App, HttpMessage, http::StatusCode, http::header, test, web};

    const BOUNDARY: &str = "lms-test-boundary";

    fn upload_config(dir: &Path) -> UploadConfig {
        let rule = |max_size: usize, exts: &[&str]| UploadRule {
            max_size,
            allowed_extensions: exts.iter().map(|e| e.to_string()).collect(),
        };
        UploadConfig {
            dir: dir.to_string_lossy().into_owned(),
            video: rule(1024, &["mp4"]),
            document: rule(64, &["pdf", "txt"]),
            attachment: rule(1024, &["pdf", "png"]),
        }
    }

    fn multipart_body(file_name: &str, content: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(category: &str, file_name: &str, content: &[u8]) -> test::TestRequest {
        test::TestRequest::post()
            .uri(&format!("/upload/{category}"))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(file_name, content))
    }

    async fn upload_into(
        req: HttpRequest,
        category: web::Path<String>,
        payload: Multipart,
        upload: web::Data<UploadConfig>,
    ) -> ActixResult<HttpResponse> {
        store_upload(&req, category.into_inner(), payload, upload.get_ref()).await
    }

    fn stored_files(root: &Path, category: &str, user_id: i64) -> Vec<PathBuf> {
        std::fs::read_dir(root.join(category).join(user_id.to_string()))
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default()
    }

    macro_rules! upload_app {
        ($root:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(upload_config($root)))
                    .route("/upload/{category}", web::post().to(upload_into)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_upload_stores_file_under_user_dir() {
        let root = tempfile::tempdir().unwrap();
        let app = upload_app!(root.path());

        let req = upload_request("document", "Notes.PDF", b"%PDF-1.7 lecture notes").to_request();
        req.extensions_mut().insert(user(7, UserRole::Student));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let path = body["data"]["path"].as_str().unwrap();
        assert!(path.starts_with("document/7/"));
        assert!(path.ends_with(".pdf"));
        assert_eq!(body["data"]["size"], 22);

        let files = stored_files(root.path(), "document", 7);
        assert_eq!(files.len(), 1);
        assert_eq!(std::fs::read(&files[0]).unwrap(), b"%PDF-1.7 lecture notes");
    }

    #[actix_web::test]
    async fn test_upload_rejects_disallowed_extension() {
        let root = tempfile::tempdir().unwrap();
        let app = upload_app!(root.path());

        // png 只允许出现在 attachment 类别
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let req = upload_request("document", "diagram.png", &png).to_request();
        req.extensions_mut().insert(user(7, UserRole::Student));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::FileTypeNotAllowed as i32);

        let req = upload_request("attachment", "diagram.png", &png).to_request();
        req.extensions_mut().insert(user(7, UserRole::Student));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        assert!(stored_files(root.path(), "document", 7).is_empty());
    }

    #[actix_web::test]
    async fn test_upload_rejects_content_mismatch_and_removes_file() {
        let root = tempfile::tempdir().unwrap();
        let app = upload_app!(root.path());

        let req = upload_request("document", "report.pdf", b"MZ\x90\x00 this is not a pdf")
            .to_request();
        req.extensions_mut().insert(user(7, UserRole::Student));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::FileTypeNotAllowed as i32);
        assert!(stored_files(root.path(), "document", 7).is_empty());
    }

    #[actix_web::test]
    async fn test_upload_enforces_size_ceiling_per_category() {
        let root = tempfile::tempdir().unwrap();
        let app = upload_app!(root.path());

        let mut big = b"%PDF-1.7 ".to_vec();
        big.resize(200, b'x');

        let req = upload_request("document", "big.pdf", &big).to_request();
        req.extensions_mut().insert(user(7, UserRole::Student));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::FileSizeExceeded as i32);
        assert!(stored_files(root.path(), "document", 7).is_empty());

        // 同样大小在 attachment 的上限之内
        let req = upload_request("attachment", "big.pdf", &big).to_request();
        req.extensions_mut().insert(user(7, UserRole::Student));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(stored_files(root.path(), "attachment", 7).len(), 1);
    }

    #[actix_web::test]
    async fn test_upload_empty_files() {
        let root = tempfile::tempdir().unwrap();
        let app = upload_app!(root.path());

        let req = upload_request("document", "empty.txt", b"").to_request();
        req.extensions_mut().insert(user(7, UserRole::Student));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = upload_request("document", "empty.pdf", b"").to_request();
        req.extensions_mut().insert(user(7, UserRole::Student));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::FileEmpty as i32);

        assert_eq!(stored_files(root.path(), "document", 7).len(), 1);
    }

    #[actix_web::test]
    async fn test_upload_rejects_unknown_category_and_anonymous() {
        let root = tempfile::tempdir().unwrap();
        let app = upload_app!(root.path());

        let req = upload_request("images", "a.png", b"\x89PNG\r\n\x1a\n").to_request();
        req.extensions_mut().insert(user(7, UserRole::Student));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::FileCategoryInvalid as i32);

        let req = upload_request("document", "a.pdf", b"%PDF-1.7").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
