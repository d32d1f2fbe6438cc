//! 路径参数安全提取器
//!
//! 从路由的命名段中解析正整数 ID，非法值直接返回 400，不进入业务逻辑。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 校验并解析路径中的正整数 ID
pub fn parse_positive_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

fn bad_path_param(name: &str, raw: &str) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("Invalid path parameter '{name}': {raw}"),
    ));
    InternalError::from_response(format!("invalid path parameter {name}"), response).into()
}

/// 定义从指定路径段提取 i64 的提取器
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $segment:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                futures_util::future::ready(
                    $crate::utils::extractor::extract_i64(req, $segment).map($name),
                )
            }
        }
    };
}

#[doc(hidden)]
pub fn extract_i64(req: &HttpRequest, segment: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(segment).unwrap_or_default();
    parse_positive_id(raw).ok_or_else(|| bad_path_param(segment, raw))
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeCourseIdI64, "course_id");

/// 上传文件路径段（分类/用户/文件名）
#[derive(Debug, Clone)]
pub struct SafeFilePath {
    pub category: String,
    pub user_id: i64,
    pub file_name: String,
}

impl SafeFilePath {
    /// 相对上传根目录的路径
    pub fn relative_path(&self) -> String {
        format!("{}/{}/{}", self.category, self.user_id, self.file_name)
    }
}

impl FromRequest for SafeFilePath {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let info = req.match_info();
        let category = info.get("category").unwrap_or_default().to_string();
        let file_name = info.get("file").unwrap_or_default().to_string();

        let user_id = match extract_i64(req, "user_id") {
            Ok(id) => id,
            Err(e) => return ready(Err(e)),
        };

        if !super::upload_path::is_safe_segment(&category) {
            return ready(Err(bad_path_param("category", &category)));
        }
        if !super::upload_path::is_safe_segment(&file_name) {
            return ready(Err(bad_path_param("file", &file_name)));
        }

        ready(Ok(SafeFilePath {
            category,
            user_id,
            file_name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("42"), Some(42));
        assert_eq!(parse_positive_id(" 7 "), Some(7));
        assert_eq!(parse_positive_id("0"), None);
        assert_eq!(parse_positive_id("-3"), None);
        assert_eq!(parse_positive_id("abc"), None);
        assert_eq!(parse_positive_id(""), None);
    }

    #[actix_web::test]
    async fn test_extract_from_match_info() {
        let req = TestRequest::default()
            .param("course_id", "12")
            .param("id", "x")
            .to_http_request();

        assert_eq!(extract_i64(&req, "course_id").ok(), Some(12));
        assert!(extract_i64(&req, "id").is_err());
        assert!(extract_i64(&req, "missing").is_err());
    }
}
