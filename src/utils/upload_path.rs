//! 上传文件路径守卫
//!
//! 所有读写上传目录的操作都必须经过这里，保证最终路径落在上传根目录内。

use std::path::{Component, Path, PathBuf};

use crate::errors::{LmsError, Result};
use crate::models::files::entities::UploadCategory;
use crate::utils::extractor::parse_positive_id;

/// 单个路径段是否安全：非空，不含分隔符，不以点开头
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= 255
        && !segment.starts_with('.')
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// 将相对路径解析到上传根目录下
///
/// 拒绝绝对路径、`..` 以及任何不安全的路径段；若文件已存在，再用
/// canonicalize 确认符号链接没有把路径带出根目录。
pub fn resolve_upload_path(root: &Path, relative: &str) -> Result<PathBuf> {
    let relative_path = Path::new(relative);
    let mut resolved = root.to_path_buf();

    for component in relative_path.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .filter(|p| is_safe_segment(p))
                    .ok_or_else(|| LmsError::validation(format!("非法的文件路径: {relative}")))?;
                resolved.push(part);
            }
            _ => {
                return Err(LmsError::validation(format!("非法的文件路径: {relative}")));
            }
        }
    }

    if resolved == root {
        return Err(LmsError::validation("文件路径为空"));
    }

    if resolved.exists() {
        let canonical_root = root.canonicalize()?;
        let canonical = resolved.canonicalize()?;
        if !canonical.starts_with(&canonical_root) {
            return Err(LmsError::validation(format!("文件路径越出上传目录: {relative}")));
        }
    }

    Ok(resolved)
}

const FILES_URL_PREFIX: &str = "/api/upload/files/";

/// 上传文件的 URL 路径
pub fn file_url(relative: &str) -> String {
    format!("{FILES_URL_PREFIX}{relative}")
}

/// 从 URL 或相对路径中取出上传目录下的相对路径
pub fn relative_from_reference(reference: &str) -> Option<&str> {
    let trimmed = reference.trim();
    let relative = match trimmed.split_once(FILES_URL_PREFIX) {
        Some((_, rest)) => rest,
        None => trimmed,
    };
    let relative = relative.split(['?', '#']).next().unwrap_or_default();
    Some(relative).filter(|s| !s.is_empty())
}

/// 引用所指上传文件的上传者 ID，不是上传文件时返回 None
pub fn upload_owner(reference: &str) -> Option<i64> {
    let relative = relative_from_reference(reference)?;
    let mut parts = relative.split('/');
    let (category, user_id, file) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some()
        || category.parse::<UploadCategory>().is_err()
        || !is_safe_segment(file)
    {
        return None;
    }
    parse_positive_id(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_segment() {
        assert!(is_safe_segment("video"));
        assert!(is_safe_segment("1700000000-abc.mp4"));
        assert!(!is_safe_segment(""));
        assert!(!is_safe_segment(".."));
        assert!(!is_safe_segment(".hidden"));
        assert!(!is_safe_segment("a/b"));
        assert!(!is_safe_segment("a\\b"));
        assert!(!is_safe_segment("空格 名"));
    }

    #[test]
    fn test_resolve_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_upload_path(dir.path(), "document/3/1-a.pdf").unwrap();
        assert_eq!(path, dir.path().join("document").join("3").join("1-a.pdf"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_upload_path(dir.path(), "../etc/passwd").is_err());
        assert!(resolve_upload_path(dir.path(), "document/../../x").is_err());
        assert!(resolve_upload_path(dir.path(), "/etc/passwd").is_err());
        assert!(resolve_upload_path(dir.path(), "document/./x.pdf").is_ok());
        assert!(resolve_upload_path(dir.path(), "").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlink_escape() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"secret").unwrap();
        std::fs::create_dir_all(root.path().join("document/1")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            root.path().join("document/1/link.txt"),
        )
        .unwrap();

        assert!(resolve_upload_path(root.path(), "document/1/link.txt").is_err());
    }

    #[test]
    fn test_relative_from_reference() {
        assert_eq!(
            relative_from_reference("/api/upload/files/video/2/a.mp4"),
            Some("video/2/a.mp4")
        );
        assert_eq!(
            relative_from_reference(
                "https://lms.example.com/api/upload/files/document/1/b.pdf?x=1"
            ),
            Some("document/1/b.pdf")
        );
        assert_eq!(relative_from_reference("video/2/a.mp4"), Some("video/2/a.mp4"));
        assert_eq!(relative_from_reference("  "), None);
    }

    #[test]
    fn test_upload_owner() {
        assert_eq!(upload_owner("attachment/2/1700000000-a.pdf"), Some(2));
        assert_eq!(upload_owner("/api/upload/files/video/5/intro.mp4"), Some(5));
        assert_eq!(
            upload_owner("https://lms.example.com/api/upload/files/document/9/b.pdf"),
            Some(9)
        );
        assert_eq!(upload_owner("https://youtube.com/watch?v=abc"), None);
        assert_eq!(upload_owner("images/2/a.png"), None);
        assert_eq!(upload_owner("attachment/x/a.pdf"), None);
        assert_eq!(upload_owner("attachment/2/sub/a.pdf"), None);
        assert_eq!(upload_owner("attachment/2/.."), None);
    }
}
