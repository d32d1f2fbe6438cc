//! 附件列表编解码
//!
//! 数据库中以 JSON 字符串数组的形式保存在 text 列里。

/// 编码为 JSON 文本，空列表存为 NULL
pub fn encode_attachments(items: &[String]) -> Option<String> {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return None;
    }
    serde_json::to_string(&items).ok()
}

/// 解码 JSON 文本，无法解析时返回空列表
pub fn decode_attachments(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(text) if !text.trim().is_empty() => {
            serde_json::from_str::<Vec<String>>(text).unwrap_or_else(|e| {
                tracing::warn!("Malformed attachments column: {}", e);
                Vec::new()
            })
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_drops_blank_entries() {
        let items = vec![
            "document/1/a.pdf".to_string(),
            "  ".to_string(),
            " attachment/1/b.zip ".to_string(),
        ];
        assert_eq!(
            encode_attachments(&items).as_deref(),
            Some(r#"["document/1/a.pdf","attachment/1/b.zip"]"#)
        );
    }

    #[test]
    fn test_empty_list_is_null() {
        assert_eq!(encode_attachments(&[]), None);
        assert_eq!(encode_attachments(&["".to_string()]), None);
    }

    #[test]
    fn test_decode_handles_null_and_garbage() {
        assert!(decode_attachments(None).is_empty());
        assert!(decode_attachments(Some("")).is_empty());
        assert!(decode_attachments(Some("not json")).is_empty());
        assert_eq!(
            decode_attachments(Some(r#"["a","b"]"#)),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
