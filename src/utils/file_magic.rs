/// 魔术字节校验需要的最少前缀长度
pub const MAGIC_PREFIX_LEN: usize = 16;

/// 验证文件内容的魔术字节是否与扩展名匹配
///
/// # Arguments
/// * `data` - 文件内容的前几个字节（至少 [`MAGIC_PREFIX_LEN`]，文件更短时为全部内容）
/// * `extension` - 文件扩展名（不含点号，如 "png"）
///
/// # Returns
/// * `true` - 魔术字节匹配
/// * `false` - 魔术字节不匹配或扩展名未知
///
/// 空内容只对纯文本扩展名有效。
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
        // 视频格式
        "mp4" => is_iso_media(data),
        "mov" => is_iso_media(data) || is_quicktime_atom(data),
        "webm" | "mkv" => data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]),
        "avi" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"AVI ",

        // 图片格式
        "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        "gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        "webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",

        // 文档格式
        "pdf" => data.starts_with(b"%PDF"),
        "doc" | "xls" | "ppt" => {
            // OLE Compound Document
            data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        }
        "docx" | "xlsx" | "pptx" => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),

        // 压缩格式
        "zip" => {
            data.starts_with(&[0x50, 0x4B, 0x03, 0x04])
                || data.starts_with(&[0x50, 0x4B, 0x05, 0x06])
        }
        "rar" => data.starts_with(b"Rar!\x1A\x07"),
        "7z" => data.starts_with(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),

        // 纯文本不能包含 NUL
        "txt" | "md" => !data.contains(&0),

        _ => false,
    }
}

// ISO base media (mp4/mov)：第 4..8 字节为 ftyp
fn is_iso_media(data: &[u8]) -> bool {
    data.len() >= 8 && &data[4..8] == b"ftyp"
}

// 早期 QuickTime 文件直接以 moov/mdat/wide/free 原子开头
fn is_quicktime_atom(data: &[u8]) -> bool {
    data.len() >= 8 && matches!(&data[4..8], b"moov" | b"mdat" | b"wide" | b"free")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_magic() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(validate_magic_bytes(&png_header, "png"));
        assert!(validate_magic_bytes(&png_header, "PNG"));
        assert!(validate_magic_bytes(&png_header, ".png"));
        assert!(!validate_magic_bytes(&png_header, "jpg"));
    }

    #[test]
    fn test_jpeg_magic() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0];
        assert!(validate_magic_bytes(&jpeg_header, "jpg"));
        assert!(validate_magic_bytes(&jpeg_header, "jpeg"));
        assert!(!validate_magic_bytes(&jpeg_header, "png"));
    }

    #[test]
    fn test_pdf_magic() {
        let pdf_header = b"%PDF-1.4";
        assert!(validate_magic_bytes(pdf_header, "pdf"));
        assert!(!validate_magic_bytes(pdf_header, "doc"));
    }

    #[test]
    fn test_video_magic() {
        let mp4 = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00";
        assert!(validate_magic_bytes(mp4, "mp4"));
        assert!(validate_magic_bytes(mp4, "mov"));
        assert!(!validate_magic_bytes(mp4, "webm"));

        let mkv = [0x1A, 0x45, 0xDF, 0xA3, 0x01, 0x00];
        assert!(validate_magic_bytes(&mkv, "webm"));
        assert!(validate_magic_bytes(&mkv, "mkv"));

        let avi = b"RIFF\x10\x00\x00\x00AVI LIST";
        assert!(validate_magic_bytes(avi, "avi"));
        assert!(!validate_magic_bytes(avi, "webp"));
    }

    #[test]
    fn test_text_files() {
        let text_content = b"Hello, World!";
        assert!(validate_magic_bytes(text_content, "txt"));
        assert!(validate_magic_bytes(text_content, "md"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00\x03", "txt"));
    }

    #[test]
    fn test_empty_data_only_valid_for_text() {
        assert!(!validate_magic_bytes(&[], "png"));
        assert!(!validate_magic_bytes(&[], "pdf"));
        assert!(!validate_magic_bytes(&[], "mp4"));
        assert!(validate_magic_bytes(&[], "txt"));
        assert!(validate_magic_bytes(&[], "md"));
    }

    #[test]
    fn test_unknown_extension() {
        let data = [0x00, 0x01, 0x02, 0x03];
        assert!(!validate_magic_bytes(&data, "exe"));
        assert!(!validate_magic_bytes(&data, "unknown"));
    }
}
