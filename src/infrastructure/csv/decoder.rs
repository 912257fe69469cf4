use crate::domain::error::{AppError, Result};
use encoding_rs::GBK;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Decode uploaded CSV bytes. Feedback exports in the wild come as UTF-8
/// (with or without BOM) or GBK (which covers GB2312); anything else is
/// rejected rather than silently mangled.
pub fn decode_csv_bytes(bytes: &[u8]) -> Result<String> {
    let stripped = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(stripped) {
        return Ok(text.to_string());
    }

    let (text, _, had_errors) = GBK.decode(bytes);
    if !had_errors {
        return Ok(text.into_owned());
    }

    Err(AppError::EncodingError(
        "file is neither valid UTF-8 nor GBK".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8() {
        assert_eq!(decode_csv_bytes("反馈内容,用户类型".as_bytes()).unwrap(), "反馈内容,用户类型");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("content".as_bytes());
        assert_eq!(decode_csv_bytes(&bytes).unwrap(), "content");
    }

    #[test]
    fn test_gbk_round_trip() {
        let (encoded, _, _) = GBK.encode("网络连接超时");
        assert_eq!(decode_csv_bytes(&encoded).unwrap(), "网络连接超时");
    }

    #[test]
    fn test_undecodable_bytes_rejected() {
        // 0x81 0x40 starts a GBK pair but 0xFF 0xFF is invalid in both.
        let err = decode_csv_bytes(&[0xFF, 0xFF, 0x81]).unwrap_err();
        assert!(matches!(err, AppError::EncodingError(_)));
    }
}
