use crate::errors::FormatError;
use crate::transform::ImageFormat;

/// 元画像の Content-Type から出力フォーマットを決定する
///
/// 小文字化した上で `image/<サブタイプ>[;<パラメータ>]` の形に一致させる。
/// 非画像タイプと未対応サブタイプは同じエラーにまとめる（呼び出し元に
/// とってはどちらも「変換できない」）。区別はエラー詳細としてログに残る。
pub fn resolve_content_type(content_type: &str) -> Result<ImageFormat, FormatError> {
    let lower = content_type.to_ascii_lowercase();

    let essence = match lower.split_once(';') {
        Some((essence, _params)) => essence,
        None => lower.as_str(),
    };

    let token = essence.strip_prefix("image/").ok_or_else(|| FormatError {
        detail: format!("not an image content type: {content_type:?}"),
    })?;

    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(FormatError {
            detail: format!("malformed image content type: {content_type:?}"),
        });
    }

    ImageFormat::from_mime_token(token).ok_or_else(|| FormatError {
        detail: format!("unsupported image subtype: {token:?}"),
    })
}

/// ファイル拡張子から出力フォーマットを決定する（Extension モード）
pub fn resolve_extension(extension: &str) -> Result<ImageFormat, FormatError> {
    let lower = extension.to_ascii_lowercase();
    ImageFormat::from_extension(&lower).ok_or_else(|| FormatError {
        detail: format!("unsupported file extension: {extension:?}"),
    })
}
