use thiserror::Error;

/// リクエストキーが文法に一致しなかった
///
/// 詳細はオペレータ向けログ専用。レスポンス本文には固定メッセージのみ返す。
#[derive(Debug, Error)]
#[error("key did not match the resize grammar: {0}")]
pub struct KeyError(pub String);

/// 要求された寸法が許可リストに含まれていなかった
#[derive(Debug, Error)]
#[error("dimensions {requested} are not in the allow list")]
pub struct DimensionsError {
    pub requested: String,
}

/// 変換対象フォーマットを決定できなかった
///
/// 非画像タイプと未対応サブタイプは呼び出し元からは区別できない。
/// 区別はログ側で行う。
#[derive(Debug, Error)]
#[error("unsupported format: {detail}")]
pub struct FormatError {
    pub detail: String,
}

/// ストレージアクセスエラー
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("storage error for {key}: {reason}")]
    Backend { key: String, reason: String },
}

/// 画像変換エラー
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("output resolution exceeds maximum ({width}x{height})")]
    ResolutionTooLarge { width: u32, height: u32 },

    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}
