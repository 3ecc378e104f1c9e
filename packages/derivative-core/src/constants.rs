/// リサイズ要求キーの先頭タグ
pub const RESIZE_TAG: &str = "resize";

/// 元画像キーの固定プレフィックス
pub const ASSET_PREFIX: &str = "assets";

/// 派生画像の出所を記録するメタデータキー
pub const RESIZED_FROM_KEY: &str = "resized-from";

/// 出力画像の最大ピクセル数（極端な要求のみ防止）
pub const MAX_PIXELS: u64 = 1_000_000_000;

/// 損失圧縮フォーマットのデフォルト品質（1-100）
pub const DEFAULT_QUALITY: u8 = 80;
