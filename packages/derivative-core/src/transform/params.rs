/// 派生画像のエンコード先フォーマット
///
/// 対応フォーマットの追加・削除はこの enum の変更のみで完結し、
/// 対応表の更新漏れはコンパイルエラーになる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Tiff,
}

impl ImageFormat {
    /// Content-Type スニッフィングモードで受け付ける MIME サブタイプ
    pub const MIME_TOKENS: [&'static str; 4] = ["jpeg", "png", "webp", "tiff"];

    /// 拡張子モードで受け付ける拡張子
    pub const EXTENSIONS: [&'static str; 4] = ["jpg", "jpeg", "png", "webp"];

    /// `image/<token>` のサブタイプから ImageFormat を作成
    pub fn from_mime_token(token: &str) -> Option<Self> {
        match token {
            "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// ファイル拡張子から ImageFormat を作成（拡張子モード専用の固定対応）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Content-Type を取得
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Tiff => "image/tiff",
        }
    }
}
