use std::time::Duration;

use derivative_core::{GrammarMode, DEFAULT_QUALITY};
use url::Url;

/// 成功レスポンスの構築方法（デプロイメントごとに固定）
#[derive(Debug, Clone)]
pub enum ResponseMode {
    /// 派生画像への直接 URL を組み立てて 301 リダイレクトを返す
    Redirect { base_url: String },
    /// 署名付き URL を発行し、そのパスとクエリをリダイレクトベースに
    /// 付け替えた URL を 201 で返す
    SignedUrl {
        redirect_base: Url,
        expires_in: Duration,
    },
}

/// プロセス全体の設定
///
/// 起動時に一度だけ環境変数から構築し、以後は読み取り専用。
/// パイプラインの途中で環境を参照することはない。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bucket: String,
    /// 空なら無制限。設定順を保持する（拒否メッセージの列挙順になる）。
    pub allowed_dimensions: Vec<String>,
    pub grammar: GrammarMode,
    pub response: ResponseMode,
    pub quality: u8,
    pub port: u16,
}

impl AppConfig {
    /// 環境変数から AppConfig を作成する
    ///
    /// 必須の環境変数:
    /// - BUCKET
    /// - BASE_URL または REDIRECT_BASE_URL（どちらか一方）
    pub fn from_env() -> Result<Self, String> {
        let bucket = std::env::var("BUCKET").map_err(|_| "BUCKET is not set".to_string())?;

        let allowed_dimensions = std::env::var("ALLOWED_DIMENSIONS")
            .map(|raw| parse_allowed_dimensions(&raw))
            .unwrap_or_default();

        let grammar = match std::env::var("GRAMMAR_MODE").as_deref() {
            Err(_) | Ok("content-type") => GrammarMode::ContentType,
            Ok("extension") => GrammarMode::Extension,
            Ok(other) => {
                return Err(format!(
                    "GRAMMAR_MODE must be \"content-type\" or \"extension\", got {other:?}"
                ));
            }
        };

        let response = match (
            std::env::var("BASE_URL"),
            std::env::var("REDIRECT_BASE_URL"),
        ) {
            (Ok(_), Ok(_)) => {
                return Err("BASE_URL and REDIRECT_BASE_URL are mutually exclusive".to_string());
            }
            (Ok(base_url), Err(_)) => ResponseMode::Redirect {
                base_url: base_url.trim_end_matches('/').to_string(),
            },
            (Err(_), Ok(redirect)) => {
                let redirect_base = Url::parse(&redirect)
                    .map_err(|e| format!("REDIRECT_BASE_URL is not a valid URL: {e}"))?;
                let expires_in = match std::env::var("PRESIGNED_EXPIRATION_SECONDS") {
                    Ok(raw) => Duration::from_secs(
                        raw.parse()
                            .map_err(|_| "PRESIGNED_EXPIRATION_SECONDS must be an integer")?,
                    ),
                    Err(_) => Duration::from_secs(300),
                };
                ResponseMode::SignedUrl {
                    redirect_base,
                    expires_in,
                }
            }
            (Err(_), Err(_)) => {
                return Err("either BASE_URL or REDIRECT_BASE_URL must be set".to_string());
            }
        };

        let quality = match std::env::var("QUALITY") {
            Ok(raw) => {
                let q: u8 = raw.parse().map_err(|_| "QUALITY must be 1-100")?;
                if q == 0 || q > 100 {
                    return Err("QUALITY must be 1-100".to_string());
                }
                q
            }
            Err(_) => DEFAULT_QUALITY,
        };

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| "PORT must be a port number")?,
            Err(_) => 8080,
        };

        Ok(Self {
            bucket,
            allowed_dimensions,
            grammar,
            response,
            quality,
            port,
        })
    }
}

/// カンマ区切りの `WxH` リストを解析する
///
/// 空白は寛容に扱い、空要素は捨て、重複は最初の出現位置を残す。
fn parse_allowed_dimensions(raw: &str) -> Vec<String> {
    let mut dimensions = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if !dimensions.iter().any(|d| d == token) {
            dimensions.push(token.to_string());
        }
    }
    dimensions
}
