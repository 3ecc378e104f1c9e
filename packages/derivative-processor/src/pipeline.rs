use tracing::{info, warn};
use url::Url;

use derivative_core::{
    check_dimensions, parse_key, resolve_content_type, resolve_extension, AssetRecord,
    ImageFormat, ObjectStore, StorageError, TransformError, RESIZED_FROM_KEY,
};

use crate::config::{AppConfig, ResponseMode};
use crate::transform::make_derivative;

/// パイプラインの終端状態（成功を除く）
///
/// 先頭の四つは呼び出し元起因で、構造化された 4xx レスポンスに変換される。
/// Transform / Store は運用上の障害で、構造化せずに 500 として返しログに残す。
#[derive(Debug)]
pub enum PipelineError {
    InvalidPath,
    InvalidDimensions,
    UnsupportedFormat,
    NotFound { key: String },
    Transform(TransformError),
    Store(StorageError),
}

/// 成功時に返す派生画像への参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivativeRef {
    /// `<baseURL>/<requestKey>` への直接リダイレクト
    Direct { location: String },
    /// リダイレクトベースに付け替えた署名付き URL
    Created { location: String },
}

/// フェッチ → 変換 → 格納の本体
///
/// 各段階はこの順で一度だけ実行され、失敗した段階がそのまま終端状態になる。
/// リトライや状態の巻き戻しは行わない。
pub async fn produce_derivative<S: ObjectStore>(
    store: &S,
    config: &AppConfig,
    request_key: &str,
) -> Result<DerivativeRef, PipelineError> {
    // 1. 文法解析
    let parsed = parse_key(request_key, config.grammar).map_err(|e| {
        warn!(key = %request_key, error = %e, "rejected request key");
        PipelineError::InvalidPath
    })?;

    // 2. 寸法の許可リスト照合
    check_dimensions(parsed.width, parsed.height, &config.allowed_dimensions).map_err(|e| {
        warn!(requested = %e.requested, "dimensions not in allow list");
        PipelineError::InvalidDimensions
    })?;

    // 3. 元画像のフェッチ
    let original_key = parsed.original_asset_key();
    info!(key = %original_key, "fetching original asset");
    let original = store.get(&original_key).await.map_err(|e| match e {
        StorageError::NotFound { key } => PipelineError::NotFound { key },
        other => PipelineError::Store(other),
    })?;

    // 4. 出力フォーマットの決定
    let (format, derivative_content_type) = resolve_output(&parsed.extension, &original)
        .map_err(|detail| {
            warn!(key = %original_key, detail = %detail, "cannot determine output format");
            PipelineError::UnsupportedFormat
        })?;

    // 5. 変換（CPU 処理はブロッキングタスクで実行）
    info!(
        key = %request_key,
        w = parsed.width,
        h = parsed.height,
        format = ?format,
        "transforming image"
    );
    let body = original.body.clone();
    let (width, height, quality) = (parsed.width, parsed.height, config.quality);
    let derivative_body = tokio::task::spawn_blocking(move || {
        make_derivative(&body, width, height, format, quality)
    })
    .await
    .map_err(|e| {
        PipelineError::Transform(TransformError::ProcessingFailed(format!(
            "transform task failed: {e}"
        )))
    })?
    .map_err(PipelineError::Transform)?;

    // 6. メタデータに出所を追記（既存の値は上書き。冪等な由来記録）
    let mut metadata = original.metadata.clone();
    metadata.insert(RESIZED_FROM_KEY.to_string(), original_key.clone());

    // 7. 要求キーの位置に派生画像を格納
    info!(key = %request_key, bytes = derivative_body.len(), "storing derivative");
    store
        .put(
            request_key,
            AssetRecord {
                content_type: derivative_content_type,
                body: derivative_body,
                metadata,
            },
        )
        .await
        .map_err(PipelineError::Store)?;

    // 8. 参照の構築
    build_reference(store, config, request_key).await
}

/// 出力フォーマットと派生画像の Content-Type を決定する
///
/// Extension モードでは拡張子の固定対応表から両方を決める。
/// ContentType モードでは元画像の Content-Type をスニッフィングし、
/// 派生画像は元画像の Content-Type（パラメータ込み）を引き継ぐ。
fn resolve_output(
    extension: &Option<String>,
    original: &AssetRecord,
) -> Result<(ImageFormat, String), String> {
    match extension {
        Some(ext) => {
            let format = resolve_extension(ext).map_err(|e| e.detail)?;
            Ok((format, format.content_type().to_string()))
        }
        None => {
            let format = resolve_content_type(&original.content_type).map_err(|e| e.detail)?;
            Ok((format, original.content_type.clone()))
        }
    }
}

async fn build_reference<S: ObjectStore>(
    store: &S,
    config: &AppConfig,
    request_key: &str,
) -> Result<DerivativeRef, PipelineError> {
    match &config.response {
        ResponseMode::Redirect { base_url } => Ok(DerivativeRef::Direct {
            location: format!("{base_url}/{request_key}"),
        }),
        ResponseMode::SignedUrl {
            redirect_base,
            expires_in,
        } => {
            let signed = store
                .signed_url(request_key, *expires_in)
                .await
                .map_err(PipelineError::Store)?;
            let location = rewrite_signed_url(&signed, redirect_base).map_err(|reason| {
                PipelineError::Store(StorageError::Backend {
                    key: request_key.to_string(),
                    reason,
                })
            })?;
            Ok(DerivativeRef::Created { location })
        }
    }
}

/// 署名付き URL のパスとクエリをリダイレクトベースに付け替える
fn rewrite_signed_url(signed: &str, redirect_base: &Url) -> Result<String, String> {
    let signed = Url::parse(signed).map_err(|e| format!("unparseable signed URL: {e}"))?;

    let mut rewritten = redirect_base.clone();
    rewritten.set_path(signed.path());
    rewritten.set_query(signed.query());

    Ok(rewritten.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use bytes::Bytes;
    use derivative_core::{decode_image, encode_image, GrammarMode, MemoryObjectStore};
    use image::DynamicImage;

    fn signed_config() -> AppConfig {
        AppConfig {
            bucket: "example-bucket".to_string(),
            allowed_dimensions: Vec::new(),
            grammar: GrammarMode::ContentType,
            response: ResponseMode::SignedUrl {
                redirect_base: Url::parse("https://configurable.url.com").unwrap(),
                expires_in: Duration::from_secs(30),
            },
            quality: 80,
            port: 8080,
        }
    }

    fn direct_config() -> AppConfig {
        AppConfig {
            response: ResponseMode::Redirect {
                base_url: "https://cdn.example.com".to_string(),
            },
            ..signed_config()
        }
    }

    async fn store_with_original(key: &str, content_type: &str) -> MemoryObjectStore {
        let img = DynamicImage::new_rgb8(100, 100);
        let body = Bytes::from(encode_image(&img, ImageFormat::Jpeg, 80).unwrap());

        let store = MemoryObjectStore::new();
        store
            .insert(
                key,
                AssetRecord {
                    content_type: content_type.to_string(),
                    body,
                    metadata: HashMap::from([("example".to_string(), "value".to_string())]),
                },
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_end_to_end_signed_variant() {
        let store = store_with_original("assets/something/img123", "image/jpeg; name=something").await;
        let config = signed_config();

        let result = produce_derivative(&store, &config, "resize/something/50x60-img123")
            .await
            .unwrap();

        // 署名付き URL のパスとクエリがリダイレクトベースに付け替えられる
        let DerivativeRef::Created { location } = result else {
            panic!("expected Created reference");
        };
        assert!(location.starts_with("https://configurable.url.com/resize/something/50x60-img123?"));
        assert!(location.contains("X-Amz-Expires=30"));

        // 派生画像は要求キーの位置に格納される
        let derivative = store.peek("resize/something/50x60-img123").await.unwrap();
        assert_eq!(derivative.content_type, "image/jpeg; name=something");
        assert_eq!(derivative.metadata.get("example").unwrap(), "value");
        assert_eq!(
            derivative.metadata.get("resized-from").unwrap(),
            "assets/something/img123"
        );

        let decoded = decode_image(&derivative.body).unwrap();
        assert_eq!(decoded.width(), 50);
        assert_eq!(decoded.height(), 60);
    }

    #[tokio::test]
    async fn test_direct_variant_builds_location_from_base_url() {
        let store = store_with_original("assets/a/img", "image/png").await;

        let result = produce_derivative(&store, &direct_config(), "resize/a/40x40-img")
            .await
            .unwrap();

        assert_eq!(
            result,
            DerivativeRef::Direct {
                location: "https://cdn.example.com/resize/a/40x40-img".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_idempotent_derivative_bytes_and_metadata() {
        let store = store_with_original("assets/a/img", "image/jpeg").await;
        let config = signed_config();

        produce_derivative(&store, &config, "resize/a/50x60-img").await.unwrap();
        let first = store.peek("resize/a/50x60-img").await.unwrap();

        produce_derivative(&store, &config, "resize/a/50x60-img").await.unwrap();
        let second = store.peek("resize/a/50x60-img").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalid_path_is_terminal() {
        let store = MemoryObjectStore::new();
        let result = produce_derivative(&store, &signed_config(), "shrink/a/50x60-img").await;
        assert!(matches!(result, Err(PipelineError::InvalidPath)));
    }

    #[tokio::test]
    async fn test_allow_list_enforced_before_io() {
        let store = MemoryObjectStore::new();
        let config = AppConfig {
            allowed_dimensions: vec!["30x40".into(), "50x60".into(), "20x30".into()],
            ..signed_config()
        };

        // 許可リスト外の寸法はフェッチ前に拒否される（ストアは空で構わない）
        let result = produce_derivative(&store, &config, "resize/a/1000x2000-img").await;
        assert!(matches!(result, Err(PipelineError::InvalidDimensions)));

        // 許可された寸法はストレージまで到達し、不在なら NotFound になる
        let result = produce_derivative(&store, &config, "resize/a/50x60-img").await;
        assert!(matches!(result, Err(PipelineError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_not_found_carries_original_key_and_skips_store() {
        let store = MemoryObjectStore::new();

        let result =
            produce_derivative(&store, &signed_config(), "resize/something/50x60-img123").await;

        match result.unwrap_err() {
            PipelineError::NotFound { key } => assert_eq!(key, "assets/something/img123"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        // 変換も格納も行われないので派生キーは存在しない
        assert!(store.peek("resize/something/50x60-img123").await.is_none());
    }

    #[tokio::test]
    async fn test_unsupported_content_type() {
        let store = MemoryObjectStore::new();
        store
            .insert(
                "assets/a/doc",
                AssetRecord {
                    content_type: "application/pdf; foo=bar".to_string(),
                    body: Bytes::from_static(b"%PDF-"),
                    metadata: HashMap::new(),
                },
            )
            .await;

        let result = produce_derivative(&store, &signed_config(), "resize/a/50x60-doc").await;
        assert!(matches!(result, Err(PipelineError::UnsupportedFormat)));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_transform_failure() {
        let store = MemoryObjectStore::new();
        store
            .insert(
                "assets/a/img",
                AssetRecord {
                    content_type: "image/jpeg".to_string(),
                    body: Bytes::from_static(b"original image data"),
                    metadata: HashMap::new(),
                },
            )
            .await;

        let result = produce_derivative(&store, &signed_config(), "resize/a/50x60-img").await;
        assert!(matches!(result, Err(PipelineError::Transform(_))));
    }

    #[tokio::test]
    async fn test_extension_mode_uses_extension_map() {
        let config = AppConfig {
            grammar: GrammarMode::Extension,
            ..signed_config()
        };
        // 元画像の Content-Type は参照されず、拡張子の対応表が出力を決める
        let store = store_with_original("assets/a/img123.jpg", "application/octet-stream").await;

        produce_derivative(&store, &config, "resize/a/50x60-img123.jpg")
            .await
            .unwrap();

        let derivative = store.peek("resize/a/50x60-img123.jpg").await.unwrap();
        assert_eq!(derivative.content_type, "image/jpeg");
        assert_eq!(
            derivative.metadata.get("resized-from").unwrap(),
            "assets/a/img123.jpg"
        );
    }

    #[test]
    fn test_rewrite_signed_url() {
        let signed = "https://s3-us-west-1.amazonaws.com/example-bucket/resize/a/50x60-img123?AWSAccessKeyId=key&Expires=12345&Signature=signature";
        let base = Url::parse("https://configurable.url.com").unwrap();

        let rewritten = rewrite_signed_url(signed, &base).unwrap();
        assert_eq!(
            rewritten,
            "https://configurable.url.com/example-bucket/resize/a/50x60-img123?AWSAccessKeyId=key&Expires=12345&Signature=signature"
        );
    }
}
