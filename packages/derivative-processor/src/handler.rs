use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use derivative_core::{GrammarMode, ImageFormat, ObjectStore};

use crate::config::AppConfig;
use crate::pipeline::{produce_derivative, DerivativeRef, PipelineError};

#[derive(Clone)]
pub struct AppState<S> {
    pub store: Arc<S>,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ResizeQuery {
    pub key: String,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// 単一の要求キーを受け取り、パイプラインの終端状態をレスポンスに写す
pub async fn resize<S: ObjectStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<ResizeQuery>,
) -> Response {
    match produce_derivative(state.store.as_ref(), &state.config, &query.key).await {
        Ok(reference) => success_response(reference),
        Err(error) => fault_response(&state.config, error),
    }
}

fn success_response(reference: DerivativeRef) -> Response {
    match reference {
        DerivativeRef::Direct { location } => (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, location)],
            "",
        )
            .into_response(),
        DerivativeRef::Created { location } => (
            StatusCode::CREATED,
            Json(json!({ "result": "Created", "location": location })),
        )
            .into_response(),
    }
}

/// 終端エラーをレスポンスに変換する
///
/// 呼び出し元起因の四カテゴリのみ構造化された本文を持つ。バックエンド障害は
/// ログに残し、本文なしの 500 を返す（呼び出し元が対処できる情報はない）。
fn fault_response(config: &AppConfig, error: PipelineError) -> Response {
    match fault_parts(config, &error) {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => {
            match error {
                PipelineError::Transform(e) => {
                    tracing::error!(error = %e, "image transform failed");
                }
                PipelineError::Store(e) => {
                    tracing::error!(error = %e, "storage operation failed");
                }
                _ => unreachable!("client faults always have response parts"),
            }
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// 呼び出し元起因のエラーをステータスと JSON 本文に写す
///
/// バックエンド障害（Transform / Store）には構造化本文がなく None を返す。
fn fault_parts(config: &AppConfig, error: &PipelineError) -> Option<(StatusCode, Value)> {
    match error {
        PipelineError::InvalidPath => Some((
            StatusCode::BAD_REQUEST,
            json!({
                "errorCategory": "InvalidResizePath",
                "message": "Path did not match expected format.",
            }),
        )),
        PipelineError::InvalidDimensions => Some((
            StatusCode::BAD_REQUEST,
            json!({
                "errorCategory": "InvalidDimensions",
                "message": format!("Allowed dimensions: {}", config.allowed_dimensions.join(", ")),
            }),
        )),
        PipelineError::UnsupportedFormat => Some((
            StatusCode::BAD_REQUEST,
            json!({
                "errorCategory": "UnsupportedFormat",
                "message": format!("Supported image formats: {}", supported_formats(config).join(", ")),
            }),
        )),
        PipelineError::NotFound { key } => Some((
            StatusCode::NOT_FOUND,
            json!({
                "errorCategory": "NotFound",
                "message": format!(
                    "Asset not found in bucket {} with key {}",
                    config.bucket, key
                ),
            }),
        )),
        PipelineError::Transform(_) | PipelineError::Store(_) => None,
    }
}

/// 文法モードに応じた対応フォーマットの列挙
fn supported_formats(config: &AppConfig) -> &'static [&'static str] {
    match config.grammar {
        GrammarMode::ContentType => &ImageFormat::MIME_TOKENS,
        GrammarMode::Extension => &ImageFormat::EXTENSIONS,
    }
}
