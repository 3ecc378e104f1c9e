use std::time::Duration;

use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::errors::StorageError;

use super::{AssetRecord, ObjectStore};

/// aws-sdk-s3 をラップした本番ストレージバックエンド
///
/// AWS S3 および S3 互換ストア（MinIO など）に対応する。接続先や認証情報は
/// SDK のデフォルトチェーン（環境変数・プロファイル・IAM ロール）で解決される。
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// SDK デフォルトチェーンでクライアントを構築する
    pub async fn from_env(bucket: String) -> Self {
        let sdk_config =
            aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&sdk_config), bucket)
    }
}

impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str) -> Result<AssetRecord, StorageError> {
        debug!(bucket = %self.bucket, key, "S3 GET");

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                // キー不在は NotFound として区別し、それ以外は未分類の障害
                if let SdkError::ServiceError(ref service_err) = err {
                    if service_err.err().is_no_such_key() {
                        return Err(StorageError::NotFound {
                            key: key.to_string(),
                        });
                    }
                }
                return Err(StorageError::Backend {
                    key: key.to_string(),
                    reason: err.to_string(),
                });
            }
        };

        let content_type = output
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let metadata = output.metadata.clone().unwrap_or_default();

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend {
                key: key.to_string(),
                reason: e.to_string(),
            })?
            .into_bytes();

        Ok(AssetRecord {
            content_type,
            body,
            metadata,
        })
    }

    async fn put(&self, key: &str, record: AssetRecord) -> Result<(), StorageError> {
        debug!(bucket = %self.bucket, key, bytes = record.body.len(), "S3 PUT");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(record.body))
            .content_type(record.content_type)
            .set_metadata(Some(record.metadata))
            .send()
            .await
            .map_err(|e| StorageError::Backend {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    async fn signed_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            StorageError::Backend {
                key: key.to_string(),
                reason: format!("invalid presigning expiry: {e}"),
            }
        })?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| StorageError::Backend {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(presigned.uri().to_string())
    }
}
