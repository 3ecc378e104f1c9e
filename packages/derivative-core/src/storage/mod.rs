pub mod memory;
pub mod s3;

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;

use crate::errors::StorageError;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

/// ストレージ内のオブジェクト一件
///
/// 本文・Content-Type・ユーザーメタデータの組。派生画像の書き込み時には
/// 元画像のメタデータに出所（`resized-from`）を追記したものを渡す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub content_type: String,
    pub body: Bytes,
    pub metadata: HashMap<String, String>,
}

/// オブジェクトストレージの抽象
///
/// 本番実装は `S3ObjectStore`。テストでは `MemoryObjectStore` を使い、
/// 外部依存なしでパイプライン全体を検証できる。
pub trait ObjectStore: Send + Sync {
    /// オブジェクトを取得する。存在しなければ `StorageError::NotFound`。
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<AssetRecord, StorageError>> + Send;

    /// オブジェクトを書き込む。既存キーは上書き（last-writer-wins）。
    fn put(
        &self,
        key: &str,
        record: AssetRecord,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// 読み取り専用の署名付き URL を発行する。副作用はない。
    fn signed_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> impl std::future::Future<Output = Result<String, StorageError>> + Send;
}
