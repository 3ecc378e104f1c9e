use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::errors::StorageError;

use super::{AssetRecord, ObjectStore};

/// テスト・ローカル実行用のインメモリストレージバックエンド
///
/// `HashMap<String, AssetRecord>` を `RwLock` で保護するだけの実装。
/// 署名付き URL は検証可能な固定形式のダミーを返す。
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, AssetRecord>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// テストのセットアップ用。ストアに直接オブジェクトを配置する。
    pub async fn insert(&self, key: &str, record: AssetRecord) {
        self.objects.write().await.insert(key.to_string(), record);
    }

    /// テストの検証用。格納済みオブジェクトを覗く。
    pub async fn peek(&self, key: &str) -> Option<AssetRecord> {
        self.objects.read().await.get(key).cloned()
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<AssetRecord, StorageError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })
    }

    async fn put(&self, key: &str, record: AssetRecord) -> Result<(), StorageError> {
        self.objects.write().await.insert(key.to_string(), record);
        Ok(())
    }

    async fn signed_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!(
            "https://storage.local/{key}?X-Amz-Expires={}&X-Amz-Signature=memory",
            expires_in.as_secs()
        ))
    }
}
