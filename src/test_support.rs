// テスト用の共通部品

use crate::features::auth::UserId;
use crate::features::photos::PhotoStore;
use crate::shared::config::AppConfig;
use crate::shared::database::initialize_in_memory_database;
use crate::shared::errors::{AppError, AppResult};
use crate::AppState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// メモリ上の写真ストア
#[derive(Debug, Default)]
pub struct MemoryPhotoStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_upload: bool,
    fail_delete: bool,
}

impl MemoryPhotoStore {
    pub fn failing_uploads() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_delete: true,
            ..Self::default()
        }
    }

    /// 保存中のパス（昇順）
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl PhotoStore for Arc<MemoryPhotoStore> {
    fn upload(&self, path: &str, bytes: &[u8]) -> AppResult<String> {
        if self.fail_upload {
            return Err(AppError::external_service("photo store", "upload failed"));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(format!("mem://{path}"))
    }

    fn delete(&self, path: &str) -> AppResult<()> {
        if self.fail_delete {
            return Err(AppError::external_service("photo store", "delete failed"));
        }
        match self.objects.lock().unwrap().remove(path) {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(format!("写真 {path}"))),
        }
    }
}

/// 環境変数に依存しない設定（UTC・展開4日）
pub fn test_config() -> AppConfig {
    AppConfig::from_source(|_| None)
}

/// メモリ上のデータベースと指定した写真ストアを使う未ログイン状態
pub fn state_with_store(photos: Box<dyn PhotoStore>) -> AppState {
    let db = initialize_in_memory_database().unwrap();
    AppState::new(db, photos, test_config())
}

pub fn signed_out_state() -> AppState {
    state_with_store(Box::new(Arc::new(MemoryPhotoStore::default())))
}

/// ユーザー "u1" でログイン済みの状態
pub fn signed_in_state() -> AppState {
    let state = signed_out_state();
    state.sign_in(UserId::new("u1").unwrap()).unwrap();
    state
}
