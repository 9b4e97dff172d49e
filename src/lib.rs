// 機能モジュール
pub mod features;
pub mod shared;

use features::auth::{AuthState, UserId};
use features::photos::{LocalPhotoStore, PhotoStore};
use features::sync::SnapshotHub;
use features::view_model::{ViewModelEngine, ViewState};
use log::info;
use rusqlite::Connection;
use shared::config::{
    initialize_application, initialize_logging_system, load_environment_variables, AppConfig,
};
use shared::database::initialize_database;
use shared::errors::{AppError, AppResult};
use std::sync::{Mutex, MutexGuard};

/// アプリケーション状態
///
/// ローカルレコードストア、スナップショット配信元、写真ストア、
/// 認証状態と設定をまとめて保持する。
pub struct AppState {
    pub db: Mutex<Connection>,
    pub hub: SnapshotHub,
    pub photos: Box<dyn PhotoStore>,
    pub auth: Mutex<AuthState>,
    pub config: AppConfig,
}

impl AppState {
    /// 既に用意された部品から状態を組み立てる（未ログイン状態で開始）
    pub fn new(db: Connection, photos: Box<dyn PhotoStore>, config: AppConfig) -> Self {
        Self {
            db: Mutex::new(db),
            hub: SnapshotHub::new(),
            photos,
            auth: Mutex::new(AuthState::signed_out()),
            config,
        }
    }

    /// 環境変数を読み込み、ログを初期化してから状態を作る
    pub fn from_env() -> AppResult<Self> {
        // .env の読み込みはログ初期化より先に行う
        load_environment_variables();
        initialize_logging_system();

        Self::initialize(AppConfig::from_env())
    }

    /// 設定に従ってデータディレクトリ・データベース・写真ストアを用意する
    pub fn initialize(config: AppConfig) -> AppResult<Self> {
        info!("アプリケーション初期化を開始します...");

        let init = initialize_application(&config)?;
        let db = initialize_database(&init.database_path)?;
        let photos = LocalPhotoStore::new(config.photo_dir());

        info!(
            "アプリケーション初期化が完了しました: environment={:?}, first_run={}, timezone={:?}",
            init.environment, init.is_first_run, config.timezone
        );
        Ok(Self::new(db, Box::new(photos), config))
    }

    /// データベース接続を取得する
    pub fn db(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))
    }

    /// ログイン中のユーザーを取得する（未ログインの場合はエラー）
    pub fn current_user(&self) -> AppResult<UserId> {
        self.auth_state()?.require_user().cloned()
    }

    /// IDプロバイダーからログイン通知を受けた
    pub fn sign_in(&self, user: UserId) -> AppResult<()> {
        self.auth_state()?.on_auth_state_changed(Some(user));
        Ok(())
    }

    /// IDプロバイダーからログアウト通知を受けた
    pub fn sign_out(&self) -> AppResult<()> {
        self.auth_state()?.on_auth_state_changed(None);
        Ok(())
    }

    /// 設定のタイムゾーンを使うビューモデルエンジン
    pub fn view_model_engine(&self) -> ViewModelEngine {
        ViewModelEngine::new(self.config.timezone)
    }

    /// 設定の展開日数を使う初期画面状態
    pub fn initial_view_state(&self) -> ViewState {
        ViewState::new(self.config.history_open_count)
    }

    fn auth_state(&self) -> AppResult<MutexGuard<'_, AuthState>> {
        self.auth
            .lock()
            .map_err(|e| AppError::concurrency(format!("認証状態ロック取得失敗: {e}")))
    }
}

#[cfg(test)]
mod test_support;
