use crate::shared::config::environment::{get_database_filename, get_environment, Environment};
use crate::shared::errors::{AppError, AppResult};
use chrono_tz::Tz;
use std::fs;
use std::path::{Path, PathBuf};

/// 履歴パネルで最初に展開しておく日数（デフォルト）
pub const DEFAULT_HISTORY_OPEN_COUNT: usize = 4;

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 実行環境
    pub environment: Environment,
    /// 今日の日付キーや時刻の算出に使うタイムゾーン
    pub timezone: Tz,
    /// 履歴パネルで最初に展開しておく日数
    pub history_open_count: usize,
    /// アプリケーションデータディレクトリ
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// 任意の値の取得元から設定を組み立てる
    ///
    /// # 引数
    /// * `lookup` - 変数名から値を返す関数
    ///
    /// # 読み込む変数
    /// - `DAILY_INK_TIMEZONE`（既定: UTC）
    /// - `DAILY_INK_HISTORY_OPEN_COUNT`（既定: 4）
    /// - `DAILY_INK_DATA_DIR`（既定: OSのデータディレクトリ/daily-ink）
    pub fn from_source<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = get_environment();

        let timezone = match lookup("DAILY_INK_TIMEZONE") {
            Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                log::warn!("DAILY_INK_TIMEZONEのパースに失敗しました。UTCを使用します: {name}");
                Tz::UTC
            }),
            None => Tz::UTC,
        };

        let history_open_count = lookup("DAILY_INK_HISTORY_OPEN_COUNT")
            .map(|raw| {
                raw.trim().parse().unwrap_or_else(|_| {
                    log::warn!(
                        "DAILY_INK_HISTORY_OPEN_COUNTのパースに失敗しました。デフォルト値{DEFAULT_HISTORY_OPEN_COUNT}を使用します"
                    );
                    DEFAULT_HISTORY_OPEN_COUNT
                })
            })
            .unwrap_or(DEFAULT_HISTORY_OPEN_COUNT);

        let data_dir = lookup("DAILY_INK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self {
            environment,
            timezone,
            history_open_count,
            data_dir,
        }
    }

    /// データベースファイルのパス
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(get_database_filename(&self.environment))
    }

    /// ローカル写真ストアのルートディレクトリ
    pub fn photo_dir(&self) -> PathBuf {
        self.data_dir.join("photos")
    }
}

/// OS標準のデータディレクトリ配下のパスを返す
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("daily-ink")
}

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか
    pub is_first_run: bool,
    /// データベースファイルのパス
    pub database_path: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 処理内容
/// 1. アプリケーションデータディレクトリの作成
/// 2. 初回起動の判定（データベースファイルの有無）
pub fn initialize_application(config: &AppConfig) -> AppResult<InitializationResult> {
    ensure_directory(&config.data_dir)?;

    let database_path = config.database_path();
    let is_first_run = !database_path.exists();

    if is_first_run {
        log::info!("=== アプリケーション初回起動 ===");
        log::info!("実行環境: {:?}", config.environment);
        log::info!("データディレクトリ: {:?}", config.data_dir);
    }

    Ok(InitializationResult {
        is_first_run,
        database_path,
        environment: config.environment.clone(),
    })
}

/// ディレクトリを確実に作成する
fn ensure_directory(dir: &Path) -> AppResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::configuration(format!("データディレクトリの作成に失敗: {e}"))
        })?;
        log::info!("データディレクトリを作成しました: {dir:?}");
    }
    Ok(())
}
