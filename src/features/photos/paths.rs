// 写真ストア上のオブジェクトパス管理

use crate::features::auth::UserId;
use crate::shared::errors::{AppError, AppResult};

/// 拡張子が取れない場合の既定値
const DEFAULT_EXTENSION: &str = "jpg";

/// 写真のオブジェクトパス管理
pub struct PhotoPathManager;

impl PhotoPathManager {
    /// 新規エントリーの写真パスを生成
    ///
    /// # 戻り値
    /// `users/{user_id}/entries/{millis}.{ext}`
    pub fn new_entry_photo_path(user: &UserId, millis: i64, file_name: &str) -> String {
        let ext = Self::extension_of(file_name);
        format!("users/{user}/entries/{millis}.{ext}")
    }

    /// 既存エントリーの差し替え写真パスを生成
    ///
    /// # 戻り値
    /// `users/{user_id}/entries/{entry_id}_{millis}.{ext}`
    pub fn replacement_photo_path(
        user: &UserId,
        entry_id: &str,
        millis: i64,
        file_name: &str,
    ) -> String {
        let ext = Self::extension_of(file_name);
        format!("users/{user}/entries/{entry_id}_{millis}.{ext}")
    }

    /// ファイル名から拡張子を取り出す
    ///
    /// 最後の「.」以降。取れない場合は jpg。
    pub fn extension_of(file_name: &str) -> String {
        match file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_string(),
            _ => DEFAULT_EXTENSION.to_string(),
        }
    }

    /// ユーザーが自分の領域のパスにだけアクセスしていることを確認する
    pub fn validate_user_access(user: &UserId, path: &str) -> AppResult<()> {
        let prefix = format!("users/{user}/entries/");
        if !path.starts_with(&prefix) || path.split('/').any(|part| part == "..") {
            return Err(AppError::validation(format!(
                "写真パスが不正です: {path}"
            )));
        }
        Ok(())
    }
}
