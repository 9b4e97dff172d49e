use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 日記に添付された写真への参照
///
/// URLとストア上のパスは常に組で設定・解除される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRef {
    pub image_url: String,
    /// 古いレコードでは空のことがある（その場合ストア側の削除は行わない）
    pub image_path: String,
}

/// 日記エントリー
///
/// 取り込み時に既定値の解決が済んだ状態を表す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: String,
    pub text: String,
    /// YYYY-MM-DD として妥当な場合のみ Some
    pub date: Option<String>,
    /// HH:MM。無い場合は createdAt から導出済み
    pub time: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub photo: Option<PhotoRef>,
}

/// 新しい写真のアップロード内容
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// 元のファイル名（拡張子の決定に使う）
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 日記作成用DTO
#[derive(Debug, Clone)]
pub struct CreateEntryDto {
    pub text: String,
    /// 未指定の場合は今日
    pub date: Option<String>,
    pub photo: Option<PhotoUpload>,
}

/// 編集時の写真の扱い
#[derive(Debug, Clone, Default)]
pub enum PhotoChange {
    /// 現在の写真をそのまま残す
    #[default]
    Keep,
    /// 写真を外す
    Remove,
    /// 新しい写真に差し替える
    Replace(PhotoUpload),
}

/// 日記更新用DTO
#[derive(Debug, Clone)]
pub struct UpdateEntryDto {
    pub text: String,
    pub photo: PhotoChange,
}
