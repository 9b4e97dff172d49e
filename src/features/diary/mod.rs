/// 日記機能モジュール
///
/// - 日記の保存、編集、削除
/// - 添付写真（1枚）のアップロードと差し替え
/// - 書き込み後のスナップショット配信
pub mod commands;
pub mod models;
pub mod repository;

// モデル
pub use models::{
    CreateEntryDto, DiaryEntry, PhotoChange, PhotoRef, PhotoUpload, UpdateEntryDto,
};

// コマンド
pub use commands::{delete_entry, save_entry, subscribe_entries, update_entry};
