/// 認証機能
pub mod auth;

/// レコード取り込み機能
pub mod records;

/// 日記機能
pub mod diary;

/// TODO / 買い物リスト機能
pub mod todos;

/// 写真添付機能
pub mod photos;

/// リアルタイム同期機能
pub mod sync;

/// 画面表示用データ機能
pub mod view_model;
