/// TODO / 買い物リスト機能モジュール
///
/// - アイテムの追加、完了切り替え、削除
/// - 買い物アイテムの価格入力の解釈
/// - 書き込み後のスナップショット配信
pub mod commands;
pub mod models;
pub mod repository;

// モデル
pub use models::{CreateTodoDto, TodoItem, TodoKind};

// コマンド
pub use commands::{add_todo, delete_todo, subscribe_todos, toggle_todo};
