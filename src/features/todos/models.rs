use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// TODOリストの種別
///
/// 同じ todos コレクションを互いに素な二つのリストに分ける。作成後は変更できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoKind {
    /// やること
    #[default]
    Todo,
    /// 買い物
    Shopping,
}

impl TodoKind {
    /// 保存時の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoKind::Todo => "todo",
            TodoKind::Shopping => "shopping",
        }
    }

    /// 文字列から種別を取得（未知の値はNone）
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(TodoKind::Todo),
            "shopping" => Some(TodoKind::Shopping),
            _ => None,
        }
    }

    /// もう一方の種別
    pub fn toggled(&self) -> Self {
        match self {
            TodoKind::Todo => TodoKind::Shopping,
            TodoKind::Shopping => TodoKind::Todo,
        }
    }
}

/// TODO / 買い物アイテム
///
/// 取り込み時に既定値の解決が済んだ状態を表す。
/// - `kind` が無いレコードは Todo
/// - `price` は数値でなければ 0、Todo では常に 0
/// - `date` は YYYY-MM-DD として妥当な場合のみ Some
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub kind: TodoKind,
    pub price: f64,
    pub date: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TodoItem {
    /// 価格バッジを表示するかどうか
    pub fn has_price(&self) -> bool {
        self.price > 0.0
    }
}

/// TODO作成用DTO
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodoDto {
    pub text: String,
    pub kind: TodoKind,
    /// 価格入力欄の生の値（買い物のみ使用）
    #[serde(default)]
    pub price: String,
}
