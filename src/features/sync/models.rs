use crate::features::records::RawRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// ユーザーごとのコレクション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// 日記
    Entries,
    /// TODO / 買い物
    Todos,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Entries => "entries",
            Collection::Todos => "todos",
        }
    }
}

/// コレクションの内容を丸ごと置き換えるスナップショット
///
/// レコードは createdAt の降順。`sequence` はハブ全体で単調増加する。
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub collection: Collection,
    pub sequence: u64,
    pub records: Arc<Vec<RawRecord>>,
}

impl Snapshot {
    /// 購読直後、まだ何も届いていない状態
    pub fn empty(collection: Collection) -> Self {
        Self {
            collection,
            sequence: 0,
            records: Arc::new(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
