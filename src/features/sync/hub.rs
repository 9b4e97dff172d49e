use crate::features::auth::UserId;
use crate::features::records::RawRecord;
use crate::features::sync::models::{Collection, Snapshot};
use crate::shared::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

type ChannelKey = (UserId, Collection);

/// リアルタイム購読の配信元
///
/// ユーザー・コレクションごとに watch チャネルを持ち、常に最新の
/// スナップショットだけを保持する。古い値は新しい値で上書きされる。
#[derive(Debug, Default)]
pub struct SnapshotHub {
    channels: Mutex<HashMap<ChannelKey, watch::Sender<Snapshot>>>,
    sequence: AtomicU64,
}

impl SnapshotHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しいスナップショットを配信する
    ///
    /// 番号は呼び出し順に増える。呼び出し側は記録の読み出しから
    /// この呼び出しまでを同じロックの中で行うこと。
    ///
    /// # 戻り値
    /// 割り当てたシーケンス番号
    pub fn publish(
        &self,
        user: &UserId,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> AppResult<u64> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|e| AppError::concurrency(format!("購読チャネルのロック取得失敗: {e}")))?;

        // 採番と送信を同じロック内で行う
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Snapshot {
            collection,
            sequence,
            records: Arc::new(records),
        };

        let count = snapshot.records.len();
        channels
            .entry((user.clone(), collection))
            .or_insert_with(|| watch::channel(Snapshot::empty(collection)).0)
            .send_replace(snapshot);

        log::debug!(
            "スナップショットを配信しました: user={user}, collection={}, sequence={sequence}, records={count}",
            collection.as_str()
        );
        Ok(sequence)
    }

    /// 購読を開始する
    ///
    /// まだ配信が無い場合は空のスナップショット（sequence=0）から始まる。
    pub fn subscribe(&self, user: &UserId, collection: Collection) -> AppResult<SnapshotSubscription> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|e| AppError::concurrency(format!("購読チャネルのロック取得失敗: {e}")))?;

        let receiver = channels
            .entry((user.clone(), collection))
            .or_insert_with(|| watch::channel(Snapshot::empty(collection)).0)
            .subscribe();

        Ok(SnapshotSubscription { receiver })
    }
}

/// 1コレクション分の購読
///
/// 破棄すると購読が解除される。
#[derive(Debug)]
pub struct SnapshotSubscription {
    receiver: watch::Receiver<Snapshot>,
}

impl SnapshotSubscription {
    /// 最新のスナップショットを取得し、既読にする
    pub fn latest(&mut self) -> Snapshot {
        self.receiver.borrow_and_update().clone()
    }

    /// 未読のスナップショットがあるか
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// 次のスナップショットを待つ
    ///
    /// 配信元が破棄された場合はNone
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.latest())
    }
}
