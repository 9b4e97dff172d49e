/// リアルタイム同期機能モジュール
///
/// レコードソースからのプッシュ配信を、呼び出し側が一度だけ登録する
/// 明示的な購読チャネルとして表す。エンジン自体は同期処理のままで、
/// 最新のスナップショットを受け取るたびに再実行される。
pub mod hub;
pub mod models;

pub use hub::{SnapshotHub, SnapshotSubscription};
pub use models::{Collection, Snapshot};
