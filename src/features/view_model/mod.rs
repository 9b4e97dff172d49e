/// 画面表示用データ（ビューモデル）モジュール
///
/// レコードのスナップショットと画面状態から、描画に必要なデータを
/// 純粋関数として組み立てる。I/Oは一切行わない。
pub mod engine;
pub mod expansion;
pub mod partition;
pub mod search;
pub mod state;

pub use engine::{
    DiaryView, EntryCard, HistoryDay, ItemRow, TodoView, ViewModel, ViewModelEngine, WorkingSet,
};
pub use expansion::{default_expansion_state, ExpansionMap, ExpansionState};
pub use partition::{compute_daily_total, partition_by_date_and_kind, DatePartition};
pub use search::{filter_by_keyword, highlight_matches, SearchState, Segment};
pub use state::{ViewMode, ViewState};
