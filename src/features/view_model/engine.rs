use crate::features::diary::models::DiaryEntry;
use crate::features::records::{ingest_entries, ingest_todos};
use crate::features::sync::{Collection, Snapshot};
use crate::features::todos::models::{TodoItem, TodoKind};
use crate::features::view_model::partition::{compute_daily_total, partition_by_date_and_kind};
use crate::features::view_model::search::{filter_by_keyword, highlight_matches, Segment};
use crate::features::view_model::state::{ViewMode, ViewState};
use crate::shared::utils::{format_amount, today_key};
use chrono_tz::Tz;
use serde::Serialize;

/// 金額表示の単位
const CURRENCY_SUFFIX: &str = "원";

/// 金額を桁区切り＋単位で表示する
fn amount_label(amount: f64) -> String {
    format!("{}{CURRENCY_SUFFIX}", format_amount(amount))
}

/// 現在描画に使っているレコード一式
///
/// スナップショットが届くたびにコレクション単位で丸ごと置き換える。
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    entries: Vec<DiaryEntry>,
    todos: Vec<TodoItem>,
    entries_sequence: Option<u64>,
    todos_sequence: Option<u64>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[DiaryEntry] {
        &self.entries
    }

    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    /// スナップショットで該当コレクションを置き換える
    ///
    /// 既に適用済みのものより古いスナップショットは無視し、falseを返す。
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot, tz: &Tz) -> bool {
        let current = match snapshot.collection {
            Collection::Entries => self.entries_sequence,
            Collection::Todos => self.todos_sequence,
        };
        if current.is_some_and(|seq| snapshot.sequence <= seq) {
            log::warn!(
                "古いスナップショットを無視しました: collection={}, sequence={}, current={current:?}",
                snapshot.collection.as_str(),
                snapshot.sequence
            );
            return false;
        }

        match snapshot.collection {
            Collection::Entries => {
                self.entries = ingest_entries(&snapshot.records, tz);
                self.entries_sequence = Some(snapshot.sequence);
            }
            Collection::Todos => {
                self.todos = ingest_todos(&snapshot.records);
                self.todos_sequence = Some(snapshot.sequence);
            }
        }
        true
    }

    /// ログアウト時: すべてのデータを破棄する
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// 日記カード1枚分
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryCard {
    pub id: String,
    pub time_label: String,
    pub segments: Vec<Segment>,
    pub photo_url: Option<String>,
}

/// 日記セクション
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryView {
    /// 検索欄を表示するか（日記モードのみ）
    pub show_search: bool,
    pub search_applied: bool,
    pub cards: Vec<EntryCard>,
}

/// TODO / 買い物の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// チェックボックスを表示するか（TODOのみ）
    pub show_checkbox: bool,
    /// 価格バッジ（買い物で価格が正の場合のみ、例: `3,500원`）
    pub price_label: Option<String>,
}

/// 履歴パネルの1日分
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDay {
    pub date: String,
    pub expanded: bool,
    /// 買い物のみ
    pub subtotal: Option<f64>,
    pub subtotal_label: Option<String>,
    pub items: Vec<ItemRow>,
}

/// TODOセクション
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    pub kind: TodoKind,
    pub today: Vec<ItemRow>,
    /// 今日の合計（買い物のみ）
    pub today_total: Option<f64>,
    pub today_total_label: Option<String>,
    /// 履歴パネル（詳細表示のみ）
    pub history: Option<Vec<HistoryDay>>,
}

impl TodoView {
    /// 表示中の履歴の日付（降順）。履歴パネルが無い場合は空
    pub fn history_dates(&self) -> Vec<String> {
        self.history
            .iter()
            .flatten()
            .map(|day| day.date.clone())
            .collect()
    }
}

/// 描画に必要なデータ一式
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub mode: ViewMode,
    pub today_key: String,
    pub diary: Option<DiaryView>,
    pub todos: Option<TodoView>,
}

/// 画面状態とレコード一式から描画データを組み立てる
#[derive(Debug, Clone)]
pub struct ViewModelEngine {
    timezone: Tz,
}

impl ViewModelEngine {
    /// # 引数
    /// * `timezone` - 今日の日付キーの算出に使うタイムゾーン
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// 現在時刻での今日の日付キー
    pub fn today_key(&self) -> String {
        today_key(&self.timezone)
    }

    /// 現在時刻を基準に描画データを作る
    pub fn render(&self, state: &ViewState, data: &WorkingSet) -> ViewModel {
        self.render_at(state, data, &self.today_key())
    }

    /// 指定した今日の日付キーを基準に描画データを作る
    pub fn render_at(&self, state: &ViewState, data: &WorkingSet, today_key: &str) -> ViewModel {
        let diary = state
            .mode
            .shows_diary()
            .then(|| self.diary_view(state, data.entries(), today_key));
        let todos = state
            .mode
            .shows_todos()
            .then(|| self.todo_view(state, data.todos(), today_key));

        ViewModel {
            mode: state.mode,
            today_key: today_key.to_string(),
            diary,
            todos,
        }
    }

    fn diary_view(&self, state: &ViewState, entries: &[DiaryEntry], today_key: &str) -> DiaryView {
        let search_applied = state.search_applied();
        let keyword = state.search.committed.as_str();

        let visible: Vec<DiaryEntry> = match state.mode {
            ViewMode::All => entries
                .iter()
                .filter(|entry| entry.date.as_deref() == Some(today_key))
                .cloned()
                .collect(),
            _ if search_applied => filter_by_keyword(entries, keyword),
            _ => entries.to_vec(),
        };

        let cards = visible
            .into_iter()
            .map(|entry| {
                let segments = if search_applied {
                    highlight_matches(&entry.text, keyword)
                } else {
                    highlight_matches(&entry.text, "")
                };
                EntryCard {
                    time_label: time_label(&entry, state.mode),
                    photo_url: entry.photo.as_ref().map(|p| p.image_url.clone()),
                    id: entry.id,
                    segments,
                }
            })
            .collect();

        DiaryView {
            show_search: state.mode == ViewMode::Diary,
            search_applied,
            cards,
        }
    }

    fn todo_view(&self, state: &ViewState, todos: &[TodoItem], today_key: &str) -> TodoView {
        let kind = state.active_kind();
        let partition = partition_by_date_and_kind(todos, kind, today_key);
        let is_shopping = kind == TodoKind::Shopping;

        let history = state.mode.is_detail().then(|| {
            partition
                .history
                .iter()
                .map(|date| {
                    let items = partition.items_on(date);
                    let subtotal = is_shopping.then(|| compute_daily_total(items));
                    HistoryDay {
                        date: date.clone(),
                        expanded: state.expansion.is_open(
                            date,
                            &partition.history,
                            state.history_open_count,
                        ),
                        subtotal,
                        subtotal_label: subtotal.map(amount_label),
                        items: items.iter().map(item_row).collect(),
                    }
                })
                .collect()
        });

        let today_total = is_shopping.then(|| compute_daily_total(&partition.today));
        TodoView {
            kind,
            today: partition.today.iter().map(item_row).collect(),
            today_total,
            today_total_label: today_total.map(amount_label),
            history,
        }
    }
}

/// 日記カードの時刻表示
///
/// ALL表示では時刻のみ、それ以外は「日付 時刻」。
fn time_label(entry: &DiaryEntry, mode: ViewMode) -> String {
    let time = entry.time.as_deref().unwrap_or_default();
    if mode == ViewMode::All {
        return time.to_string();
    }
    let date = entry.date.as_deref().unwrap_or_default();
    format!("{date} {time}").trim().to_string()
}

fn item_row(item: &TodoItem) -> ItemRow {
    let is_todo = item.kind == TodoKind::Todo;
    ItemRow {
        id: item.id.clone(),
        text: item.text.clone(),
        completed: is_todo && item.completed,
        show_checkbox: is_todo,
        price_label: (!is_todo && item.has_price()).then(|| amount_label(item.price)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::records::RawRecord;
    use serde_json::{json, Value};
    use std::sync::Arc;

    const TODAY: &str = "2024-01-02";

    fn records(values: Vec<Value>) -> Arc<Vec<RawRecord>> {
        Arc::new(
            values
                .into_iter()
                .map(|v| v.as_object().cloned().unwrap())
                .collect(),
        )
    }

    fn snapshot(collection: Collection, sequence: u64, values: Vec<Value>) -> Snapshot {
        Snapshot {
            collection,
            sequence,
            records: records(values),
        }
    }

    fn sample_data() -> WorkingSet {
        let mut data = WorkingSet::new();
        data.apply_snapshot(
            &snapshot(
                Collection::Entries,
                1,
                vec![
                    json!({"id": "e1", "text": "hello world", "date": TODAY, "time": "09:00"}),
                    json!({"id": "e2", "text": "Yesterday's WORLD tour", "date": "2024-01-01", "time": "21:30"}),
                    json!({"id": "e3", "text": "no date", "createdAt": "2024-01-02T01:02:00Z"}),
                ],
            ),
            &Tz::UTC,
        );
        data.apply_snapshot(
            &snapshot(
                Collection::Todos,
                1,
                vec![
                    json!({"id": "s1", "text": "牛乳", "kind": "shopping", "price": 1000, "date": TODAY}),
                    json!({"id": "s2", "text": "パン", "kind": "shopping", "price": 2500, "date": TODAY}),
                    json!({"id": "s3", "text": "卵", "kind": "shopping", "price": 500, "date": "2024-01-01"}),
                    json!({"id": "s4", "text": "袋", "kind": "shopping", "price": 0, "date": "2023-12-30"}),
                    json!({"id": "t1", "text": "洗濯", "date": TODAY, "completed": true}),
                    json!({"id": "t2", "text": "掃除", "date": "2023-12-31"}),
                    json!({"id": "t3", "text": "日付なし"}),
                ],
            ),
            &Tz::UTC,
        );
        data
    }

    fn engine() -> ViewModelEngine {
        ViewModelEngine::new(Tz::UTC)
    }

    #[test]
    fn test_all_mode_shows_today_only() {
        let vm = engine().render_at(&ViewState::default(), &sample_data(), TODAY);

        let diary = vm.diary.unwrap();
        assert!(!diary.show_search);
        assert_eq!(diary.cards.len(), 1);
        assert_eq!(diary.cards[0].id, "e1");
        assert_eq!(diary.cards[0].time_label, "09:00");

        let todos = vm.todos.unwrap();
        assert_eq!(todos.kind, TodoKind::Todo);
        assert_eq!(todos.today.len(), 1);
        assert!(todos.today[0].completed && todos.today[0].show_checkbox);
        assert_eq!(todos.today_total, None);
        assert!(todos.history.is_none());
    }

    #[test]
    fn test_diary_mode_search_and_highlight() {
        let state = ViewState::default()
            .select_mode(ViewMode::Diary)
            .type_search("World");

        // 確定前は全件・強調なし
        let vm = engine().render_at(&state, &sample_data(), TODAY);
        let diary = vm.diary.unwrap();
        assert!(vm.todos.is_none());
        assert!(diary.show_search && !diary.search_applied);
        assert_eq!(diary.cards.len(), 3);
        assert_eq!(diary.cards[1].time_label, "2024-01-01 21:30");
        assert_eq!(diary.cards[2].time_label, "01:02");

        let state = state.commit_search();
        let diary = engine().render_at(&state, &sample_data(), TODAY).diary.unwrap();
        assert!(diary.search_applied);
        let ids: Vec<&str> = diary.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
        assert_eq!(
            diary.cards[0].segments,
            vec![
                Segment { text: "hello ".to_string(), matched: false },
                Segment { text: "world".to_string(), matched: true },
            ]
        );
    }

    #[test]
    fn test_shopping_detail_view() {
        let state = ViewState::new(1).toggle_todo_mode().select_todo_section();
        let todos = engine().render_at(&state, &sample_data(), TODAY).todos.unwrap();

        assert_eq!(todos.kind, TodoKind::Shopping);
        assert_eq!(todos.today_total, Some(3500.0));
        assert_eq!(todos.today[0].price_label.as_deref(), Some("1,000원"));
        assert_eq!(todos.today_total_label.as_deref(), Some("3,500원"));
        assert!(!todos.today[0].show_checkbox);

        let history = todos.history.unwrap();
        let dates: Vec<&str> = history.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2023-12-30"]);
        assert_eq!(history[0].subtotal, Some(500.0));
        assert_eq!(history[0].subtotal_label.as_deref(), Some("500원"));
        assert_eq!(history[1].subtotal_label.as_deref(), Some("0원"));
        assert!(history[0].expanded);
        assert!(!history[1].expanded);
        // 価格0のアイテムにはバッジを出さない
        assert_eq!(history[1].items[0].price_label, None);
    }

    #[test]
    fn test_history_toggle_and_reset() {
        let data = sample_data();
        let state = ViewState::default().select_mode(ViewMode::Todo);

        let shown = engine().render_at(&state, &data, TODAY).todos.unwrap();
        assert!(shown.history.as_ref().unwrap()[0].expanded);
        assert_eq!(shown.today_total_label, None);

        let state = state.toggle_history_date("2023-12-31", &shown);
        let vm = engine().render_at(&state, &data, TODAY);
        let history = vm.todos.unwrap().history.unwrap();
        assert!(!history[0].expanded);
        assert_eq!(history[0].subtotal, None);
        assert_eq!(history[0].subtotal_label, None);

        // モードを往復すると初期状態に戻る
        let state = state.toggle_todo_mode().toggle_todo_mode();
        let vm = engine().render_at(&state, &data, TODAY);
        assert!(vm.todos.unwrap().history.unwrap()[0].expanded);
    }

    #[test]
    fn test_toggle_uses_history_shown_before_snapshot() {
        let mut data = WorkingSet::new();
        let item = |id: &str, date: &str| {
            json!({"id": id, "text": id, "kind": "shopping", "price": 100, "date": date})
        };
        data.apply_snapshot(
            &snapshot(
                Collection::Todos,
                1,
                vec![item("a", "2024-01-01"), item("b", "2023-12-31")],
            ),
            &Tz::UTC,
        );
        let state = ViewState::new(1).select_mode(ViewMode::Shopping);
        let shown = engine().render_at(&state, &data, "2024-01-05").todos.unwrap();
        assert_eq!(shown.history_dates(), vec!["2024-01-01", "2023-12-31"]);

        // 表示後、操作前に新しい日付が届く
        data.apply_snapshot(
            &snapshot(
                Collection::Todos,
                2,
                vec![
                    item("c", "2024-01-03"),
                    item("a", "2024-01-01"),
                    item("b", "2023-12-31"),
                ],
            ),
            &Tz::UTC,
        );

        let state = state.toggle_history_date("2023-12-31", &shown);
        let history = engine()
            .render_at(&state, &data, "2024-01-05")
            .todos
            .unwrap()
            .history
            .unwrap();
        let expanded: Vec<(&str, bool)> = history
            .iter()
            .map(|day| (day.date.as_str(), day.expanded))
            .collect();
        assert_eq!(
            expanded,
            vec![("2024-01-03", false), ("2024-01-01", true), ("2023-12-31", true)]
        );
    }

    #[test]
    fn test_stale_snapshot_is_ignored() {
        let mut data = sample_data();
        let stale = snapshot(Collection::Todos, 1, vec![]);
        assert!(!data.apply_snapshot(&stale, &Tz::UTC));
        assert_eq!(data.todos().len(), 7);

        let fresh = snapshot(Collection::Todos, 2, vec![]);
        assert!(data.apply_snapshot(&fresh, &Tz::UTC));
        assert!(data.todos().is_empty());
        // 他のコレクションには影響しない
        assert_eq!(data.entries().len(), 3);
    }

    #[test]
    fn test_cleared_working_set_renders_empty() {
        let mut data = sample_data();
        data.clear();

        let vm = engine().render_at(&ViewState::default().select_mode(ViewMode::Shopping), &data, TODAY);
        let todos = vm.todos.unwrap();
        assert!(todos.today.is_empty());
        assert_eq!(todos.today_total, Some(0.0));
        assert_eq!(todos.history, Some(vec![]));

        let vm = engine().render_at(&ViewState::default(), &data, TODAY);
        assert!(vm.diary.unwrap().cards.is_empty());
    }
}
