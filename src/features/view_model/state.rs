use crate::features::todos::models::TodoKind;
use crate::features::view_model::engine::TodoView;
use crate::features::view_model::expansion::ExpansionState;
use crate::features::view_model::search::SearchState;
use crate::shared::config::DEFAULT_HISTORY_OPEN_COUNT;
use serde::{Deserialize, Serialize};

/// 表示モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// 今日の日記とTODOを並べて表示
    #[default]
    All,
    /// 日記のみ（検索あり）
    Diary,
    /// TODOのみ（履歴あり）
    Todo,
    /// 買い物リストのみ（履歴あり）
    Shopping,
}

impl ViewMode {
    /// 日記セクションを表示するか
    pub fn shows_diary(&self) -> bool {
        matches!(self, ViewMode::All | ViewMode::Diary)
    }

    /// TODOセクションを表示するか
    pub fn shows_todos(&self) -> bool {
        !matches!(self, ViewMode::Diary)
    }

    /// 履歴パネル付きの詳細表示か
    pub fn is_detail(&self) -> bool {
        matches!(self, ViewMode::Todo | ViewMode::Shopping)
    }

    /// 詳細表示に対応する種別
    fn detail_kind(&self) -> Option<TodoKind> {
        match self {
            ViewMode::Todo => Some(TodoKind::Todo),
            ViewMode::Shopping => Some(TodoKind::Shopping),
            _ => None,
        }
    }

    fn for_kind(kind: TodoKind) -> Self {
        match kind {
            TodoKind::Todo => ViewMode::Todo,
            TodoKind::Shopping => ViewMode::Shopping,
        }
    }
}

/// 画面全体の状態
///
/// 各遷移は新しい状態を返し、元の値は変更しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub mode: ViewMode,
    /// TODOセクションが扱っている種別
    pub todo_mode: TodoKind,
    pub search: SearchState,
    pub expansion: ExpansionState,
    /// 履歴パネルで最初に展開しておく日数
    pub history_open_count: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_OPEN_COUNT)
    }
}

impl ViewState {
    /// 初期状態（ALL表示、TODO）を作る
    pub fn new(history_open_count: usize) -> Self {
        Self {
            mode: ViewMode::All,
            todo_mode: TodoKind::Todo,
            search: SearchState::default(),
            expansion: ExpansionState::reset(),
            history_open_count,
        }
    }

    /// 現在表示対象の種別
    pub fn active_kind(&self) -> TodoKind {
        self.mode.detail_kind().unwrap_or(self.todo_mode)
    }

    /// 表示モードを選択する
    ///
    /// モードが変わった場合は履歴の展開状態を初期化する。
    pub fn select_mode(self, mode: ViewMode) -> Self {
        if mode == self.mode {
            return self;
        }
        let todo_mode = mode.detail_kind().unwrap_or(self.todo_mode);
        Self {
            mode,
            todo_mode,
            expansion: ExpansionState::reset(),
            ..self
        }
    }

    /// 「T」ボタン: 現在のTODOセクションの種別に対応する詳細表示を開く
    pub fn select_todo_section(self) -> Self {
        let mode = ViewMode::for_kind(self.todo_mode);
        self.select_mode(mode)
    }

    /// TODOセクションの見出しで TODO ⇔ 買い物 を切り替える
    ///
    /// 詳細表示中は表示モードも合わせて切り替わる。
    pub fn toggle_todo_mode(self) -> Self {
        let todo_mode = self.todo_mode.toggled();
        let mode = if self.mode.is_detail() {
            ViewMode::for_kind(todo_mode)
        } else {
            self.mode
        };
        Self {
            mode,
            todo_mode,
            expansion: ExpansionState::reset(),
            ..self
        }
    }

    /// 検索欄への入力
    pub fn type_search(self, text: impl Into<String>) -> Self {
        Self {
            search: self.search.typed(text),
            ..self
        }
    }

    /// 検索ボタン: 入力中のキーワードを確定する
    pub fn commit_search(self) -> Self {
        Self {
            search: self.search.committed(),
            ..self
        }
    }

    /// 検索を解除する
    pub fn clear_search(self) -> Self {
        Self {
            search: self.search.cleared(),
            ..self
        }
    }

    /// 履歴の1日分の開閉を切り替える
    ///
    /// 操作した時点で画面に出ていた履歴を基準にする。その後のスナップショットで
    /// 増えた日付は折りたたみ扱いになる。表示中の履歴に無い日付は無視する。
    ///
    /// # 引数
    /// * `date` - 対象日付
    /// * `shown` - 操作時に表示していたTODOセクション
    pub fn toggle_history_date(self, date: &str, shown: &TodoView) -> Self {
        let dates = shown.history_dates();
        if !dates.iter().any(|d| d == date) {
            log::debug!("表示中の履歴に無い日付の開閉を無視しました: {date}");
            return self;
        }
        let expansion = self
            .expansion
            .toggled(date, &dates, self.history_open_count);
        Self { expansion, ..self }
    }

    /// 日記の検索を適用するかどうか（日記モードで確定値がある場合のみ）
    pub fn search_applied(&self) -> bool {
        self.mode == ViewMode::Diary && self.search.is_applied()
    }
}
