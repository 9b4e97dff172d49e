use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 日付 → 展開しているかどうか
pub type ExpansionMap = BTreeMap<String, bool>;

/// 履歴アコーディオンの初期状態を作る
///
/// # 引数
/// * `dates` - 履歴の日付（降順）
/// * `open_count` - 先頭から展開しておく日数
pub fn default_expansion_state(dates: &[String], open_count: usize) -> ExpansionMap {
    dates
        .iter()
        .enumerate()
        .map(|(i, date)| (date.clone(), i < open_count))
        .collect()
}

/// 履歴アコーディオンの展開状態
///
/// `open` が None の間は初期状態（先頭 n 日を展開）で表示する。
/// 表示モードや種別が変わると None に戻る。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionState {
    open: Option<ExpansionMap>,
}

impl ExpansionState {
    /// 初期状態に戻す
    pub fn reset() -> Self {
        Self::default()
    }

    /// まだユーザー操作が無い（初期状態のまま）かどうか
    pub fn is_default(&self) -> bool {
        self.open.is_none()
    }

    /// 指定日付が展開されているか
    ///
    /// 初期状態のときは `dates` の先頭 `open_count` 件を展開扱いにする。
    /// 操作後に増えた日付は折りたたみ扱い。
    pub fn is_open(&self, date: &str, dates: &[String], open_count: usize) -> bool {
        match &self.open {
            Some(open) => open.get(date).copied().unwrap_or(false),
            None => dates
                .iter()
                .take(open_count)
                .any(|d| d.as_str() == date),
        }
    }

    /// 1日分の開閉を切り替える
    pub fn toggled(self, date: &str, dates: &[String], open_count: usize) -> Self {
        let currently_open = self.is_open(date, dates, open_count);
        let mut open = self
            .open
            .unwrap_or_else(|| default_expansion_state(dates, open_count));
        open.insert(date.to_string(), !currently_open);
        Self { open: Some(open) }
    }
}
