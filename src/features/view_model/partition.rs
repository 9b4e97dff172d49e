use crate::features::todos::models::{TodoItem, TodoKind};
use crate::shared::utils::is_valid_date_key;
use serde::Serialize;
use std::collections::BTreeMap;

/// 日付ごとに分けたTODOリスト
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatePartition {
    /// 日付 → その日のアイテム（元の並び順を維持）
    pub by_date: BTreeMap<String, Vec<TodoItem>>,
    /// 全日付（降順）
    pub sorted_dates_desc: Vec<String>,
    /// 今日のアイテム
    pub today: Vec<TodoItem>,
    /// 今日以外の日付（降順）
    pub history: Vec<String>,
}

impl DatePartition {
    /// 指定日のアイテム（無ければ空）
    pub fn items_on(&self, date: &str) -> &[TodoItem] {
        self.by_date.get(date).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// 種別で絞り込み、日付ごとにグループ化する
///
/// # 引数
/// * `items` - TODOコレクション全体
/// * `active_kind` - 対象の種別
/// * `today_key` - 今日の日付キー（YYYY-MM-DD）
///
/// 日付が無い・不正なアイテムは黙って除外する。
/// YYYY-MM-DD はゼロ埋めなので辞書順の降順がそのまま新しい順になる。
pub fn partition_by_date_and_kind(
    items: &[TodoItem],
    active_kind: TodoKind,
    today_key: &str,
) -> DatePartition {
    let mut by_date: BTreeMap<String, Vec<TodoItem>> = BTreeMap::new();
    let mut dropped = 0usize;

    for item in items.iter().filter(|item| item.kind == active_kind) {
        match item.date.as_deref().filter(|d| is_valid_date_key(d)) {
            Some(date) => by_date.entry(date.to_string()).or_default().push(item.clone()),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!("日付が不正なアイテムを{dropped}件除外しました（kind={}）", active_kind.as_str());
    }

    let sorted_dates_desc: Vec<String> = by_date.keys().rev().cloned().collect();
    let today = by_date.get(today_key).cloned().unwrap_or_default();
    let history = sorted_dates_desc
        .iter()
        .filter(|d| d.as_str() != today_key)
        .cloned()
        .collect();

    DatePartition {
        by_date,
        sorted_dates_desc,
        today,
        history,
    }
}

/// 価格の合計を計算する
///
/// 浮動小数点の加算結果が並び順に左右されないよう、値を整列してから足し合わせる。
pub fn compute_daily_total(items: &[TodoItem]) -> f64 {
    let mut prices: Vec<f64> = items
        .iter()
        .map(|item| if item.price.is_finite() { item.price } else { 0.0 })
        .collect();
    prices.sort_by(f64::total_cmp);
    prices.into_iter().sum()
}
