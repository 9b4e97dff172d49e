use crate::features::diary::models::DiaryEntry;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// 検索キーワードの状態
///
/// 入力欄の値（`live`）と、検索ボタンで確定した値（`committed`）を分けて持つ。
/// 絞り込みは確定値だけを使う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub live: String,
    pub committed: String,
}

impl SearchState {
    /// 入力中の値を更新する（確定値は変わらない）
    pub fn typed(self, text: impl Into<String>) -> Self {
        Self {
            live: text.into(),
            ..self
        }
    }

    /// 入力中の値を前後の空白を除いて確定する
    pub fn committed(self) -> Self {
        let committed = self.live.trim().to_string();
        Self { committed, ..self }
    }

    /// 入力値・確定値の両方をクリアする
    pub fn cleared(self) -> Self {
        Self::default()
    }

    /// 検索が適用されているかどうか
    pub fn is_applied(&self) -> bool {
        !self.committed.trim().is_empty()
    }
}

/// 強調表示用に分割したテキストの断片
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: false,
        }
    }

    fn hit(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: true,
        }
    }
}

/// 大文字小文字を区別せずに1文字を比較する
fn same_char_ignoring_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// `haystack` の先頭がキーワードに一致する場合、一致したバイト長を返す
fn match_len_at(haystack: &str, needle: &[char]) -> Option<usize> {
    let mut chars = haystack.char_indices();
    for &expected in needle {
        let (_, actual) = chars.next()?;
        if !same_char_ignoring_case(actual, expected) {
            return None;
        }
    }
    Some(chars.next().map_or(haystack.len(), |(end, _)| end))
}

/// `from` 以降で最初にキーワードが現れる範囲（バイト位置）
fn find_from(text: &str, needle: &[char], from: usize) -> Option<Range<usize>> {
    text[from..].char_indices().find_map(|(offset, _)| {
        let start = from + offset;
        match_len_at(&text[start..], needle).map(|len| start..start + len)
    })
}

/// 本文にキーワードを含むエントリーだけを残す
///
/// 大文字小文字は区別しない。キーワードが空（空白のみ）の場合は入力をそのまま返す。
pub fn filter_by_keyword(entries: &[DiaryEntry], keyword: &str) -> Vec<DiaryEntry> {
    let needle: Vec<char> = keyword.trim().chars().collect();
    if needle.is_empty() {
        return entries.to_vec();
    }

    entries
        .iter()
        .filter(|entry| find_from(&entry.text, &needle, 0).is_some())
        .cloned()
        .collect()
}

/// 一致部分とそれ以外に本文を分割する
///
/// 元の大文字小文字はそのまま残す。本文が空の場合を除き、空の断片は含めない。
/// キーワードが空の場合は本文全体を一つの非一致断片として返す。
pub fn highlight_matches(text: &str, keyword: &str) -> Vec<Segment> {
    let needle: Vec<char> = keyword.trim().chars().collect();
    if needle.is_empty() {
        return vec![Segment::plain(text)];
    }

    let mut segments = Vec::new();
    let mut cursor = 0;
    while let Some(found) = find_from(text, &needle, cursor) {
        if found.start > cursor {
            segments.push(Segment::plain(&text[cursor..found.start]));
        }
        segments.push(Segment::hit(&text[found.clone()]));
        cursor = found.end;
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[cursor..]));
    }

    segments
}
