// レコードソースの属性マップを型付きレコードへ変換する

use crate::features::diary::models::{DiaryEntry, PhotoRef};
use crate::features::todos::models::{TodoItem, TodoKind};
use crate::shared::utils::{format_hhmm, is_valid_date_key, is_valid_time};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};

/// レコードソースから届く1件分の属性マップ
pub type RawRecord = Map<String, Value>;

/// 文字列属性を取得する（文字列以外はNone）
fn string_field<'a>(raw: &'a RawRecord, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str)
}

/// 数値属性を取得する
///
/// 数値として解釈できる文字列も受け付ける。それ以外はNone。
fn number_field(raw: &RawRecord, key: &str) -> Option<f64> {
    let number = match raw.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// createdAt を解釈する
///
/// # 受け付ける形式
/// - エポックミリ秒の数値
/// - RFC3339文字列
/// - `{ "seconds": .., "nanoseconds": .. }` 形式のタイムスタンプ
///
/// サーバー側で未確定（null）の場合はNone
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Object(obj) => {
            let seconds = obj.get("seconds").and_then(Value::as_i64)?;
            let nanos = obj
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}

/// 日付属性を取得する（妥当な YYYY-MM-DD のみ）
fn date_field(raw: &RawRecord) -> Option<String> {
    string_field(raw, "date")
        .filter(|d| is_valid_date_key(d))
        .map(str::to_string)
}

/// 日記エントリーを取り込む
///
/// id が無いレコードは取り込めないためNone。
/// `time` が無い・不正な場合は createdAt から導出する。
pub fn ingest_entry(raw: &RawRecord, tz: &Tz) -> Option<DiaryEntry> {
    let id = string_field(raw, "id")?.to_string();
    let created_at = raw.get("createdAt").and_then(parse_timestamp);

    let time = string_field(raw, "time")
        .filter(|t| is_valid_time(t))
        .map(str::to_string)
        .or_else(|| created_at.map(|at| format_hhmm(at, tz)));

    let image_url = string_field(raw, "imageUrl").unwrap_or_default();
    let image_path = string_field(raw, "imagePath").unwrap_or_default();
    let photo = (!image_url.is_empty()).then(|| PhotoRef {
        image_url: image_url.to_string(),
        image_path: image_path.to_string(),
    });

    Some(DiaryEntry {
        id,
        text: string_field(raw, "text").unwrap_or_default().to_string(),
        date: date_field(raw),
        time,
        created_at,
        photo,
    })
}

/// TODO / 買い物アイテムを取り込む
///
/// id が無い、または未知の kind を持つレコードはNone。
pub fn ingest_todo(raw: &RawRecord) -> Option<TodoItem> {
    let id = string_field(raw, "id")?.to_string();

    let kind = match raw.get("kind") {
        None | Some(Value::Null) => TodoKind::Todo,
        Some(Value::String(s)) if s.is_empty() => TodoKind::Todo,
        Some(Value::String(s)) => TodoKind::parse(s)?,
        Some(_) => return None,
    };

    let price = match kind {
        TodoKind::Todo => 0.0,
        TodoKind::Shopping => number_field(raw, "price")
            .filter(|p| *p >= 0.0)
            .unwrap_or(0.0),
    };

    Some(TodoItem {
        id,
        text: string_field(raw, "text").unwrap_or_default().to_string(),
        completed: raw
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        kind,
        price,
        date: date_field(raw),
        created_at: raw.get("createdAt").and_then(parse_timestamp),
    })
}

/// 日記スナップショットを一括で取り込む（順序は維持）
pub fn ingest_entries(raws: &[RawRecord], tz: &Tz) -> Vec<DiaryEntry> {
    raws.iter()
        .filter_map(|raw| {
            let entry = ingest_entry(raw, tz);
            if entry.is_none() {
                log::debug!("取り込めない日記レコードを除外しました: {raw:?}");
            }
            entry
        })
        .collect()
}

/// TODOスナップショットを一括で取り込む（順序は維持）
pub fn ingest_todos(raws: &[RawRecord]) -> Vec<TodoItem> {
    raws.iter()
        .filter_map(|raw| {
            let item = ingest_todo(raw);
            if item.is_none() {
                log::debug!("取り込めないTODOレコードを除外しました: {raw:?}");
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        assert_eq!(
            parse_timestamp(&json!(expected.timestamp_millis())),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp(&json!("2024-01-02T12:04:05+09:00")),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp(&json!({"seconds": expected.timestamp(), "nanoseconds": 0})),
            Some(expected)
        );
        assert_eq!(parse_timestamp(&Value::Null), None);
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
    }

    #[test]
    fn test_ingest_entry_derives_time() {
        let entry = ingest_entry(
            &raw(json!({
                "id": "e1",
                "text": "hello",
                "date": "2024-01-02",
                "createdAt": "2024-01-02T09:15:00Z",
            })),
            &chrono_tz::Asia::Seoul,
        )
        .unwrap();

        assert_eq!(entry.time.as_deref(), Some("18:15"));
        assert_eq!(entry.date.as_deref(), Some("2024-01-02"));
        assert!(entry.photo.is_none());
    }

    #[test]
    fn test_ingest_entry_keeps_explicit_time_and_photo() {
        let entry = ingest_entry(
            &raw(json!({
                "id": "e2",
                "text": "photo day",
                "date": "2024-01-02",
                "time": "07:30",
                "createdAt": "2024-01-02T09:15:00Z",
                "imageUrl": "https://example.com/a.jpg",
                "imagePath": "users/u1/entries/1.jpg",
            })),
            &Tz::UTC,
        )
        .unwrap();

        assert_eq!(entry.time.as_deref(), Some("07:30"));
        let photo = entry.photo.unwrap();
        assert_eq!(photo.image_url, "https://example.com/a.jpg");
        assert_eq!(photo.image_path, "users/u1/entries/1.jpg");
    }

    #[test]
    fn test_ingest_entry_without_time_source() {
        let entry = ingest_entry(
            &raw(json!({"id": "e3", "text": "pending", "date": "bad", "createdAt": null})),
            &Tz::UTC,
        )
        .unwrap();
        assert_eq!(entry.time, None);
        assert_eq!(entry.date, None);
    }

    #[test]
    fn test_ingest_todo_defaults() {
        let item = ingest_todo(&raw(json!({"id": "t1", "text": "洗濯", "date": "2024-01-01"})))
            .unwrap();
        assert_eq!(item.kind, TodoKind::Todo);
        assert!(!item.completed);
        assert_eq!(item.price, 0.0);
    }

    #[test]
    fn test_ingest_todo_price_rules() {
        let shopping = |price: Value| {
            ingest_todo(&raw(json!({
                "id": "t", "text": "牛乳", "kind": "shopping", "date": "2024-01-01", "price": price
            })))
            .unwrap()
            .price
        };
        assert_eq!(shopping(json!(1000)), 1000.0);
        assert_eq!(shopping(json!("2500")), 2500.0);
        assert_eq!(shopping(json!("abc")), 0.0);
        assert_eq!(shopping(json!(-3)), 0.0);
        assert_eq!(shopping(Value::Null), 0.0);

        // TODO の価格は常に 0
        let todo = ingest_todo(&raw(json!({
            "id": "t", "text": "掃除", "kind": "todo", "price": 500
        })))
        .unwrap();
        assert_eq!(todo.price, 0.0);
    }

    #[test]
    fn test_ingest_skips_unusable_records() {
        let raws = vec![
            raw(json!({"text": "no id"})),
            raw(json!({"id": "t1", "text": "unknown kind", "kind": "wishlist"})),
            raw(json!({"id": "t2", "text": "ok", "date": "2024-01-01"})),
        ];
        let items = ingest_todos(&raws);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "t2");
    }
}
