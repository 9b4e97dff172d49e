/// レコード取り込みモジュール
///
/// レコードソースは属性マップの形でレコードを届ける。欠けている属性や
/// 不正な値の既定値解決はここで一度だけ行い、以降の処理は型付きの
/// `DiaryEntry` / `TodoItem` だけを扱う。
pub mod ingest;

pub use ingest::{
    ingest_entries, ingest_entry, ingest_todo, ingest_todos, parse_timestamp, RawRecord,
};
