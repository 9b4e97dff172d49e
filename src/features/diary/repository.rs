use crate::features::auth::UserId;
use crate::features::diary::models::PhotoRef;
use crate::features::records::RawRecord;
use crate::shared::errors::{AppError, AppResult};
use rusqlite::{params, Connection, Row};
use serde_json::json;

/// 保存する日記エントリーの内容
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub id: String,
    pub text: String,
    pub date: String,
    pub time: String,
    pub created_at_millis: i64,
    pub photo: Option<PhotoRef>,
}

/// 日記エントリーを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user` - 所有ユーザー
/// * `entry` - 保存内容
pub fn create(conn: &Connection, user: &UserId, entry: &NewEntry) -> AppResult<()> {
    let (image_url, image_path) = match &entry.photo {
        Some(photo) => (photo.image_url.as_str(), photo.image_path.as_str()),
        None => ("", ""),
    };

    conn.execute(
        "INSERT INTO entries (id, user_id, text, date, time, created_at, image_url, image_path)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id,
            user.as_str(),
            entry.text,
            entry.date,
            entry.time,
            entry.created_at_millis,
            image_url,
            image_path
        ],
    )?;
    Ok(())
}

/// 現在の写真参照を取得する
///
/// # 戻り値
/// 写真が無い場合はNone、エントリーが無い場合はNotFound
pub fn find_photo(conn: &Connection, user: &UserId, id: &str) -> AppResult<Option<PhotoRef>> {
    conn.query_row(
        "SELECT image_url, image_path FROM entries WHERE id = ?1 AND user_id = ?2",
        params![id, user.as_str()],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
    )
    .map(|(image_url, image_path)| {
        (!image_url.is_empty()).then_some(PhotoRef {
            image_url,
            image_path,
        })
    })
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::not_found("日記"),
        _ => AppError::Database(e),
    })
}

/// 本文と写真参照を更新する
///
/// URLとパスは常に組で書き換える。
pub fn update(
    conn: &Connection,
    user: &UserId,
    id: &str,
    text: &str,
    photo: Option<&PhotoRef>,
) -> AppResult<()> {
    let (image_url, image_path) = match photo {
        Some(photo) => (photo.image_url.as_str(), photo.image_path.as_str()),
        None => ("", ""),
    };

    let affected = conn.execute(
        "UPDATE entries SET text = ?1, image_url = ?2, image_path = ?3
         WHERE id = ?4 AND user_id = ?5",
        params![text, image_url, image_path, id, user.as_str()],
    )?;

    if affected == 0 {
        return Err(AppError::not_found("日記"));
    }
    Ok(())
}

/// 日記エントリーを削除する
pub fn delete(conn: &Connection, user: &UserId, id: &str) -> AppResult<()> {
    let affected = conn.execute(
        "DELETE FROM entries WHERE id = ?1 AND user_id = ?2",
        params![id, user.as_str()],
    )?;

    if affected == 0 {
        return Err(AppError::not_found("日記"));
    }
    Ok(())
}

/// ユーザーの日記をレコードソースの形式で一覧取得する（新しい順）
pub fn list(conn: &Connection, user: &UserId) -> AppResult<Vec<RawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, date, time, created_at, image_url, image_path
         FROM entries WHERE user_id = ?1
         ORDER BY created_at DESC, seq DESC",
    )?;

    let records = stmt.query_map(params![user.as_str()], row_to_record)?;
    records
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::Database)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    let value = json!({
        "id": row.get::<_, String>(0)?,
        "text": row.get::<_, String>(1)?,
        "date": row.get::<_, String>(2)?,
        "time": row.get::<_, Option<String>>(3)?,
        "createdAt": row.get::<_, i64>(4)?,
        "imageUrl": row.get::<_, String>(5)?,
        "imagePath": row.get::<_, String>(6)?,
    });
    Ok(value.as_object().cloned().unwrap_or_default())
}
