use crate::features::auth::UserId;
use crate::features::records::RawRecord;
use crate::features::todos::models::TodoKind;
use crate::shared::errors::{AppError, AppResult};
use rusqlite::{params, Connection, Row};
use serde_json::json;

/// 保存するTODOの内容
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub id: String,
    pub text: String,
    pub kind: TodoKind,
    pub price: f64,
    pub date: String,
    pub created_at_millis: i64,
}

/// TODOを作成する（未完了の状態で保存）
pub fn create(conn: &Connection, user: &UserId, todo: &NewTodo) -> AppResult<()> {
    conn.execute(
        "INSERT INTO todos (id, user_id, text, completed, kind, price, date, created_at)
         VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?7)",
        params![
            todo.id,
            user.as_str(),
            todo.text,
            todo.kind.as_str(),
            todo.price,
            todo.date,
            todo.created_at_millis
        ],
    )?;
    Ok(())
}

/// 完了フラグを取得する
pub fn find_completed(conn: &Connection, user: &UserId, id: &str) -> AppResult<bool> {
    conn.query_row(
        "SELECT completed FROM todos WHERE id = ?1 AND user_id = ?2",
        params![id, user.as_str()],
        |row| row.get::<_, i64>(0),
    )
    .map(|completed| completed != 0)
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::not_found("TODO"),
        _ => AppError::Database(e),
    })
}

/// 完了フラグを更新する
pub fn set_completed(conn: &Connection, user: &UserId, id: &str, completed: bool) -> AppResult<()> {
    let affected = conn.execute(
        "UPDATE todos SET completed = ?1 WHERE id = ?2 AND user_id = ?3",
        params![completed as i64, id, user.as_str()],
    )?;

    if affected == 0 {
        return Err(AppError::not_found("TODO"));
    }
    Ok(())
}

/// TODOを削除する
pub fn delete(conn: &Connection, user: &UserId, id: &str) -> AppResult<()> {
    let affected = conn.execute(
        "DELETE FROM todos WHERE id = ?1 AND user_id = ?2",
        params![id, user.as_str()],
    )?;

    if affected == 0 {
        return Err(AppError::not_found("TODO"));
    }
    Ok(())
}

/// ユーザーのTODOをレコードソースの形式で一覧取得する（新しい順）
pub fn list(conn: &Connection, user: &UserId) -> AppResult<Vec<RawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, completed, kind, price, date, created_at
         FROM todos WHERE user_id = ?1
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
        "completed": row.get::<_, i64>(2)? != 0,
        "kind": row.get::<_, String>(3)?,
        "price": row.get::<_, f64>(4)?,
        "date": row.get::<_, String>(5)?,
        "createdAt": row.get::<_, i64>(6)?,
    });
    Ok(value.as_object().cloned().unwrap_or_default())
}
