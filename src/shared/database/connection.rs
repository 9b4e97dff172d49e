use crate::shared::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;

/// ローカルレコードストアのデータベースを開き、テーブルを用意する
///
/// # 引数
/// * `database_path` - データベースファイルのパス
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
pub fn initialize_database(database_path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(database_path)?;
    create_tables(&conn)?;

    log::info!("データベースを初期化しました: {database_path:?}");
    Ok(conn)
}

/// メモリ上のデータベースを開く（テスト・一時利用向け）
pub fn initialize_in_memory_database() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

/// データベーステーブルを作成する
///
/// レコードソースのコレクション構成（ユーザーごとの entries / todos）に合わせる。
/// `seq` は同一ミリ秒に作成されたレコードの並び順を決めるためだけに使う。
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS entries (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL,
            text TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT,
            created_at INTEGER NOT NULL,
            image_url TEXT NOT NULL DEFAULT '',
            image_path TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_entries_user_created
            ON entries(user_id, created_at DESC);

        CREATE TABLE IF NOT EXISTS todos (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL,
            text TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            kind TEXT NOT NULL CHECK(kind IN ('todo', 'shopping')),
            price REAL NOT NULL DEFAULT 0 CHECK(price >= 0),
            date TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_todos_user_created
            ON todos(user_id, created_at DESC);",
    )?;

    log::debug!("テーブルを確認しました: entries, todos");
    Ok(())
}
