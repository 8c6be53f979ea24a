use anyhow::{Error, Result};
use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

pub async fn async_db(db_path: &str) -> Result<Connection, Error> {
    let db = Connection::open(db_path).await?;
    Ok(db)
}

/// Create the client store schema. Safe to call on every start.
pub fn initialize_db(conn: &mut SyncConnection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        BEGIN;
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        -- At most one pending share-sheet image
        CREATE TABLE IF NOT EXISTS shared_image (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            filename TEXT NOT NULL,
            media_type TEXT NOT NULL,
            content BLOB NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        COMMIT;
        "#,
    )
}

/// Open the db at `db_path` and make sure the schema exists
pub async fn open_client_db(db_path: &str) -> Result<Connection, Error> {
    let db = async_db(db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}
