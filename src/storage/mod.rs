//! Durable client-local state: the install prompt dismissal and the
//! image handed over by the share sheet

use anyhow::{Error, Result};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::intake::SelectedImage;

const INSTALL_PROMPT_DISMISSED_KEY: &str = "pwa-dismissed";

pub async fn install_prompt_dismissed(db: &Connection) -> Result<bool, Error> {
    let value: Option<String> = db
        .call(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv WHERE key = ?1",
                    [INSTALL_PROMPT_DISMISSED_KEY],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await?;
    Ok(value.as_deref() == Some("true"))
}

pub async fn dismiss_install_prompt(db: &Connection) -> Result<(), Error> {
    db.call(|conn| {
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, 'true')
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [INSTALL_PROMPT_DISMISSED_KEY],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Store the most recently shared image, replacing any earlier one
pub async fn put_shared_image(db: &Connection, image: &SelectedImage) -> Result<(), Error> {
    let image = image.clone();
    db.call(move |conn| {
        conn.execute(
            "REPLACE INTO shared_image (id, filename, media_type, content) VALUES (1, ?1, ?2, ?3)",
            tokio_rusqlite::params![image.filename, image.media_type, image.content],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Read and delete the pending shared image in one transaction
pub async fn take_shared_image(db: &Connection) -> Result<Option<SelectedImage>, Error> {
    let image = db
        .call(|conn| {
            let tx = conn.transaction()?;
            let row = tx
                .query_row(
                    "SELECT filename, media_type, content FROM shared_image WHERE id = 1",
                    [],
                    |row| {
                        let filename: String = row.get(0)?;
                        let media_type: String = row.get(1)?;
                        let content: Vec<u8> = row.get(2)?;
                        Ok(SelectedImage::new(content, &media_type, &filename))
                    },
                )
                .optional()?;
            tx.execute("DELETE FROM shared_image", [])?;
            tx.commit()?;
            Ok(row)
        })
        .await?;
    Ok(image)
}
