// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message operations over threads.
//!
//! Page cursors are the messages table rowid, which is monotonic in
//! insertion order, so paging is stable under concurrent appends.

use rusqlite::params;
use supio_core::SupioError;

use crate::database::{map_tr_err, Database};
use crate::models::{MessagePage, StoredMessage};

/// Append a message to a thread.
pub async fn insert(db: &Database, message: &StoredMessage) -> Result<(), SupioError> {
    let m = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, thread_id, role, content) VALUES (?1, ?2, ?3, ?4)",
                params![m.id, m.thread_id, m.role, m.content],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// One page of a thread's messages in insertion order.
///
/// `cursor` is the rowid of the last message of the previous page;
/// `None` starts from the beginning.
pub async fn list_page(
    db: &Database,
    thread_id: &str,
    cursor: Option<i64>,
    page_size: usize,
) -> Result<MessagePage, SupioError> {
    let thread_id = thread_id.to_string();
    let after = cursor.unwrap_or(0);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT rowid, id, thread_id, role, content, created_at
                 FROM messages
                 WHERE thread_id = ?1 AND rowid > ?2
                 ORDER BY rowid ASC
                 LIMIT ?3",
            )?;
            // Fetch one extra row to learn whether more pages follow.
            let mut rows: Vec<(i64, StoredMessage)> = stmt
                .query_map(params![thread_id, after, (page_size + 1) as i64], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        StoredMessage {
                            id: row.get(1)?,
                            thread_id: row.get(2)?,
                            role: row.get(3)?,
                            content: row.get(4)?,
                            created_at: row.get(5)?,
                        },
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let is_done = rows.len() <= page_size;
            rows.truncate(page_size);
            let next_cursor = rows.last().map(|(rowid, _)| *rowid);
            Ok(MessagePage {
                page: rows.into_iter().map(|(_, m)| m).collect(),
                is_done,
                next_cursor,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// The most recent `limit` messages of a thread, oldest first.
pub async fn list_recent(
    db: &Database,
    thread_id: &str,
    limit: usize,
) -> Result<Vec<StoredMessage>, SupioError> {
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, thread_id, role, content, created_at
                 FROM messages WHERE thread_id = ?1
                 ORDER BY rowid DESC LIMIT ?2",
            )?;
            let mut messages = stmt
                .query_map(params![thread_id, limit as i64], |row| {
                    Ok(StoredMessage {
                        id: row.get(0)?,
                        thread_id: row.get(1)?,
                        role: row.get(2)?,
                        content: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}
