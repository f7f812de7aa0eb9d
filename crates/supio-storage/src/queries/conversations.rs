// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use rusqlite::params;
use supio_core::{ConversationStatus, SupioError};

use crate::database::{map_tr_err, Database};
use crate::models::{status_from_sql, Conversation};

fn row_to_conversation(row: &rusqlite::Row) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        organization_id: row.get(2)?,
        contact_session_id: row.get(3)?,
        status: status_from_sql(4, row.get(4)?)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const SELECT_COLUMNS: &str =
    "id, thread_id, organization_id, contact_session_id, status, created_at, updated_at";

/// Insert a new conversation.
pub async fn insert(db: &Database, conversation: &Conversation) -> Result<(), SupioError> {
    let c = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, thread_id, organization_id, contact_session_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    c.id,
                    c.thread_id,
                    c.organization_id,
                    c.contact_session_id,
                    c.status.to_string(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<Conversation>, SupioError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM conversations WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], row_to_conversation) {
                Ok(c) => Ok(Some(c)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by its thread handle.
pub async fn get_by_thread_id(
    db: &Database,
    thread_id: &str,
) -> Result<Option<Conversation>, SupioError> {
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM conversations WHERE thread_id = ?1"
            ))?;
            match stmt.query_row(params![thread_id], row_to_conversation) {
                Ok(c) => Ok(Some(c)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Update a conversation's status.
pub async fn update_status(
    db: &Database,
    id: &str,
    status: ConversationStatus,
) -> Result<(), SupioError> {
    let id = id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET status = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
