// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe background task queue.
//!
//! Mutations that need external I/O (e.g. the secret upsert) enqueue an
//! idempotent task here; a worker drains the queue, performs the I/O, then
//! writes back through a second transactional write.

use rusqlite::params;
use supio_core::SupioError;

use crate::database::{map_tr_err, Database};
use crate::models::Task;

/// Enqueue a new task. Returns the auto-generated task ID.
pub async fn enqueue(db: &Database, queue_name: &str, payload: &str) -> Result<i64, SupioError> {
    let queue_name = queue_name.to_string();
    let payload = payload.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tasks (queue_name, payload) VALUES (?1, ?2)",
                params![queue_name, payload],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Dequeue the next pending task from the named queue.
///
/// Atomically selects the oldest pending task and marks it as "processing"
/// with a 5-minute lock timeout. Returns `None` if the queue is empty.
pub async fn dequeue(db: &Database, queue_name: &str) -> Result<Option<Task>, SupioError> {
    let queue_name = queue_name.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let result = {
                let mut stmt = tx.prepare(
                    "SELECT id, queue_name, payload, status, attempts, max_attempts,
                            created_at, updated_at, locked_until
                     FROM tasks
                     WHERE queue_name = ?1 AND status = 'pending'
                     ORDER BY id ASC
                     LIMIT 1",
                )?;
                stmt.query_row(params![queue_name], |row| {
                    Ok(Task {
                        id: row.get(0)?,
                        queue_name: row.get(1)?,
                        payload: row.get(2)?,
                        status: row.get(3)?,
                        attempts: row.get(4)?,
                        max_attempts: row.get(5)?,
                        created_at: row.get(6)?,
                        updated_at: row.get(7)?,
                        locked_until: row.get(8)?,
                    })
                })
            };

            match result {
                Ok(task) => {
                    tx.execute(
                        "UPDATE tasks SET status = 'processing',
                         locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '+5 minutes'),
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1",
                        params![task.id],
                    )?;
                    tx.commit()?;

                    Ok(Some(Task {
                        status: "processing".to_string(),
                        ..task
                    }))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Acknowledge successful processing: marks the task as "completed".
pub async fn ack(db: &Database, id: i64) -> Result<(), SupioError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE tasks SET status = 'completed',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Mark a task as failed.
///
/// Increments attempts. If attempts >= max_attempts, sets status to "failed".
/// Otherwise resets to "pending" for retry and clears the lock.
pub async fn fail(db: &Database, id: i64) -> Result<(), SupioError> {
    db.connection()
        .call(move |conn| {
            let (attempts, max_attempts): (i32, i32) = conn.query_row(
                "SELECT attempts, max_attempts FROM tasks WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let new_attempts = attempts + 1;
            if new_attempts >= max_attempts {
                conn.execute(
                    "UPDATE tasks SET status = 'failed', attempts = ?1,
                     locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?2",
                    params![new_attempts, id],
                )?;
            } else {
                conn.execute(
                    "UPDATE tasks SET status = 'pending', attempts = ?1,
                     locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?2",
                    params![new_attempts, id],
                )?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn enqueue_and_dequeue_lifecycle() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "secret-upsert", r#"{"org":"org_1"}"#)
            .await
            .unwrap();
        assert!(id > 0);

        let task = dequeue(&db, "secret-upsert").await.unwrap().unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.status, "processing");
        assert_eq!(task.payload, r#"{"org":"org_1"}"#);

        // Nothing else pending.
        assert!(dequeue(&db, "secret-upsert").await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ack_marks_completed() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "q", "payload").await.unwrap();
        let _task = dequeue(&db, "q").await.unwrap().unwrap();
        ack(&db, id).await.unwrap();

        let status: String = db
            .connection()
            .call(move |conn| {
                let s = conn.query_row(
                    "SELECT status FROM tasks WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )?;
                Ok::<String, rusqlite::Error>(s)
            })
            .await
            .unwrap();
        assert_eq!(status, "completed");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fail_retries_until_max_attempts() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "q", "payload").await.unwrap();

        // max_attempts defaults to 3: two failures keep it pending.
        for expected_attempts in 1..=2 {
            let _task = dequeue(&db, "q").await.unwrap().unwrap();
            fail(&db, id).await.unwrap();

            let (status, attempts): (String, i32) = db
                .connection()
                .call(move |conn| {
                    let pair = conn.query_row(
                        "SELECT status, attempts FROM tasks WHERE id = ?1",
                        params![id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )?;
                    Ok::<(String, i32), rusqlite::Error>(pair)
                })
                .await
                .unwrap();
            assert_eq!(status, "pending");
            assert_eq!(attempts, expected_attempts);
        }

        // Third failure is terminal.
        let _task = dequeue(&db, "q").await.unwrap().unwrap();
        fail(&db, id).await.unwrap();

        let status: String = db
            .connection()
            .call(move |conn| {
                let s = conn.query_row(
                    "SELECT status FROM tasks WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )?;
                Ok::<String, rusqlite::Error>(s)
            })
            .await
            .unwrap();
        assert_eq!(status, "failed");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn dequeue_empty_queue_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(dequeue(&db, "nonexistent").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn queues_are_independent() {
        let (db, _dir) = setup_db().await;
        enqueue(&db, "a", "1").await.unwrap();
        enqueue(&db, "b", "2").await.unwrap();

        let task = dequeue(&db, "b").await.unwrap().unwrap();
        assert_eq!(task.payload, "2");
        let task = dequeue(&db, "a").await.unwrap().unwrap();
        assert_eq!(task.payload, "1");

        db.close().await.unwrap();
    }
}
