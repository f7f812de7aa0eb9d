// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact session CRUD operations.

use rusqlite::params;
use supio_core::SupioError;

use crate::database::{map_tr_err, Database};
use crate::models::ContactSession;

/// Insert a new contact session.
pub async fn create(db: &Database, session: &ContactSession) -> Result<(), SupioError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO contact_sessions (id, name, email, organization_id, expires_at, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    session.id,
                    session.name,
                    session.email,
                    session.organization_id,
                    session.expires_at,
                    session.metadata,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a contact session by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<ContactSession>, SupioError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, organization_id, expires_at, metadata, created_at
                 FROM contact_sessions WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                Ok(ContactSession {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    organization_id: row.get(3)?,
                    expires_at: row.get(4)?,
                    metadata: row.get(5)?,
                    created_at: row.get(6)?,
                })
            });
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Extend a session's expiry (session refresh).
pub async fn update_expires_at(
    db: &Database,
    id: &str,
    expires_at: i64,
) -> Result<(), SupioError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE contact_sessions SET expires_at = ?1 WHERE id = ?2",
                params![expires_at, id],
            )?;
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

    fn make_session(id: &str, expires_at: i64) -> ContactSession {
        ContactSession {
            id: id.to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            organization_id: "org_1".to_string(),
            expires_at,
            metadata: Some(r#"{"timezone":"Europe/London"}"#.to_string()),
            created_at: String::new(),
        }
    }

    #[tokio::test]
    async fn create_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        create(&db, &make_session("cs-1", 1_000)).await.unwrap();

        let got = get(&db, "cs-1").await.unwrap().unwrap();
        assert_eq!(got.name, "Ada");
        assert_eq!(got.organization_id, "org_1");
        assert_eq!(got.expires_at, 1_000);
        assert_eq!(
            got.metadata.as_deref(),
            Some(r#"{"timezone":"Europe/London"}"#)
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get(&db, "nope").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_expires_at_extends_session() {
        let (db, _dir) = setup_db().await;
        create(&db, &make_session("cs-2", 1_000)).await.unwrap();

        update_expires_at(&db, "cs-2", 99_999).await.unwrap();
        let got = get(&db, "cs-2").await.unwrap().unwrap();
        assert_eq!(got.expires_at, 99_999);

        db.close().await.unwrap();
    }
}
