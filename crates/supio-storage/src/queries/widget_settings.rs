// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Widget settings rows, keyed upsert by organization.

use rusqlite::params;
use supio_core::SupioError;

use crate::database::{map_tr_err, Database};
use crate::models::WidgetSettings;

/// Insert or update an organization's widget settings.
pub async fn upsert(db: &Database, settings: &WidgetSettings) -> Result<(), SupioError> {
    let s = settings.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO widget_settings
                   (organization_id, greet_message, suggestion_1, suggestion_2, suggestion_3,
                    voice_assistant_id, voice_phone_number)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(organization_id) DO UPDATE SET
                   greet_message = excluded.greet_message,
                   suggestion_1 = excluded.suggestion_1,
                   suggestion_2 = excluded.suggestion_2,
                   suggestion_3 = excluded.suggestion_3,
                   voice_assistant_id = excluded.voice_assistant_id,
                   voice_phone_number = excluded.voice_phone_number,
                   updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    s.organization_id,
                    s.greet_message,
                    s.suggestion_1,
                    s.suggestion_2,
                    s.suggestion_3,
                    s.voice_assistant_id,
                    s.voice_phone_number,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get an organization's widget settings.
pub async fn get(
    db: &Database,
    organization_id: &str,
) -> Result<Option<WidgetSettings>, SupioError> {
    let organization_id = organization_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT organization_id, greet_message, suggestion_1, suggestion_2, suggestion_3,
                        voice_assistant_id, voice_phone_number
                 FROM widget_settings WHERE organization_id = ?1",
            )?;
            let result = stmt.query_row(params![organization_id], |row| {
                Ok(WidgetSettings {
                    organization_id: row.get(0)?,
                    greet_message: row.get(1)?,
                    suggestion_1: row.get(2)?,
                    suggestion_2: row.get(3)?,
                    suggestion_3: row.get(4)?,
                    voice_assistant_id: row.get(5)?,
                    voice_phone_number: row.get(6)?,
                })
            });
            match result {
                Ok(settings) => Ok(Some(settings)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
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

    fn make_settings(org: &str, greet: &str) -> WidgetSettings {
        WidgetSettings {
            organization_id: org.to_string(),
            greet_message: greet.to_string(),
            suggestion_1: Some("What plans do you offer?".to_string()),
            suggestion_2: None,
            suggestion_3: None,
            voice_assistant_id: None,
            voice_phone_number: Some("+15550100".to_string()),
        }
    }

    #[tokio::test]
    async fn upsert_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        upsert(&db, &make_settings("org_1", "Hello!")).await.unwrap();

        let got = get(&db, "org_1").await.unwrap().unwrap();
        assert_eq!(got.greet_message, "Hello!");
        assert_eq!(got.suggestion_1.as_deref(), Some("What plans do you offer?"));
        assert_eq!(got.voice_phone_number.as_deref(), Some("+15550100"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn second_upsert_replaces_fields() {
        let (db, _dir) = setup_db().await;
        upsert(&db, &make_settings("org_1", "Hello!")).await.unwrap();

        let mut updated = make_settings("org_1", "Welcome back!");
        updated.suggestion_1 = None;
        upsert(&db, &updated).await.unwrap();

        let got = get(&db, "org_1").await.unwrap().unwrap();
        assert_eq!(got.greet_message, "Welcome back!");
        assert!(got.suggestion_1.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn settings_missing_for_unknown_org() {
        let (db, _dir) = setup_db().await;
        assert!(get(&db, "org_none").await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
