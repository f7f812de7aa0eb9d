// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin linkage rows, keyed upsert on (organization_id, service).

use rusqlite::params;
use supio_core::SupioError;

use crate::database::{map_tr_err, Database};
use crate::models::Plugin;

/// Insert or update the plugin row for (organization, service).
///
/// The UNIQUE(organization_id, service) constraint backs the upsert; no
/// scan-then-write race is possible.
pub async fn upsert(
    db: &Database,
    organization_id: &str,
    service: &str,
    secret_name: &str,
) -> Result<(), SupioError> {
    let organization_id = organization_id.to_string();
    let service = service.to_string();
    let secret_name = secret_name.to_string();
    let id = uuid::Uuid::new_v4().to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO plugins (id, organization_id, service, secret_name)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(organization_id, service) DO UPDATE SET
                   secret_name = excluded.secret_name,
                   updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![id, organization_id, service, secret_name],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get the plugin row for (organization, service).
pub async fn get(
    db: &Database,
    organization_id: &str,
    service: &str,
) -> Result<Option<Plugin>, SupioError> {
    let organization_id = organization_id.to_string();
    let service = service.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, organization_id, service, secret_name, created_at, updated_at
                 FROM plugins WHERE organization_id = ?1 AND service = ?2",
            )?;
            let result = stmt.query_row(params![organization_id, service], |row| {
                Ok(Plugin {
                    id: row.get(0)?,
                    organization_id: row.get(1)?,
                    service: row.get(2)?,
                    secret_name: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            });
            match result {
                Ok(plugin) => Ok(Some(plugin)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Delete the plugin row for (organization, service).
///
/// Returns whether a row was removed. Never touches the external secret.
pub async fn remove(
    db: &Database,
    organization_id: &str,
    service: &str,
) -> Result<bool, SupioError> {
    let organization_id = organization_id.to_string();
    let service = service.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM plugins WHERE organization_id = ?1 AND service = ?2",
                params![organization_id, service],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
