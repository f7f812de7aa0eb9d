// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billing subscription rows, keyed upsert by organization.
//!
//! The write side is fed by the billing webhook; the read side gates agent
//! invocation in the message router.

use rusqlite::params;
use supio_core::SupioError;

use crate::database::{map_tr_err, Database};
use crate::models::Subscription;

/// Insert or update the subscription row for an organization.
pub async fn upsert(db: &Database, organization_id: &str, status: &str) -> Result<(), SupioError> {
    let organization_id = organization_id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO subscriptions (organization_id, status)
                 VALUES (?1, ?2)
                 ON CONFLICT(organization_id) DO UPDATE SET
                   status = excluded.status,
                   updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![organization_id, status],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get the subscription row for an organization.
pub async fn get(db: &Database, organization_id: &str) -> Result<Option<Subscription>, SupioError> {
    let organization_id = organization_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT organization_id, status, updated_at
                 FROM subscriptions WHERE organization_id = ?1",
            )?;
            let result = stmt.query_row(params![organization_id], |row| {
                Ok(Subscription {
                    organization_id: row.get(0)?,
                    status: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            });
            match result {
                Ok(sub) => Ok(Some(sub)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}
