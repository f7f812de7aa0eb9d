// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Namespace-partitioned, content-addressed knowledge store.
//!
//! Each organization owns exactly one namespace. Dedup rides on the
//! `UNIQUE(namespace, content_hash)` constraint so two concurrent uploads of
//! identical bytes cannot both report `created = true`. BM25 search goes
//! through an FTS5 index that is always joined against the namespace column.

use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use supio_core::{EntryId, EntryStatus, StorageId, SupioError};
use supio_storage::{map_tr_err, Database};

/// Typed metadata carried by every knowledge entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Ownership link to the raw-file blob, when one exists.
    pub storage_id: Option<StorageId>,
    /// Organization that uploaded the entry. Equals the namespace.
    pub uploaded_by: String,
    /// Original filename.
    pub filename: String,
    /// Optional grouping label.
    pub category: Option<String>,
}

/// One ingested document.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeEntry {
    /// Monotonic insertion sequence; doubles as the pagination cursor.
    pub seq: i64,
    pub id: EntryId,
    pub namespace: String,
    /// Stable identity within the namespace, typically the filename.
    pub key: String,
    pub title: String,
    /// Extracted text content.
    pub text: String,
    /// Hex SHA-256 of the raw input bytes.
    pub content_hash: String,
    pub status: EntryStatus,
    pub metadata: EntryMetadata,
    pub created_at: String,
}

/// Input for [`KnowledgeStore::add`].
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub namespace: String,
    pub key: String,
    pub title: String,
    pub text: String,
    pub content_hash: String,
    pub metadata: EntryMetadata,
}

/// Result of an add: the entry id plus whether a new entry was created.
///
/// `created = false` means an entry with the same content hash already
/// existed in the namespace; the caller must release any freshly allocated
/// raw storage.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    pub entry_id: EntryId,
    pub created: bool,
}

/// A page of entries in insertion order.
#[derive(Debug, Clone)]
pub struct EntryPage {
    pub page: Vec<KnowledgeEntry>,
    pub is_done: bool,
    pub next_cursor: Option<i64>,
}

/// Handle proving a namespace exists (has received at least one add).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceHandle {
    pub namespace: String,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub entry_id: EntryId,
    pub title: String,
}

/// Relevance-ranked search output: the matched entries plus their
/// concatenated text for grounding a model answer.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub entries: Vec<SearchHit>,
    pub text: String,
}

fn row_to_entry(row: &rusqlite::Row) -> Result<KnowledgeEntry, rusqlite::Error> {
    let status_raw: String = row.get(7)?;
    let status = EntryStatus::from_str(&status_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(KnowledgeEntry {
        seq: row.get(0)?,
        id: EntryId(row.get(1)?),
        namespace: row.get(2)?,
        key: row.get(3)?,
        title: row.get(4)?,
        text: row.get(5)?,
        content_hash: row.get(6)?,
        status,
        metadata: EntryMetadata {
            storage_id: row.get::<_, Option<String>>(8)?.map(StorageId),
            uploaded_by: row.get(9)?,
            filename: row.get(10)?,
            category: row.get(11)?,
        },
        created_at: row.get(12)?,
    })
}

const SELECT_COLUMNS: &str = "seq, id, namespace, key, title, body, content_hash, status, \
     storage_id, uploaded_by, filename, category, created_at";

/// Rewrites a free-text query into quoted FTS5 terms.
///
/// Every alphanumeric run becomes a quoted phrase joined with OR, so FTS
/// syntax in user input (column filters, NEAR, `*`) cannot alter scoping.
/// Returns `None` when no searchable term remains.
fn sanitize_fts_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{t}\""))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// The namespaced knowledge store.
#[derive(Clone)]
pub struct KnowledgeStore {
    db: Database,
}

impl KnowledgeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Adds an entry, at most once per `(namespace, content_hash)`.
    ///
    /// The namespace row, the uniqueness check, and the insert happen in one
    /// transaction on the single writer connection, so concurrent identical
    /// uploads serialize and exactly one reports `created = true`.
    pub async fn add(&self, entry: NewEntry) -> Result<AddOutcome, SupioError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;

                tx.execute(
                    "INSERT OR IGNORE INTO knowledge_namespaces (namespace) VALUES (?1)",
                    params![entry.namespace],
                )?;

                let inserted = tx.execute(
                    "INSERT INTO knowledge_entries
                       (id, namespace, key, title, body, content_hash, status,
                        storage_id, uploaded_by, filename, category)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'ready', ?7, ?8, ?9, ?10)
                     ON CONFLICT(namespace, content_hash) DO NOTHING",
                    params![
                        id,
                        entry.namespace,
                        entry.key,
                        entry.title,
                        entry.text,
                        entry.content_hash,
                        entry.metadata.storage_id.as_ref().map(|s| s.as_str()),
                        entry.metadata.uploaded_by,
                        entry.metadata.filename,
                        entry.metadata.category,
                    ],
                )?;

                let outcome = if inserted > 0 {
                    AddOutcome {
                        entry_id: EntryId(id),
                        created: true,
                    }
                } else {
                    let existing: String = tx.query_row(
                        "SELECT id FROM knowledge_entries
                         WHERE namespace = ?1 AND content_hash = ?2",
                        params![entry.namespace, entry.content_hash],
                        |row| row.get(0),
                    )?;
                    AddOutcome {
                        entry_id: EntryId(existing),
                        created: false,
                    }
                };

                tx.commit()?;
                Ok(outcome)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Gets an entry by id.
    pub async fn get(&self, entry_id: &EntryId) -> Result<Option<KnowledgeEntry>, SupioError> {
        let id = entry_id.as_str().to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM knowledge_entries WHERE id = ?1"
                ))?;
                match stmt.query_row(params![id], row_to_entry) {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    /// Deletes an entry. Linearizable with subsequent `get`/`list`: once this
    /// returns, the entry is gone from both.
    pub async fn delete(&self, entry_id: &EntryId) -> Result<(), SupioError> {
        let id = entry_id.as_str().to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute("DELETE FROM knowledge_entries WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Lists a namespace's entries in insertion order.
    ///
    /// The cursor is the `seq` of the last entry of the previous page, so
    /// concurrent inserts can neither duplicate nor skip entries across a
    /// committed page boundary.
    pub async fn list(
        &self,
        namespace: &str,
        cursor: Option<i64>,
        page_size: usize,
    ) -> Result<EntryPage, SupioError> {
        let namespace = namespace.to_string();
        let after = cursor.unwrap_or(0);
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM knowledge_entries
                     WHERE namespace = ?1 AND seq > ?2
                     ORDER BY seq ASC
                     LIMIT ?3"
                ))?;
                let mut entries = stmt
                    .query_map(params![namespace, after, (page_size + 1) as i64], row_to_entry)?
                    .collect::<Result<Vec<_>, _>>()?;

                let is_done = entries.len() <= page_size;
                entries.truncate(page_size);
                let next_cursor = entries.last().map(|e| e.seq);
                Ok(EntryPage {
                    page: entries,
                    is_done,
                    next_cursor,
                })
            })
            .await
            .map_err(map_tr_err)
    }

    /// A namespace exists iff it has ever received an `add`.
    pub async fn get_namespace(
        &self,
        namespace: &str,
    ) -> Result<Option<NamespaceHandle>, SupioError> {
        let namespace = namespace.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let result: Result<String, _> = conn.query_row(
                    "SELECT namespace FROM knowledge_namespaces WHERE namespace = ?1",
                    params![namespace],
                    |row| row.get(0),
                );
                match result {
                    Ok(ns) => Ok(Some(NamespaceHandle { namespace: ns })),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    /// BM25 search scoped to one namespace.
    ///
    /// Entries from other namespaces can never surface: the FTS match is
    /// joined against the entry row and filtered on the namespace column,
    /// and the query string is sanitized before it reaches FTS5.
    pub async fn search(
        &self,
        namespace: &str,
        query: &str,
        limit: usize,
    ) -> Result<SearchResult, SupioError> {
        let Some(match_expr) = sanitize_fts_query(query) else {
            return Ok(SearchResult::default());
        };
        let namespace = namespace.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT e.id, e.title, e.body
                     FROM knowledge_fts
                     JOIN knowledge_entries e ON e.seq = knowledge_fts.rowid
                     WHERE knowledge_fts MATCH ?1 AND e.namespace = ?2
                     ORDER BY bm25(knowledge_fts)
                     LIMIT ?3",
                )?;
                let rows = stmt
                    .query_map(params![match_expr, namespace, limit as i64], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                let mut entries = Vec::with_capacity(rows.len());
                let mut text = String::new();
                for (id, title, body) in rows {
                    entries.push(SearchHit {
                        entry_id: EntryId(id),
                        title,
                    });
                    if !text.is_empty() {
                        text.push_str("\n\n");
                    }
                    text.push_str(&body);
                }
                Ok(SearchResult { entries, text })
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_store() -> (KnowledgeStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (KnowledgeStore::new(db), dir)
    }

    fn make_entry(namespace: &str, key: &str, text: &str, hash: &str) -> NewEntry {
        NewEntry {
            namespace: namespace.to_string(),
            key: key.to_string(),
            title: key.to_string(),
            text: text.to_string(),
            content_hash: hash.to_string(),
            metadata: EntryMetadata {
                storage_id: Some(StorageId(format!("blob-{hash}"))),
                uploaded_by: namespace.to_string(),
                filename: key.to_string(),
                category: None,
            },
        }
    }

    #[tokio::test]
    async fn add_then_get_roundtrips() {
        let (store, _dir) = setup_store().await;

        let outcome = store
            .add(make_entry("org_1", "faq.txt", "Q: Hi A: Hello", "hash-1"))
            .await
            .unwrap();
        assert!(outcome.created);

        let entry = store.get(&outcome.entry_id).await.unwrap().unwrap();
        assert_eq!(entry.key, "faq.txt");
        assert_eq!(entry.text, "Q: Hi A: Hello");
        assert_eq!(entry.status, EntryStatus::Ready);
        assert_eq!(entry.metadata.uploaded_by, "org_1");
    }

    #[tokio::test]
    async fn duplicate_hash_is_a_noop_with_created_false() {
        let (store, _dir) = setup_store().await;

        let first = store
            .add(make_entry("org_1", "faq.txt", "Q: Hi A: Hello", "hash-1"))
            .await
            .unwrap();
        let second = store
            .add(make_entry("org_1", "faq.txt", "Q: Hi A: Hello", "hash-1"))
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(second.entry_id, first.entry_id);

        let page = store.list("org_1", None, 10).await.unwrap();
        assert_eq!(page.page.len(), 1, "entry count must not increase");
    }

    #[tokio::test]
    async fn same_hash_in_another_namespace_creates() {
        let (store, _dir) = setup_store().await;

        let a = store
            .add(make_entry("org_a", "doc.txt", "content", "hash-x"))
            .await
            .unwrap();
        let b = store
            .add(make_entry("org_b", "doc.txt", "content", "hash-x"))
            .await
            .unwrap();

        assert!(a.created);
        assert!(b.created, "dedup is per-namespace");
    }

    #[tokio::test]
    async fn delete_is_visible_to_get_and_list() {
        let (store, _dir) = setup_store().await;
        let outcome = store
            .add(make_entry("org_1", "doc.txt", "content", "hash-1"))
            .await
            .unwrap();

        store.delete(&outcome.entry_id).await.unwrap();

        assert!(store.get(&outcome.entry_id).await.unwrap().is_none());
        assert!(store.list("org_1", None, 10).await.unwrap().page.is_empty());
    }

    #[tokio::test]
    async fn list_pages_in_insertion_order() {
        let (store, _dir) = setup_store().await;
        for i in 0..5 {
            store
                .add(make_entry("org_1", &format!("f{i}.txt"), &format!("text {i}"), &format!("h{i}")))
                .await
                .unwrap();
        }

        let first = store.list("org_1", None, 2).await.unwrap();
        assert_eq!(first.page.len(), 2);
        assert!(!first.is_done);
        assert_eq!(first.page[0].key, "f0.txt");

        let second = store.list("org_1", first.next_cursor, 2).await.unwrap();
        assert_eq!(second.page[0].key, "f2.txt");

        let third = store.list("org_1", second.next_cursor, 2).await.unwrap();
        assert_eq!(third.page.len(), 1);
        assert!(third.is_done);
        assert_eq!(third.page[0].key, "f4.txt");
    }

    #[tokio::test]
    async fn nonexistent_namespace_lists_empty_not_error() {
        let (store, _dir) = setup_store().await;
        assert!(store.get_namespace("org_ghost").await.unwrap().is_none());

        let page = store.list("org_ghost", None, 10).await.unwrap();
        assert!(page.page.is_empty());
        assert!(page.is_done);

        let result = store.search("org_ghost", "anything", 5).await.unwrap();
        assert!(result.entries.is_empty());
    }

    #[tokio::test]
    async fn namespace_exists_after_first_add() {
        let (store, _dir) = setup_store().await;
        store
            .add(make_entry("org_1", "doc.txt", "content", "h1"))
            .await
            .unwrap();
        let handle = store.get_namespace("org_1").await.unwrap().unwrap();
        assert_eq!(handle.namespace, "org_1");
    }

    #[tokio::test]
    async fn search_finds_relevant_entries_within_namespace() {
        let (store, _dir) = setup_store().await;
        store
            .add(make_entry("org_1", "plans.md", "Our most popular plan is the Pro plan at $20.", "h1"))
            .await
            .unwrap();
        store
            .add(make_entry("org_1", "hours.md", "Support hours are 9am to 5pm weekdays.", "h2"))
            .await
            .unwrap();

        let result = store.search("org_1", "popular plan", 5).await.unwrap();
        assert!(!result.entries.is_empty());
        assert_eq!(result.entries[0].title, "plans.md");
        assert!(result.text.contains("Pro plan"));
    }

    #[tokio::test]
    async fn search_never_crosses_namespaces() {
        let (store, _dir) = setup_store().await;
        store
            .add(make_entry("org_a", "secret.md", "alpha confidential roadmap", "h1"))
            .await
            .unwrap();
        store
            .add(make_entry("org_b", "public.md", "beta public notes", "h2"))
            .await
            .unwrap();

        let result = store.search("org_b", "confidential roadmap", 5).await.unwrap();
        assert!(result.entries.is_empty());
        assert!(result.text.is_empty());
    }

    #[tokio::test]
    async fn malicious_fts_syntax_cannot_escape_namespace() {
        let (store, _dir) = setup_store().await;
        store
            .add(make_entry("org_a", "secret.md", "alpha confidential roadmap", "h1"))
            .await
            .unwrap();

        for query in [
            "confidential OR namespace:org_a",
            "* ",
            "body: confidential",
            "\"confidential\" NOT nothing",
            "roadmap NEAR(alpha, 2)",
        ] {
            let result = store.search("org_b", query, 5).await.unwrap();
            assert!(
                result.entries.is_empty(),
                "query {query:?} leaked entries across namespaces"
            );
        }
    }

    #[tokio::test]
    async fn empty_query_returns_empty_result() {
        let (store, _dir) = setup_store().await;
        store
            .add(make_entry("org_1", "doc.txt", "content", "h1"))
            .await
            .unwrap();
        let result = store.search("org_1", "  --  ", 5).await.unwrap();
        assert!(result.entries.is_empty());
    }

    #[test]
    fn sanitize_quotes_every_term() {
        assert_eq!(
            sanitize_fts_query("popular plan").as_deref(),
            Some("\"popular\" OR \"plan\"")
        );
        assert_eq!(
            sanitize_fts_query("body: x OR *").as_deref(),
            Some("\"body\" OR \"x\" OR \"OR\"")
        );
        assert!(sanitize_fts_query(" .. !! ").is_none());
    }
}
