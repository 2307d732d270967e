use std::fs;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rootify_config::store::StoreConfig;
use rootify_core::{MAX_ROOT_CHARS, Snapshot, WordRoot};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Result, SqlResultExt, StoreError};
use crate::transfer;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS word_roots (
    chinese TEXT PRIMARY KEY,
    english TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_chinese ON word_roots(chinese);
";

const UPSERT: &str = "
INSERT INTO word_roots (chinese, english, created_at, updated_at)
VALUES (?1, ?2, ?3, ?3)
ON CONFLICT(chinese) DO UPDATE SET
    english = excluded.english,
    updated_at = excluded.updated_at
";

/// Applies the busy timeout to every connection the pool hands out.
#[derive(Debug)]
struct BusyTimeout(Duration);

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for BusyTimeout {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.busy_timeout(self.0)
    }
}

type SqlitePool = Pool<SqliteConnectionManager>;

/// Persistent, thread-safe word-root table.
///
/// Reads take the lock shared, every mutation takes it exclusively, so no
/// reader sees a half-applied import. The lock only coordinates callers in
/// this process.
pub struct WordRootStore {
    pool: RwLock<Option<SqlitePool>>,
}

impl WordRootStore {
    /// Open (or create) the database file named by the config
    pub fn open(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(&config.db_path);
        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .connection_customizer(Box::new(BusyTimeout(Duration::from_millis(
                config.busy_timeout_ms,
            ))))
            .build(manager)?;

        {
            let conn = pool.get()?;
            let mode: String = conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                .write_context("enable WAL")?;
            tracing::debug!("Journal mode: {mode}");
            conn.execute_batch(SCHEMA).write_context("create schema")?;
        }

        tracing::info!("Opened word-root store at {}", config.db_path.display());
        Ok(Self::from_pool(pool))
    }

    /// Private in-memory database backed by a single pooled connection
    pub fn open_in_memory() -> Result<Self> {
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(SqliteConnectionManager::memory())?;

        pool.get()?
            .execute_batch(SCHEMA)
            .write_context("create schema")?;

        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool: RwLock::new(Some(pool)),
        }
    }

    /// Drop the connection pool. Every later call fails with `StoreUnavailable`.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.pool.write().map_err(|_| StoreError::LockPoisoned)?;
        if guard.take().is_some() {
            tracing::info!("Closed word-root store");
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.pool.read().map(|g| g.is_some()).unwrap_or(false)
    }

    fn with_read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.pool.read().map_err(|_| StoreError::LockPoisoned)?;
        let pool = guard.as_ref().ok_or(StoreError::StoreUnavailable)?;
        let conn = pool.get()?;
        f(&*conn)
    }

    fn with_write<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let guard = self.pool.write().map_err(|_| StoreError::LockPoisoned)?;
        let pool = guard.as_ref().ok_or(StoreError::StoreUnavailable)?;
        let mut conn = pool.get()?;
        f(&mut *conn)
    }

    /// Every root as an immutable snapshot
    pub fn get_all(&self) -> Result<Snapshot> {
        self.with_read(|conn| {
            let roots = select_pairs(conn)?.into_iter().collect();
            Ok(Snapshot::new(roots))
        })
    }

    /// Every root with its timestamps, ordered by key
    pub fn entries(&self) -> Result<Vec<WordRoot>> {
        self.with_read(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT chinese, english, created_at, updated_at FROM word_roots ORDER BY chinese",
                )
                .query_context("prepare entries")?;
            let rows = stmt
                .query_map([], row_to_word_root)
                .query_context("query entries")?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .query_context("scan entries")
        })
    }

    pub fn get(&self, chinese: &str) -> Result<Option<WordRoot>> {
        self.with_read(|conn| {
            conn.query_row(
                "SELECT chinese, english, created_at, updated_at FROM word_roots WHERE chinese = ?1",
                params![chinese],
                row_to_word_root,
            )
            .optional()
            .query_context("get root")
        })
    }

    /// Roots whose key or gloss contains `term`, ordered by key
    pub fn search(&self, term: &str) -> Result<Vec<WordRoot>> {
        self.with_read(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT chinese, english, created_at, updated_at FROM word_roots
                     WHERE instr(chinese, ?1) > 0 OR instr(english, ?1) > 0
                     ORDER BY chinese",
                )
                .query_context("prepare search")?;
            let rows = stmt
                .query_map(params![term], row_to_word_root)
                .query_context("search roots")?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .query_context("scan search")
        })
    }

    pub fn count(&self) -> Result<usize> {
        self.with_read(|conn| {
            let n: i64 = conn
                .query_row("SELECT COUNT(*) FROM word_roots", [], |row| row.get(0))
                .query_context("count roots")?;
            Ok(n as usize)
        })
    }

    /// Insert or replace the gloss for `chinese`, keeping its creation time
    pub fn add(&self, chinese: &str, english: &str) -> Result<()> {
        validate(chinese, english)?;
        self.with_write(|conn| {
            conn.execute(UPSERT, params![chinese, english, Utc::now()])
                .write_context("add root")?;
            tracing::debug!("Upserted root {chinese} -> {english}");
            Ok(())
        })
    }

    /// Remove a root. Returns false when it did not exist.
    pub fn delete(&self, chinese: &str) -> Result<bool> {
        self.with_write(|conn| {
            let removed = conn
                .execute("DELETE FROM word_roots WHERE chinese = ?1", params![chinese])
                .write_context("delete root")?;
            tracing::debug!("Deleted {removed} row(s) for {chinese}");
            Ok(removed > 0)
        })
    }

    /// Remove every root, returning how many were deleted
    pub fn clear_all(&self) -> Result<usize> {
        self.with_write(|conn| {
            let removed = conn
                .execute("DELETE FROM word_roots", [])
                .write_context("clear roots")?;
            tracing::info!("Cleared {removed} roots");
            Ok(removed)
        })
    }

    /// Upsert a batch of roots in one transaction.
    ///
    /// Either every entry is applied or none is; on failure the error names
    /// the offending key.
    pub fn import<I, K, V>(&self, roots: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.with_write(|conn| {
            let tx = conn.transaction().write_context("begin import")?;
            let now = Utc::now();
            let mut applied = 0;
            {
                let mut stmt = tx.prepare(UPSERT).write_context("prepare import")?;
                for (chinese, english) in roots {
                    let (chinese, english) = (chinese.as_ref(), english.as_ref());
                    let result = validate(chinese, english).and_then(|()| {
                        stmt.execute(params![chinese, english, now])
                            .write_context("import root")
                    });
                    if let Err(e) = result {
                        tracing::warn!("Import rolled back at {chinese}: {e}");
                        return Err(StoreError::TransactionAborted {
                            key: chinese.to_string(),
                            source: Box::new(e),
                        });
                    }
                    applied += 1;
                }
            }
            tx.commit().write_context("commit import")?;
            tracing::info!("Imported {applied} roots");
            Ok(applied)
        })
    }

    /// All roots as CSV, ordered by key
    pub fn export(&self) -> Result<String> {
        self.with_read(|conn| {
            let pairs = select_pairs(conn)?;
            Ok(transfer::format_csv(
                pairs.iter().map(|(c, e)| (c.as_str(), e.as_str())),
            ))
        })
    }
}

fn select_pairs(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn
        .prepare("SELECT chinese, english FROM word_roots ORDER BY chinese")
        .query_context("prepare roots")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .query_context("query roots")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .query_context("scan roots")
}

fn row_to_word_root(row: &rusqlite::Row) -> rusqlite::Result<WordRoot> {
    Ok(WordRoot {
        chinese: row.get(0)?,
        english: row.get(1)?,
        created_at: row.get::<_, DateTime<Utc>>(2)?,
        updated_at: row.get::<_, DateTime<Utc>>(3)?,
    })
}

fn validate(chinese: &str, english: &str) -> Result<()> {
    if chinese.trim().is_empty() {
        return Err(StoreError::InvalidEntry {
            chinese: chinese.to_string(),
            reason: "empty chinese key",
        });
    }
    if english.trim().is_empty() {
        return Err(StoreError::InvalidEntry {
            chinese: chinese.to_string(),
            reason: "empty english gloss",
        });
    }
    if chinese.chars().count() > MAX_ROOT_CHARS {
        tracing::warn!("Root {chinese} is longer than {MAX_ROOT_CHARS} characters and will never match");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn store_with(roots: &[(&str, &str)]) -> WordRootStore {
        let store = WordRootStore::open_in_memory().unwrap();
        for (chinese, english) in roots {
            store.add(chinese, english).unwrap();
        }
        store
    }

    #[test]
    fn test_add_and_get_all() {
        let store = store_with(&[("火", "fire"), ("火山", "volcano")]);

        let snapshot = store.get_all().unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("火山"), Some("volcano"));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_add_last_write_wins() {
        let store = store_with(&[("火", "fire"), ("火", "flame")]);

        assert_eq!(store.get_all().unwrap().get("火"), Some("flame"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_add_is_idempotent_and_keeps_created_at() {
        let store = store_with(&[("你", "you")]);
        let before_snapshot = store.get_all().unwrap();
        let before = store.get("你").unwrap().unwrap();

        store.add("你", "you").unwrap();

        let after = store.get("你").unwrap().unwrap();
        assert_eq!(store.get_all().unwrap(), before_snapshot);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[test]
    fn test_add_rejects_empty_fields() {
        let store = store_with(&[]);

        assert!(matches!(
            store.add("", "nothing"),
            Err(StoreError::InvalidEntry { .. })
        ));
        assert!(matches!(
            store.add("空", "  "),
            Err(StoreError::InvalidEntry { reason: "empty english gloss", .. })
        ));
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let store = store_with(&[("你", "you")]);
        let before = store.get_all().unwrap();

        assert!(!store.delete("好").unwrap());
        assert_eq!(store.get_all().unwrap(), before);

        assert!(store.delete("你").unwrap());
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_clear_all() {
        let store = store_with(&[("你", "you"), ("好", "good")]);

        assert_eq!(store.clear_all().unwrap(), 2);
        assert!(store.get_all().unwrap().is_empty());
        assert_eq!(store.clear_all().unwrap(), 0);
    }

    #[test]
    fn test_import_applies_batch() {
        let store = store_with(&[("你", "you")]);
        let batch = HashMap::from([
            ("你".to_string(), "thou".to_string()),
            ("好".to_string(), "good".to_string()),
        ]);

        assert_eq!(store.import(batch).unwrap(), 2);

        let snapshot = store.get_all().unwrap();
        assert_eq!(snapshot.get("你"), Some("thou"));
        assert_eq!(snapshot.get("好"), Some("good"));
    }

    #[test]
    fn test_import_is_atomic() {
        let store = store_with(&[("你", "you"), ("好", "good")]);
        let before = store.get_all().unwrap();

        let batch = vec![
            ("你", "thou"),
            ("山", "mountain"),
            ("坏", ""),
            ("水", "water"),
        ];
        let err = store.import(batch).unwrap_err();

        match err {
            StoreError::TransactionAborted { key, source } => {
                assert_eq!(key, "坏");
                assert!(matches!(*source, StoreError::InvalidEntry { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.get_all().unwrap(), before);
    }

    #[test]
    fn test_import_order_does_not_matter() {
        let pairs = [("火", "fire"), ("火山", "volcano"), ("山", "mountain")];
        let forward = store_with(&[]);
        let backward = store_with(&[]);

        forward.import(pairs).unwrap();
        backward.import(pairs.iter().rev().copied()).unwrap();

        assert_eq!(forward.get_all().unwrap(), backward.get_all().unwrap());
    }

    #[test]
    fn test_export_is_key_ordered() {
        let store = store_with(&[("好", "good"), ("你", "you")]);

        let csv = store.export().unwrap();

        let expected = transfer::format_csv(
            store
                .get_all()
                .unwrap()
                .iter()
                .collect::<Vec<_>>(),
        );
        assert_eq!(csv, expected);
        assert!(csv.starts_with("中文词根,英文对应\n"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_search_matches_key_or_gloss() {
        let store = store_with(&[("火", "fire"), ("火山", "volcano"), ("水", "water")]);

        let by_key: Vec<String> = store.search("火").unwrap().into_iter().map(|r| r.chinese).collect();
        assert_eq!(by_key, vec!["火", "火山"]);

        let by_gloss = store.search("ate").unwrap();
        assert_eq!(by_gloss.len(), 1);
        assert_eq!(by_gloss[0].chinese, "水");
    }

    #[test]
    fn test_closed_store_is_unavailable() {
        let store = store_with(&[("你", "you")]);
        store.close().unwrap();

        assert!(!store.is_open());
        assert!(matches!(store.get_all(), Err(StoreError::StoreUnavailable)));
        assert!(matches!(store.export(), Err(StoreError::StoreUnavailable)));
        assert!(matches!(store.add("好", "good"), Err(StoreError::StoreUnavailable)));
        assert!(matches!(store.delete("你"), Err(StoreError::StoreUnavailable)));
        assert!(matches!(store.clear_all(), Err(StoreError::StoreUnavailable)));
        assert!(matches!(
            store.import([("好", "good")]),
            Err(StoreError::StoreUnavailable)
        ));
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            db_path: dir.path().join("nested").join("rootify.db"),
            ..StoreConfig::default()
        };

        {
            let store = WordRootStore::open(&config).unwrap();
            store.import([("你", "you"), ("好", "good")]).unwrap();
            store.close().unwrap();
        }

        let store = WordRootStore::open(&config).unwrap();
        let expected: BTreeMap<String, String> = [("你", "you"), ("好", "good")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(store.get_all().unwrap().into_inner(), expected);
    }

    #[test]
    fn test_readers_never_see_partial_import() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            db_path: dir.path().join("rootify.db"),
            ..StoreConfig::default()
        };
        let store = Arc::new(WordRootStore::open(&config).unwrap());
        let batch: Vec<(String, String)> = (0..50)
            .map(|i| (format!("词{i}"), format!("word{i}")))
            .collect();

        let writer = {
            let store = Arc::clone(&store);
            let batch = batch.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    store.import(batch.clone()).unwrap();
                    store.clear_all().unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..20 {
                        let len = store.get_all().unwrap().len();
                        assert!(len == 0 || len == 50, "partial import observed: {len}");
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
