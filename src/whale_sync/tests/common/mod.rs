#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Text};
use sighting_source::{Document, FetchError, PageFetcher};
use tempfile::TempDir;
use whale_sync::db::{connection, migrate};
use whale_sync::species::AliasIndex;

pub const FIXTURE_URL: &str = "https://newportwhales.test/whalecount.html";
pub const FIXTURE: &str = include_str!("../fixtures/whalecount.html");

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}
#[derive(QueryableByName)]
struct Cnt {
    #[diesel(sql_type = BigInt)]
    n: i64,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_sqlite(&path).expect("migrations");

    // open a connection with PRAGMAs applied
    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal"); // WAL is persistent per DB file

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

pub fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
    let c: Cnt = sql_query(format!("SELECT COUNT(*) AS n FROM {table}"))
        .get_result(conn)
        .unwrap();
    c.n
}

pub fn fk_check_empty(conn: &mut SqliteConnection) {
    let c: Cnt = sql_query("SELECT COUNT(*) AS n FROM pragma_foreign_key_check")
        .get_result(conn)
        .unwrap();
    assert_eq!(c.n, 0, "foreign key violations present");
}

/// Alias index loaded from the seeded catalog.
pub fn seeded_index(conn: &mut SqliteConnection) -> Arc<AliasIndex> {
    let index = Arc::new(AliasIndex::new());
    index.refresh(conn).expect("load aliases");
    index
}

/// In-memory page source. Serves whatever HTML it holds, or a 503.
pub struct StubFetcher {
    page: Mutex<Option<String>>,
    pub calls: AtomicUsize,
}

impl StubFetcher {
    pub fn serving(html: &str) -> Arc<Self> {
        Arc::new(Self {
            page: Mutex::new(Some(html.to_string())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            page: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_page(&self, html: &str) {
        *self.page.lock().unwrap() = Some(html.to_string());
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.page.lock().unwrap().clone() {
            Some(html) => Ok(Document::from_html(url, html)),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            }),
        }
    }
}
