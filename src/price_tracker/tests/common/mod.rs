#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    num::NonZeroUsize,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicI64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use price_tracker::{
    cycle::{CheckCycle, CheckOptions},
    db::{connection, migrate},
    detector::DropThreshold,
    history::HistoryStore,
    notify::{AlertDispatcher, DispatchError, PriceAlert},
};
use product_extractor::{ExtractionError, ProductExtractor, ProductSnapshot};
use tempfile::TempDir;

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
    cnt: i64,
}

pub struct TestDb {
    dir: TempDir,     // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

impl TestDb {
    pub fn store(&self) -> HistoryStore {
        HistoryStore::new(&self.path)
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_all(&path).expect("migrations");

    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { dir, path }, conn)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    use diesel::sql_query;

    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal");

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

/// `SELECT COUNT(*) AS cnt ...` helper.
pub fn count(conn: &mut SqliteConnection, sql: &str) -> i64 {
    let c: Cnt = diesel::sql_query(sql).get_result(conn).unwrap();
    c.cnt
}

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

pub fn snapshot(
    name: &str,
    price: f64,
    currency: &str,
    observed_at: DateTime<Utc>,
) -> ProductSnapshot {
    ProductSnapshot {
        name: name.to_string(),
        price,
        currency: currency.to_string(),
        main_image_url: None,
        observed_at,
    }
}

/// Scripted extractor: each URL yields its queued results in order.
///
/// Observation times advance by one second per successful call so the
/// chronology in the store is deterministic.
#[derive(Default)]
pub struct FakeExtractor {
    script: Mutex<HashMap<String, VecDeque<Result<(String, f64, String), String>>>>,
    clock: AtomicI64,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price(self, url: &str, name: &str, price: f64, currency: &str) -> Self {
        self.push(url, Ok((name.to_string(), price, currency.to_string())))
    }

    pub fn fail(self, url: &str, reason: &str) -> Self {
        self.push(url, Err(reason.to_string()))
    }

    fn push(self, url: &str, item: Result<(String, f64, String), String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(item);
        self
    }
}

#[async_trait]
impl ProductExtractor for FakeExtractor {
    async fn extract(&self, url: &str) -> Result<ProductSnapshot, ExtractionError> {
        let next = self
            .script
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Err(format!("no scripted response for {url}")));
        let (name, price, currency) = next.map_err(ExtractionError::Api)?;
        let t = ts(self.clock.fetch_add(1, Ordering::SeqCst));
        Ok(snapshot(&name, price, &currency, t))
    }
}

/// Dispatcher that records alerts and can be told to fail.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub sent: Mutex<Vec<PriceAlert>>,
    failing: bool,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn alerts(&self) -> Vec<PriceAlert> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertDispatcher for RecordingDispatcher {
    async fn dispatch(&self, alert: &PriceAlert) -> Result<(), DispatchError> {
        if self.failing {
            return Err(DispatchError::Status {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

pub fn options(threshold: f64) -> CheckOptions {
    CheckOptions {
        threshold: DropThreshold::new(threshold).unwrap(),
        extract_timeout: Duration::from_secs(5),
        workers: NonZeroUsize::new(2).unwrap(),
    }
}

pub fn cycle(
    store: HistoryStore,
    extractor: FakeExtractor,
    dispatcher: Arc<RecordingDispatcher>,
    threshold: f64,
) -> CheckCycle {
    CheckCycle::new(store, Arc::new(extractor), dispatcher, options(threshold))
}
