//! Durable FIFO job queue on SQLite.
//!
//! Entries are file paths keyed by a queue name. Pop is at-least-once while
//! the process lives: a claimed row is deleted before the job runs, so a
//! crash mid-job loses that job but never duplicates it into another worker.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Idempotent schema for the jobs table.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    queue TEXT NOT NULL,
    path TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_jobs_queue_id ON jobs(queue, id);
"#;

/// WAL tuning pragmas, applied after PRAGMA journal_mode = WAL.
const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        "#;

/// Durable FIFO queue keyed by a queue name.
///
/// One connection behind a mutex; pushes wake poppers through a condvar, so
/// a blocked [`pop_timeout`](Self::pop_timeout) reacts to new work without
/// sleep-loop polling.
pub struct JobQueue {
    conn: Mutex<Connection>,
    pushed: Condvar,
    name: String,
}

impl JobQueue {
    /// Open or create the queue database at `path` (WAL + schema, idempotent).
    pub fn open(path: &Path, name: &str) -> Result<Self> {
        let conn = Connection::open(path).context("open queue database")?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .context("enable WAL")?;
        conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
        conn.execute_batch(SCHEMA).context("create queue schema")?;
        Ok(Self::with_conn(conn, name))
    }

    /// In-memory queue with the same schema (tests and throwaway runs).
    pub fn open_in_memory(name: &str) -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory queue")?;
        conn.execute_batch(SCHEMA).context("create queue schema")?;
        Ok(Self::with_conn(conn, name))
    }

    fn with_conn(conn: Connection, name: &str) -> Self {
        Self {
            conn: Mutex::new(conn),
            pushed: Condvar::new(),
            name: name.to_string(),
        }
    }

    /// Append one path to the tail of the queue.
    pub fn push(&self, path: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO jobs (queue, path) VALUES (?1, ?2)",
            params![self.name, path],
        )
        .context("push job")?;
        self.pushed.notify_one();
        Ok(())
    }

    /// Pop the oldest entry, blocking up to `timeout` for one to appear.
    /// `Ok(None)` means the queue stayed empty for the whole window — no
    /// work, not an error.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        let mut conn = self.conn.lock().unwrap();
        loop {
            if let Some(path) = take_front(&conn, &self.name)? {
                return Ok(Some(path));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let (guard, wait) = self.pushed.wait_timeout(conn, deadline - now).unwrap();
            conn = guard;
            if wait.timed_out() {
                // One last look before giving up the slot.
                return take_front(&conn, &self.name);
            }
        }
    }

    /// Pending entry count. Non-atomic with respect to concurrent pops: a
    /// scheduling hint, never a correctness guarantee.
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM jobs WHERE queue = ?1",
                params![self.name],
                |row| row.get(0),
            )
            .context("count jobs")?;
        Ok(n.max(0) as usize)
    }

    /// Emptiness hint. Count failures read as empty so a drain loop cannot
    /// spin on a broken connection.
    pub fn is_empty(&self) -> bool {
        self.len().map(|n| n == 0).unwrap_or(true)
    }
}

/// Claim the oldest row for `queue`: read then delete under the caller's
/// lock, which serializes claims within this process.
fn take_front(conn: &Connection, queue: &str) -> Result<Option<String>> {
    let row = conn
        .query_row(
            "SELECT id, path FROM jobs WHERE queue = ?1 ORDER BY id LIMIT 1",
            params![queue],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
        .context("peek front of queue")?;
    match row {
        None => Ok(None),
        Some((id, path)) => {
            conn.execute("DELETE FROM jobs WHERE id = ?1", params![id])
                .context("claim job")?;
            Ok(Some(path))
        }
    }
}
