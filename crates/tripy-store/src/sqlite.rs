//! SQLite-backed conversation store.
//!
//! All turns live in one table keyed by session id; row order is insertion
//! order. The connection is guarded by a mutex, matching the single-writer
//! assumption.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info};
use tripy_common::{Role, SessionId, StoreError, Turn};

use crate::{ConversationStore, SessionSummary};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS conversation_turns (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_turns_session
        ON conversation_turns(session_id, id);
"#;

const TITLE_MAX_CHARS: usize = 60;

/// SQLite conversation store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Open(format!(
                        "failed to create directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Open(format!("{}: {e}", path.display())))?;
        let store = Self::with_connection(conn)?;
        info!("opened conversation store at {}", path.display());
        Ok(store)
    }

    /// A private in-memory database; contents vanish when dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Open(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::Open(format!("failed to create tables: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Query("connection lock poisoned".into()))
    }
}

impl ConversationStore for SqliteStore {
    fn append(&self, session: &SessionId, role: Role, content: &str) -> Result<(), StoreError> {
        if !role.is_persistable() {
            return Err(StoreError::InvalidRole(role));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO conversation_turns (session_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session.as_str(),
                role.as_str(),
                content,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(|e| StoreError::Query(format!("failed to append turn: {e}")))?;

        debug!(session = %session.short(), %role, "appended turn");
        Ok(())
    }

    fn append_exchange(
        &self,
        session: &SessionId,
        human: &str,
        assistant: &str,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Query(format!("failed to begin transaction: {e}")))?;
        let now = Utc::now().to_rfc3339();
        for (role, content) in [(Role::Human, human), (Role::Assistant, assistant)] {
            tx.execute(
                "INSERT INTO conversation_turns (session_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![session.as_str(), role.as_str(), content, now],
            )
            .map_err(|e| StoreError::Query(format!("failed to append {role} turn: {e}")))?;
        }
        tx.commit()
            .map_err(|e| StoreError::Query(format!("failed to commit exchange: {e}")))?;

        debug!(session = %session.short(), "appended exchange");
        Ok(())
    }

    fn read(&self, session: &SessionId) -> Result<Vec<Turn>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT role, content, created_at FROM conversation_turns
                 WHERE session_id = ?1
                 ORDER BY id ASC",
            )
            .map_err(|e| StoreError::Query(format!("query prepare failed: {e}")))?;

        let rows = stmt
            .query_map(params![session.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| StoreError::Query(format!("query failed: {e}")))?;

        let mut turns = Vec::new();
        for row in rows {
            let (role, content, created_at) =
                row.map_err(|e| StoreError::Query(format!("failed to read row: {e}")))?;
            turns.push(Turn {
                role: parse_role(&role)?,
                content,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(turns)
    }

    fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT session_id FROM conversation_turns
                 GROUP BY session_id
                 ORDER BY MAX(id) DESC",
            )
            .map_err(|e| StoreError::Query(format!("query prepare failed: {e}")))?;

        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Query(format!("query failed: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Query(format!("failed to collect results: {e}")))?;

        ids.iter().map(|id| parse_session_id(id)).collect()
    }

    fn clear(&self, session: &SessionId) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute(
                "DELETE FROM conversation_turns WHERE session_id = ?1",
                params![session.as_str()],
            )
            .map_err(|e| StoreError::Query(format!("failed to clear session: {e}")))?;

        debug!(session = %session.short(), deleted, "cleared session");
        Ok(())
    }

    fn summaries(&self) -> Result<Vec<SessionSummary>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT t.session_id, COUNT(*), MAX(t.created_at),
                        (SELECT h.content FROM conversation_turns h
                         WHERE h.session_id = t.session_id AND h.role = 'human'
                         ORDER BY h.id ASC LIMIT 1)
                 FROM conversation_turns t
                 GROUP BY t.session_id
                 ORDER BY MAX(t.id) DESC",
            )
            .map_err(|e| StoreError::Query(format!("query prepare failed: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .map_err(|e| StoreError::Query(format!("query failed: {e}")))?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, count, last_active, first_human) =
                row.map_err(|e| StoreError::Query(format!("failed to read row: {e}")))?;
            summaries.push(SessionSummary {
                id: parse_session_id(&id)?,
                turn_count: usize::try_from(count).unwrap_or(0),
                last_active: parse_timestamp(&last_active)?,
                title: first_human.map(|text| shorten(&text, TITLE_MAX_CHARS)),
            });
        }
        Ok(summaries)
    }
}

fn parse_role(value: &str) -> Result<Role, StoreError> {
    let role = Role::from_str(value).map_err(StoreError::Corrupt)?;
    if !role.is_persistable() {
        return Err(StoreError::Corrupt(format!("unexpected stored role: {value}")));
    }
    Ok(role)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{value}': {e}")))
}

fn parse_session_id(value: &str) -> Result<SessionId, StoreError> {
    SessionId::from_str(value).map_err(StoreError::Corrupt)
}

fn shorten(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}
