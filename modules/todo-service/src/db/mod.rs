//! SQLite store for categories, todos, memos and the reminder queue.
//!
//! A single connection sits behind a mutex; every public method takes the lock
//! for the duration of its statements. Multi-statement writes run inside a
//! transaction.

mod categories;
mod export;
mod memos;
mod reminders;
mod todos;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, Result as SqliteResult};
use std::sync::{Mutex, MutexGuard};

const DEFAULT_CATEGORIES: [(i64, &str, &str, &str); 5] = [
    (1, "今天", "#FF9500", "📅"),
    (2, "工作", "#007AFF", "💼"),
    (3, "个人", "#34C759", "👤"),
    (4, "购物", "#FF2D55", "🛒"),
    (5, "学习", "#AF52DE", "📚"),
];

pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    /// Open (or create) the database at `path`. `":memory:"` opens a private
    /// in-memory database.
    pub fn open(path: &str, seed_categories: bool) -> SqliteResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_tables()?;
        if seed_categories {
            db.seed_categories()?;
        }
        Ok(db)
    }

    /// Flush and close the underlying connection.
    pub fn close(self) -> SqliteResult<()> {
        let conn = self.conn.into_inner().unwrap_or_else(|e| e.into_inner());
        conn.close().map_err(|(_, e)| e)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn create_tables(&self) -> SqliteResult<()> {
        let conn = self.conn();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                color TEXT NOT NULL DEFAULT '#007AFF',
                icon TEXT NOT NULL DEFAULT '📋',
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                notes TEXT,
                category_id INTEGER,
                due_date TEXT,
                due_time TEXT,
                reminder_at TEXT,
                reminder_sent INTEGER NOT NULL DEFAULT 0,
                completed INTEGER NOT NULL DEFAULT 0,
                completed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_todos_category ON todos(category_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_todos_reminder
             ON todos(reminder_sent, completed, reminder_at)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS memos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                images TEXT,
                tags TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_memos_created ON memos(created_at DESC)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS reminder_queue (
                todo_id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                notes TEXT,
                reminder_at TEXT NOT NULL,
                category_name TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn seed_categories(&self) -> SqliteResult<()> {
        let conn = self.conn();
        let now = now_timestamp();
        for (id, name, color, icon) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT OR IGNORE INTO categories (id, name, color, icon, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, name, color, icon, now],
            )?;
        }
        Ok(())
    }

    fn count(&self, sql: &str) -> SqliteResult<i64> {
        self.conn().query_row(sql, [], |row| row.get(0))
    }
}

/// Current UTC time with millisecond precision. Lexical order of these strings
/// matches chronological order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Wrap `needle` for a `LIKE ... ESCAPE '\'` substring match.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_categories_are_not_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.db");
        let path = path.to_str().unwrap();

        let db = Db::open(path, true).unwrap();
        assert_eq!(db.list_categories().unwrap().len(), 5);
        db.close().unwrap();

        let db = Db::open(path, true).unwrap();
        let categories = db.list_categories().unwrap();
        assert_eq!(categories.len(), 5);
        assert_eq!(categories[1].category.name, "工作");
        assert_eq!(categories[1].category.icon, "💼");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("a%b_c"), "%a\\%b\\_c%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }
}
