//! Reminder bridge operations: pending reminders on todos and the durable
//! hand-off queue.

use super::todos::{TODO_SELECT, row_to_todo};
use super::{Db, now_timestamp};
use rusqlite::Result as SqliteResult;
use todo_types::{ReminderEntry, Todo};

impl Db {
    /// Todos whose reminder time is at or before `now`, not yet sent and not
    /// completed, earliest first. `now` must use the same UTC format as stored
    /// `reminder_at` values.
    pub fn pending_reminders(&self, now: &str) -> SqliteResult<Vec<Todo>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE t.reminder_at IS NOT NULL
                AND t.reminder_at <= ?1
                AND t.reminder_sent = 0
                AND t.completed = 0
             ORDER BY t.reminder_at ASC, t.id ASC",
            TODO_SELECT
        ))?;
        let entries = stmt
            .query_map([now], row_to_todo)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// Set `reminder_sent`. Already-sent todos are left untouched.
    /// Returns `false` when the todo does not exist.
    pub fn mark_reminder_sent(&self, id: i64) -> SqliteResult<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE todos SET reminder_sent = 1, updated_at = ?1 WHERE id = ?2 AND reminder_sent = 0",
            rusqlite::params![now_timestamp(), id],
        )?;
        if changed > 0 {
            return Ok(true);
        }
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM todos WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )
    }

    /// Insert or replace the queue entry for `entry.todo_id` and return the
    /// whole queue as it stands after the write.
    pub fn upsert_reminder_entry(&self, entry: &ReminderEntry) -> SqliteResult<Vec<ReminderEntry>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO reminder_queue (todo_id, title, notes, reminder_at, category_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(todo_id) DO UPDATE SET
                title = excluded.title,
                notes = excluded.notes,
                reminder_at = excluded.reminder_at,
                category_name = excluded.category_name,
                created_at = excluded.created_at",
            rusqlite::params![
                entry.todo_id,
                entry.title,
                entry.notes,
                entry.reminder_at,
                entry.category_name,
                entry.created_at
            ],
        )?;
        let queue = list_queue_impl(&tx)?;
        tx.commit()?;
        Ok(queue)
    }

    pub fn list_reminder_queue(&self) -> SqliteResult<Vec<ReminderEntry>> {
        let conn = self.conn();
        list_queue_impl(&conn)
    }
}

fn list_queue_impl(conn: &rusqlite::Connection) -> SqliteResult<Vec<ReminderEntry>> {
    let mut stmt = conn.prepare(
        "SELECT todo_id, title, notes, reminder_at, category_name, created_at
         FROM reminder_queue ORDER BY reminder_at ASC, todo_id ASC",
    )?;
    let entries = stmt
        .query_map([], |row| {
            Ok(ReminderEntry {
                todo_id: row.get(0)?,
                title: row.get(1)?,
                notes: row.get(2)?,
                reminder_at: row.get(3)?,
                category_name: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_types::{CreateTodoRequest, UpdateTodoRequest};

    fn db() -> Db {
        Db::open(":memory:", false).unwrap()
    }

    fn with_reminder(db: &Db, title: &str, reminder_at: &str) -> Todo {
        db.create_todo(&CreateTodoRequest {
            title: title.to_string(),
            reminder_at: Some(reminder_at.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_pending_excludes_future_sent_and_completed() {
        let db = db();
        let now = "2024-06-01T12:00:00Z";
        with_reminder(&db, "later", "2024-06-01T09:00:00Z");
        with_reminder(&db, "earlier", "2024-05-01T09:00:00Z");
        with_reminder(&db, "exactly-now", now);
        with_reminder(&db, "future", "2024-06-01T12:00:01Z");
        let sent = with_reminder(&db, "sent", "2024-05-01T08:00:00Z");
        let done = with_reminder(&db, "done", "2024-05-01T08:00:00Z");
        db.create_todo(&CreateTodoRequest {
            title: "no reminder".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert!(db.mark_reminder_sent(sent.id).unwrap());
        db.toggle_todo(done.id).unwrap();

        let pending = db.pending_reminders(now).unwrap();
        let titles: Vec<&str> = pending.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["earlier", "later", "exactly-now"]);
        assert!(pending.iter().all(|t| !t.reminder_sent && !t.completed));
    }

    #[test]
    fn test_mark_sent_is_idempotent() {
        let db = db();
        let todo = with_reminder(&db, "t", "2024-01-01T00:00:00Z");
        assert!(db.mark_reminder_sent(todo.id).unwrap());
        let first = db.get_todo(todo.id).unwrap().unwrap();
        assert!(first.reminder_sent);

        assert!(db.mark_reminder_sent(todo.id).unwrap());
        let second = db.get_todo(todo.id).unwrap().unwrap();
        assert_eq!(second.updated_at, first.updated_at);

        assert!(!db.mark_reminder_sent(9999).unwrap());
    }

    #[test]
    fn test_completed_reminder_comes_back_when_reopened() {
        let db = db();
        let todo = with_reminder(&db, "t", "2024-01-01T00:00:00Z");
        db.update_todo(
            todo.id,
            &UpdateTodoRequest {
                reminder_at: todo.reminder_at.clone(),
                completed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(db.pending_reminders("2025-01-01T00:00:00Z").unwrap().is_empty());

        db.toggle_todo(todo.id).unwrap();
        assert_eq!(db.pending_reminders("2025-01-01T00:00:00Z").unwrap().len(), 1);
    }

    #[test]
    fn test_queue_upsert_replaces_entry() {
        let db = db();
        let entry = |todo_id: i64, reminder_at: &str| ReminderEntry {
            todo_id,
            title: format!("todo {}", todo_id),
            notes: None,
            reminder_at: reminder_at.to_string(),
            category_name: None,
            created_at: now_timestamp(),
        };

        db.upsert_reminder_entry(&entry(1, "2024-01-02T00:00:00Z")).unwrap();
        db.upsert_reminder_entry(&entry(2, "2024-01-03T00:00:00Z")).unwrap();
        let queue = db.upsert_reminder_entry(&entry(1, "2024-01-04T00:00:00Z")).unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].todo_id, 2);
        assert_eq!(queue[1].todo_id, 1);
        assert_eq!(queue[1].reminder_at, "2024-01-04T00:00:00Z");
        assert_eq!(db.list_reminder_queue().unwrap(), queue);
    }
}
