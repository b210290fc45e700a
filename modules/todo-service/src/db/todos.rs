//! Todo operations.

use super::{Db, like_pattern, now_timestamp};
use rusqlite::{OptionalExtension, Result as SqliteResult};
use todo_types::{CreateTodoRequest, Todo, TodoFilter, UpdateTodoRequest};

pub(super) const TODO_SELECT: &str = "SELECT t.id, t.title, t.notes, t.category_id, t.due_date, t.due_time,
            t.reminder_at, t.reminder_sent, t.completed, t.completed_at,
            t.created_at, t.updated_at, c.name, c.color, c.icon
     FROM todos t
     LEFT JOIN categories c ON t.category_id = c.id";

/// Incomplete first, then by due date with undated last, newest first.
pub(super) const TODO_ORDER: &str =
    "ORDER BY t.completed ASC, t.due_date ASC NULLS LAST, t.created_at DESC, t.id DESC";

impl Db {
    pub fn list_todos(&self, filter: &TodoFilter) -> SqliteResult<Vec<Todo>> {
        let conn = self.conn();
        let mut conditions = vec!["1=1".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let mut param_idx = 1u32;

        if let Some(category_id) = filter.category_id {
            conditions.push(format!("t.category_id = ?{}", param_idx));
            params.push(Box::new(category_id));
            param_idx += 1;
        }
        if let Some(completed) = filter.completed {
            conditions.push(format!("t.completed = ?{}", param_idx));
            params.push(Box::new(completed));
            param_idx += 1;
        }
        if let Some(ref search) = filter.search {
            conditions.push(format!(
                "(t.title LIKE ?{0} ESCAPE '\\' OR t.notes LIKE ?{0} ESCAPE '\\')",
                param_idx
            ));
            params.push(Box::new(like_pattern(search)));
            param_idx += 1;
        }
        let _ = param_idx;

        let sql = format!(
            "{} WHERE {} {}",
            TODO_SELECT,
            conditions.join(" AND "),
            TODO_ORDER
        );
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(param_refs.as_slice(), row_to_todo)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn get_todo(&self, id: i64) -> SqliteResult<Option<Todo>> {
        let conn = self.conn();
        get_todo_impl(&conn, id)
    }

    pub fn create_todo(&self, req: &CreateTodoRequest) -> SqliteResult<Todo> {
        let conn = self.conn();
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO todos (title, notes, category_id, due_date, due_time, reminder_at,
                                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            rusqlite::params![
                req.title,
                req.notes,
                req.category_id,
                req.due_date,
                req.due_time,
                req.reminder_at,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        get_todo_impl(&conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    /// Apply a PUT. `title` and `completed` keep their stored values when absent,
    /// all other fields are overwritten. Completing keeps an existing
    /// `completed_at`; un-completing clears it. Returns `None` for unknown ids.
    pub fn update_todo(&self, id: i64, req: &UpdateTodoRequest) -> SqliteResult<Option<Todo>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let existing: Option<(bool, Option<String>, Option<String>, bool)> = tx
            .query_row(
                "SELECT completed, completed_at, reminder_at, reminder_sent FROM todos WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        let Some((was_completed, completed_at, old_reminder, reminder_sent)) = existing else {
            return Ok(None);
        };

        let now = now_timestamp();
        let completed = req.completed.unwrap_or(was_completed);
        let completed_at = match req.completed {
            Some(true) => completed_at.or_else(|| Some(now.clone())),
            Some(false) => None,
            None => completed_at,
        };
        let reminder_sent = reminder_sent && old_reminder == req.reminder_at;

        tx.execute(
            "UPDATE todos SET
                title = COALESCE(?1, title),
                notes = ?2,
                category_id = ?3,
                due_date = ?4,
                due_time = ?5,
                reminder_at = ?6,
                reminder_sent = ?7,
                completed = ?8,
                completed_at = ?9,
                updated_at = ?10
             WHERE id = ?11",
            rusqlite::params![
                req.title,
                req.notes,
                req.category_id,
                req.due_date,
                req.due_time,
                req.reminder_at,
                reminder_sent,
                completed,
                completed_at,
                now,
                id
            ],
        )?;
        let todo = get_todo_impl(&tx, id)?;
        tx.commit()?;
        Ok(todo)
    }

    /// Flip `completed`. Becoming complete stamps `completed_at`, becoming
    /// incomplete clears it. Returns `None` for unknown ids.
    pub fn toggle_todo(&self, id: i64) -> SqliteResult<Option<Todo>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let completed: Option<bool> = tx
            .query_row("SELECT completed FROM todos WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(completed) = completed else {
            return Ok(None);
        };

        let now = now_timestamp();
        let completed_at = if completed { None } else { Some(now.clone()) };
        tx.execute(
            "UPDATE todos SET completed = ?1, completed_at = ?2, updated_at = ?3 WHERE id = ?4",
            rusqlite::params![!completed, completed_at, now, id],
        )?;
        let todo = get_todo_impl(&tx, id)?;
        tx.commit()?;
        Ok(todo)
    }

    pub fn delete_todo(&self, id: i64) -> SqliteResult<bool> {
        let rows = self.conn().execute("DELETE FROM todos WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

fn get_todo_impl(conn: &rusqlite::Connection, id: i64) -> SqliteResult<Option<Todo>> {
    conn.query_row(&format!("{} WHERE t.id = ?1", TODO_SELECT), [id], row_to_todo)
        .optional()
}

pub(super) fn row_to_todo(row: &rusqlite::Row) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        notes: row.get(2)?,
        category_id: row.get(3)?,
        due_date: row.get(4)?,
        due_time: row.get(5)?,
        reminder_at: row.get(6)?,
        reminder_sent: row.get(7)?,
        completed: row.get(8)?,
        completed_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
        category_name: row.get(12)?,
        category_color: row.get(13)?,
        category_icon: row.get(14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Db {
        Db::open(":memory:", false).unwrap()
    }

    fn todo(db: &Db, title: &str, due_date: Option<&str>) -> Todo {
        db.create_todo(&CreateTodoRequest {
            title: title.to_string(),
            due_date: due_date.map(|s| s.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn titles(todos: &[Todo]) -> Vec<&str> {
        todos.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_list_ordering() {
        let db = db();
        let done = todo(&db, "done", Some("2000-01-01"));
        todo(&db, "undated-old", None);
        todo(&db, "late", Some("2024-03-01"));
        todo(&db, "early", Some("2024-01-01"));
        todo(&db, "undated-new", None);
        db.toggle_todo(done.id).unwrap();

        let list = db.list_todos(&TodoFilter::default()).unwrap();
        assert_eq!(
            titles(&list),
            vec!["early", "late", "undated-new", "undated-old", "done"]
        );
    }

    #[test]
    fn test_list_filters() {
        let db = db();
        let cat = db.create_category("Work", "#007AFF", "💼").unwrap();
        db.create_todo(&CreateTodoRequest {
            title: "Write report".to_string(),
            notes: Some("quarterly numbers".to_string()),
            category_id: Some(cat.id),
            ..Default::default()
        })
        .unwrap();
        let buy = todo(&db, "Buy milk", None);
        todo(&db, "100% done_ish", None);
        db.toggle_todo(buy.id).unwrap();

        let by_cat = db
            .list_todos(&TodoFilter {
                category_id: Some(cat.id),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(titles(&by_cat), vec!["Write report"]);
        assert_eq!(by_cat[0].category_name.as_deref(), Some("Work"));
        assert_eq!(by_cat[0].category_icon.as_deref(), Some("💼"));

        let completed = db
            .list_todos(&TodoFilter {
                completed: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(titles(&completed), vec!["Buy milk"]);

        let by_notes = db
            .list_todos(&TodoFilter {
                search: Some("QUARTERLY".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(titles(&by_notes), vec!["Write report"]);

        let literal = db
            .list_todos(&TodoFilter {
                search: Some("0%".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(titles(&literal), vec!["100% done_ish"]);
    }

    #[test]
    fn test_update_partial_semantics() {
        let db = db();
        let created = db
            .create_todo(&CreateTodoRequest {
                title: "Original".to_string(),
                notes: Some("keep?".to_string()),
                due_date: Some("2024-01-01".to_string()),
                ..Default::default()
            })
            .unwrap();

        let updated = db
            .update_todo(created.id, &UpdateTodoRequest::default())
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Original");
        assert_eq!(updated.notes, None);
        assert_eq!(updated.due_date, None);
        assert!(!updated.completed);

        assert!(db.update_todo(9999, &UpdateTodoRequest::default()).unwrap().is_none());
    }

    #[test]
    fn test_update_completion_is_idempotent() {
        let db = db();
        let created = todo(&db, "t", None);
        let complete = UpdateTodoRequest {
            completed: Some(true),
            ..Default::default()
        };

        let first = db.update_todo(created.id, &complete).unwrap().unwrap();
        let stamp = first.completed_at.clone();
        assert!(first.completed);
        assert!(stamp.is_some());

        let second = db.update_todo(created.id, &complete).unwrap().unwrap();
        assert_eq!(second.completed_at, stamp);

        let untouched = db
            .update_todo(created.id, &UpdateTodoRequest::default())
            .unwrap()
            .unwrap();
        assert!(untouched.completed);
        assert_eq!(untouched.completed_at, stamp);

        let reopened = db
            .update_todo(
                created.id,
                &UpdateTodoRequest {
                    completed: Some(false),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert!(!reopened.completed);
        assert_eq!(reopened.completed_at, None);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let db = db();
        let created = todo(&db, "t", None);

        let on = db.toggle_todo(created.id).unwrap().unwrap();
        assert!(on.completed);
        assert!(on.completed_at.is_some());

        let off = db.toggle_todo(created.id).unwrap().unwrap();
        assert!(!off.completed);
        assert_eq!(off.completed_at, None);

        assert!(db.toggle_todo(9999).unwrap().is_none());
    }

    #[test]
    fn test_rescheduling_resets_reminder_sent() {
        let db = db();
        let created = db
            .create_todo(&CreateTodoRequest {
                title: "call".to_string(),
                reminder_at: Some("2024-01-01T09:00:00Z".to_string()),
                ..Default::default()
            })
            .unwrap();
        db.mark_reminder_sent(created.id).unwrap();

        let same = db
            .update_todo(
                created.id,
                &UpdateTodoRequest {
                    reminder_at: Some("2024-01-01T09:00:00Z".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert!(same.reminder_sent);

        let moved = db
            .update_todo(
                created.id,
                &UpdateTodoRequest {
                    reminder_at: Some("2024-01-02T09:00:00Z".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert!(!moved.reminder_sent);
    }

    #[test]
    fn test_delete_todo() {
        let db = db();
        let created = todo(&db, "t", None);
        assert!(db.delete_todo(created.id).unwrap());
        assert!(!db.delete_todo(created.id).unwrap());
        assert!(db.get_todo(created.id).unwrap().is_none());
    }
}
