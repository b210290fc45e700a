//! Full export and status counters.

use super::categories::list_plain_categories;
use super::todos::{TODO_SELECT, row_to_todo};
use super::{Db, now_timestamp};
use rusqlite::Result as SqliteResult;
use todo_types::{ExportData, ExportStats, ServiceStatus};

impl Db {
    /// Dump every category and todo (newest first, joined with category
    /// fields) together with aggregate counts.
    pub fn export_all(&self) -> SqliteResult<ExportData> {
        let conn = self.conn();
        let categories = list_plain_categories(&conn)?;

        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY t.created_at DESC, t.id DESC",
            TODO_SELECT
        ))?;
        let todos = stmt
            .query_map([], row_to_todo)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let completed = todos.iter().filter(|t| t.completed).count() as i64;
        let stats = ExportStats {
            total: todos.len() as i64,
            pending: todos.len() as i64 - completed,
            completed,
            categories: categories.len() as i64,
        };

        Ok(ExportData {
            categories,
            todos,
            stats,
            exported_at: now_timestamp(),
        })
    }

    pub fn service_status(&self, uptime_secs: u64) -> SqliteResult<ServiceStatus> {
        Ok(ServiceStatus {
            running: true,
            uptime_secs,
            categories: self.count("SELECT COUNT(*) FROM categories")?,
            todos: self.count("SELECT COUNT(*) FROM todos")?,
            pending_todos: self.count("SELECT COUNT(*) FROM todos WHERE completed = 0")?,
            memos: self.count("SELECT COUNT(*) FROM memos")?,
            queued_reminders: self.count("SELECT COUNT(*) FROM reminder_queue")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_types::CreateTodoRequest;

    #[test]
    fn test_export_stats() {
        let db = Db::open(":memory:", true).unwrap();
        let cat = db.create_category("Errands", "#007AFF", "📋").unwrap();
        for title in ["a", "b", "c"] {
            db.create_todo(&CreateTodoRequest {
                title: title.to_string(),
                category_id: Some(cat.id),
                ..Default::default()
            })
            .unwrap();
        }
        let newest = db.list_todos(&Default::default()).unwrap()[0].id;
        db.toggle_todo(newest).unwrap();

        let export = db.export_all().unwrap();
        assert_eq!(
            export.stats,
            ExportStats {
                total: 3,
                pending: 2,
                completed: 1,
                categories: 6,
            }
        );
        assert_eq!(export.todos[0].title, "c");
        assert_eq!(export.todos[0].category_name.as_deref(), Some("Errands"));
        assert!(!export.exported_at.is_empty());
    }

    #[test]
    fn test_service_status_counts() {
        let db = Db::open(":memory:", false).unwrap();
        db.create_memo("m", &[], &[]).unwrap();
        let status = db.service_status(7).unwrap();
        assert!(status.running);
        assert_eq!(status.uptime_secs, 7);
        assert_eq!(status.memos, 1);
        assert_eq!(status.todos, 0);
    }
}
