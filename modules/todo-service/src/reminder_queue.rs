//! Hand-off queue for an out-of-process reminder agent.
//!
//! The `reminder_queue` table is the source of truth. After every write the
//! whole queue is mirrored to a JSON file for the agent to read. Writers are
//! serialized by `write_lock` so the file always reflects the latest table
//! state, and the file is replaced by rename so readers never see a partial
//! write.

use crate::db::{Db, now_timestamp};
use crate::error::ApiResult;
use std::path::{Path, PathBuf};
use todo_types::ReminderEntry;
use tokio::sync::Mutex;

pub struct ReminderQueue {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ReminderQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Upsert the entry for `todo_id` and rewrite the mirror file.
    pub async fn schedule(
        &self,
        db: &Db,
        todo_id: i64,
        title: String,
        notes: Option<String>,
        reminder_at: String,
        category_name: Option<String>,
    ) -> ApiResult<ReminderEntry> {
        let entry = ReminderEntry {
            todo_id,
            title,
            notes,
            reminder_at,
            category_name,
            created_at: now_timestamp(),
        };

        let _guard = self.write_lock.lock().await;
        let queue = db.upsert_reminder_entry(&entry)?;
        self.write_file(&queue).await?;

        log::info!(
            "Reminder queued for todo #{} \"{}\" at {}",
            entry.todo_id,
            entry.title,
            entry.reminder_at
        );
        Ok(entry)
    }

    /// Rewrite the mirror file from the table, e.g. at startup.
    pub async fn sync(&self, db: &Db) -> ApiResult<usize> {
        let _guard = self.write_lock.lock().await;
        let queue = db.list_reminder_queue()?;
        self.write_file(&queue).await?;
        Ok(queue.len())
    }

    async fn write_file(&self, queue: &[ReminderEntry]) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(queue)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn read_file(path: &Path) -> Vec<ReminderEntry> {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_schedule_replaces_entry_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::open(":memory:", false).unwrap();
        let queue = ReminderQueue::new(dir.path().join("pending_reminders.json"));

        queue
            .schedule(&db, 1, "a".into(), None, "2024-01-01T09:00:00Z".into(), None)
            .await
            .unwrap();
        queue
            .schedule(
                &db,
                1,
                "a (moved)".into(),
                Some("n".into()),
                "2024-01-02T09:00:00Z".into(),
                Some("Work".into()),
            )
            .await
            .unwrap();

        let entries = read_file(queue.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "a (moved)");
        assert_eq!(entries[0].category_name.as_deref(), Some("Work"));
        assert!(!dir.path().join("pending_reminders.json.tmp").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_schedules_keep_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Db::open(":memory:", false).unwrap());
        let queue = Arc::new(ReminderQueue::new(dir.path().join("queue.json")));

        let handles: Vec<_> = (1..=16)
            .map(|id| {
                let db = db.clone();
                let queue = queue.clone();
                tokio::spawn(async move {
                    queue
                        .schedule(&db, id, format!("t{}", id), None, "2024-01-01T00:00:00Z".into(), None)
                        .await
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(read_file(queue.path()).len(), 16);
    }

    #[tokio::test]
    async fn test_sync_recovers_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.json");
        let db = Db::open(":memory:", false).unwrap();
        let queue = ReminderQueue::new(&path);
        queue
            .schedule(&db, 3, "t".into(), None, "2024-01-01T00:00:00Z".into(), None)
            .await
            .unwrap();

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(queue.sync(&db).await.unwrap(), 1);
        assert_eq!(read_file(&path)[0].todo_id, 3);
    }
}
