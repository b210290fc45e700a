//! Category operations.

use super::{Db, now_timestamp};
use rusqlite::{OptionalExtension, Result as SqliteResult};
use todo_types::{Category, CategoryWithCounts};

impl Db {
    /// All categories with their pending/total todo counts, ordered by
    /// `sort_order` then `id`.
    pub fn list_categories(&self) -> SqliteResult<Vec<CategoryWithCounts>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.color, c.icon, c.sort_order, c.created_at,
                    COUNT(CASE WHEN t.completed = 0 THEN 1 END) AS pending_count,
                    COUNT(t.id) AS total_count
             FROM categories c
             LEFT JOIN todos t ON t.category_id = c.id
             GROUP BY c.id
             ORDER BY c.sort_order, c.id",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(CategoryWithCounts {
                    category: row_to_category(row)?,
                    pending_count: row.get(6)?,
                    total_count: row.get(7)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn get_category(&self, id: i64) -> SqliteResult<Option<Category>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, color, icon, sort_order, created_at FROM categories WHERE id = ?1",
            [id],
            row_to_category,
        )
        .optional()
    }

    pub fn category_exists(&self, id: i64) -> SqliteResult<bool> {
        let conn = self.conn();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )
    }

    pub fn create_category(&self, name: &str, color: &str, icon: &str) -> SqliteResult<Category> {
        let conn = self.conn();
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO categories (name, color, icon, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![name, color, icon, now],
        )?;
        Ok(Category {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
            sort_order: 0,
            created_at: now,
        })
    }

    /// Replace name, color and icon. Returns `None` when the category does not exist.
    pub fn update_category(
        &self,
        id: i64,
        name: &str,
        color: &str,
        icon: &str,
    ) -> SqliteResult<Option<Category>> {
        let rows = self.conn().execute(
            "UPDATE categories SET name = ?1, color = ?2, icon = ?3 WHERE id = ?4",
            rusqlite::params![name, color, icon, id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        self.get_category(id)
    }

    /// Detach the category's todos, then remove the category.
    /// Returns whether a category row was removed.
    pub fn delete_category(&self, id: i64) -> SqliteResult<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let detached = tx.execute(
            "UPDATE todos SET category_id = NULL, updated_at = ?1 WHERE category_id = ?2",
            rusqlite::params![now_timestamp(), id],
        )?;
        let rows = tx.execute("DELETE FROM categories WHERE id = ?1", [id])?;
        tx.commit()?;
        if detached > 0 {
            log::info!("Detached {} todos from deleted category #{}", detached, id);
        }
        Ok(rows > 0)
    }
}

fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
        sort_order: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(super) fn list_plain_categories(conn: &rusqlite::Connection) -> SqliteResult<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, color, icon, sort_order, created_at
         FROM categories ORDER BY sort_order, id",
    )?;
    let entries = stmt
        .query_map([], row_to_category)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(entries)
}
