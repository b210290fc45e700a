//! Memo operations. `images` and `tags` are JSON text columns here and plain
//! string lists everywhere else.

use super::{Db, like_pattern, now_timestamp};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Result as SqliteResult};
use std::collections::HashMap;
use todo_types::{Memo, MemoFilter, TagCount};

const MEMO_SELECT: &str = "SELECT id, content, images, tags, created_at, updated_at FROM memos";

impl Db {
    pub fn list_memos(&self, filter: &MemoFilter) -> SqliteResult<Vec<Memo>> {
        let conn = self.conn();
        let mut conditions = vec!["1=1".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let mut param_idx = 1u32;

        // Substring match against the serialized tag list.
        if let Some(ref tag) = filter.tag {
            conditions.push(format!("tags LIKE ?{} ESCAPE '\\'", param_idx));
            params.push(Box::new(like_pattern(tag)));
            param_idx += 1;
        }
        if let Some(ref search) = filter.search {
            conditions.push(format!("content LIKE ?{} ESCAPE '\\'", param_idx));
            params.push(Box::new(like_pattern(search)));
            param_idx += 1;
        }
        let _ = param_idx;

        let sql = format!(
            "{} WHERE {} ORDER BY created_at DESC, id DESC",
            MEMO_SELECT,
            conditions.join(" AND ")
        );
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(param_refs.as_slice(), row_to_memo)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn get_memo(&self, id: i64) -> SqliteResult<Option<Memo>> {
        let conn = self.conn();
        get_memo_impl(&conn, id)
    }

    /// Tag usage across all memos, most used first.
    pub fn memo_tag_counts(&self) -> SqliteResult<Vec<TagCount>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT tags FROM memos WHERE tags IS NOT NULL")?;
        let tag_lists = stmt
            .query_map([], |row| decode_list(row, 0))?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut counts: HashMap<String, i64> = HashMap::new();
        for tags in tag_lists {
            for tag in tags {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }

        let mut result: Vec<TagCount> = counts
            .into_iter()
            .map(|(name, count)| TagCount { name, count })
            .collect();
        result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(result)
    }

    pub fn create_memo(&self, content: &str, images: &[String], tags: &[String]) -> SqliteResult<Memo> {
        let conn = self.conn();
        let now = now_timestamp();
        let tags = normalize_tags(tags);
        conn.execute(
            "INSERT INTO memos (content, images, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            rusqlite::params![content, encode_list(images)?, encode_list(&tags)?, now],
        )?;
        let id = conn.last_insert_rowid();
        get_memo_impl(&conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    /// Replace content, images and tags. Returns `None` for unknown ids.
    pub fn update_memo(
        &self,
        id: i64,
        content: &str,
        images: &[String],
        tags: &[String],
    ) -> SqliteResult<Option<Memo>> {
        let conn = self.conn();
        let tags = normalize_tags(tags);
        let rows = conn.execute(
            "UPDATE memos SET content = ?1, images = ?2, tags = ?3, updated_at = ?4 WHERE id = ?5",
            rusqlite::params![
                content,
                encode_list(images)?,
                encode_list(&tags)?,
                now_timestamp(),
                id
            ],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        get_memo_impl(&conn, id)
    }

    pub fn delete_memo(&self, id: i64) -> SqliteResult<bool> {
        let rows = self.conn().execute("DELETE FROM memos WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

fn get_memo_impl(conn: &rusqlite::Connection, id: i64) -> SqliteResult<Option<Memo>> {
    conn.query_row(&format!("{} WHERE id = ?1", MEMO_SELECT), [id], row_to_memo)
        .optional()
}

/// Trim, drop blanks and duplicates, keep first-seen order.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Empty lists are stored as NULL.
fn encode_list(items: &[String]) -> SqliteResult<Option<String>> {
    if items.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(items)
        .map(Some)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn decode_list(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: Option<String> = row.get(idx)?;
    match raw.as_deref() {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

fn row_to_memo(row: &rusqlite::Row) -> rusqlite::Result<Memo> {
    Ok(Memo {
        id: row.get(0)?,
        content: row.get(1)?,
        images: decode_list(row, 2)?,
        tags: decode_list(row, 3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
