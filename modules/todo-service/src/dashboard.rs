//! Dashboard HTML page handler.
//!
//! Serves a self-contained HTML page with inline CSS showing categories,
//! open todos, due reminders and recent memos.

use crate::routes::AppState;
use crate::validate;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use std::sync::Arc;
use todo_types::{MemoFilter, TodoFilter};

const RECENT_MEMOS: usize = 10;

pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let categories = state.db.list_categories().unwrap_or_default();
    let open_todos = state
        .db
        .list_todos(&TodoFilter {
            completed: Some(false),
            ..Default::default()
        })
        .unwrap_or_default();
    let pending = state
        .db
        .pending_reminders(&validate::reminder_now())
        .unwrap_or_default();
    let memos = state.db.list_memos(&MemoFilter::default()).unwrap_or_default();
    let tags = state.db.memo_tag_counts().unwrap_or_default();
    let uptime = state.start_time.elapsed().as_secs();

    let mut category_rows = String::new();
    for c in &categories {
        category_rows.push_str(&format!(
            "<tr><td><span class=\"dot\" style=\"background:{}\"></span>{} {}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&c.category.color),
            escape(&c.category.icon),
            escape(&c.category.name),
            c.pending_count,
            c.total_count
        ));
    }

    let mut todo_rows = String::new();
    for t in &open_todos {
        let due = match (&t.due_date, &t.due_time) {
            (Some(d), Some(tm)) => format!("{} {}", d, tm),
            (Some(d), None) => d.clone(),
            _ => "-".to_string(),
        };
        todo_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            t.id,
            escape(&t.title),
            escape(t.category_name.as_deref().unwrap_or("-")),
            escape(&due)
        ));
    }

    let mut reminder_rows = String::new();
    for t in &pending {
        reminder_rows.push_str(&format!(
            "<li>🔔 {} <span class=\"muted\">{}</span></li>\n",
            escape(&t.title),
            escape(t.reminder_at.as_deref().unwrap_or(""))
        ));
    }
    if reminder_rows.is_empty() {
        reminder_rows.push_str("<li class=\"muted\">No reminders due.</li>");
    }

    let mut memo_items = String::new();
    for m in memos.iter().take(RECENT_MEMOS) {
        let tag_html: String = m
            .tags
            .iter()
            .map(|t| format!("<span class=\"tag\">#{}</span>", escape(t)))
            .collect();
        memo_items.push_str(&format!(
            "<li><div>{}</div><div class=\"muted\">{} {} · {} image(s)</div></li>\n",
            escape(&m.content),
            escape(&m.created_at),
            tag_html,
            m.images.len()
        ));
    }

    let tag_cloud: String = tags
        .iter()
        .map(|t| format!("<span class=\"tag\">#{} ({})</span>", escape(&t.name), t.count))
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Todo &amp; Memo Dashboard</title>
<style>
  body {{ font-family: -apple-system, sans-serif; margin: 2rem; background: #f5f5f7; color: #1d1d1f; }}
  h1 {{ font-size: 1.5rem; }}
  h2 {{ font-size: 1.1rem; margin-top: 2rem; }}
  table {{ border-collapse: collapse; width: 100%; background: #fff; }}
  td, th {{ padding: 6px 10px; border-bottom: 1px solid #e5e5ea; text-align: left; }}
  .dot {{ display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 6px; }}
  .muted {{ color: #8e8e93; font-size: 0.85rem; }}
  .tag {{ background: #e5f0ff; color: #007aff; border-radius: 4px; padding: 1px 6px; margin-right: 4px; font-size: 0.85rem; }}
  ul {{ background: #fff; padding: 10px 30px; }}
</style>
</head>
<body>
<h1>Todo &amp; Memo</h1>
<p class="muted">{open} open todos · {memo_count} memos · up {uptime}s</p>
<h2>Categories</h2>
<table><tr><th>Name</th><th>Pending</th><th>Total</th></tr>
{category_rows}</table>
<h2>Due reminders</h2>
<ul>{reminder_rows}</ul>
<h2>Open todos</h2>
<table><tr><th>#</th><th>Title</th><th>Category</th><th>Due</th></tr>
{todo_rows}</table>
<h2>Recent memos</h2>
<p>{tag_cloud}</p>
<ul>{memo_items}</ul>
</body>
</html>"#,
        open = open_todos.len(),
        memo_count = memos.len(),
        uptime = uptime,
        category_rows = category_rows,
        reminder_rows = reminder_rows,
        todo_rows = todo_rows,
        tag_cloud = tag_cloud,
        memo_items = memo_items,
    );

    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
