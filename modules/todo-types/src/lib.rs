//! Shared types for the todo service and its HTTP clients.

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_CATEGORY_COLOR: &str = "#007AFF";
pub const DEFAULT_CATEGORY_ICON: &str = "📋";

// =====================================================
// Domain Types
// =====================================================

/// A named, colored grouping for todos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub sort_order: i64,
    pub created_at: String,
}

/// A category together with the number of todos filed under it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithCounts {
    #[serde(flatten)]
    pub category: Category,
    pub pending_count: i64,
    pub total_count: i64,
}

/// A todo item, enriched with the display fields of its category (if any)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub category_id: Option<i64>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub reminder_at: Option<String>,
    pub reminder_sent: bool,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub category_icon: Option<String>,
}

/// A freeform note with optional images and tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memo {
    pub id: i64,
    pub content: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Number of memos carrying a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}

/// An entry in the reminder hand-off queue, keyed by todo id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub todo_id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub reminder_at: String,
    pub category_name: Option<String>,
    pub created_at: String,
}

// =====================================================
// Filter / Query Types
// =====================================================

/// Query string for `GET /api/todos`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TodoQuery {
    #[serde(default, deserialize_with = "lenient_id")]
    pub category_id: Option<i64>,
    pub completed: Option<String>,
    pub search: Option<String>,
}

/// Parsed todo filter handed to the store
#[derive(Debug, Default, Clone)]
pub struct TodoFilter {
    pub category_id: Option<i64>,
    pub completed: Option<bool>,
    pub search: Option<String>,
}

/// Query string for `GET /api/memos`
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoFilter {
    pub tag: Option<String>,
    pub search: Option<String>,
}

// =====================================================
// Request Types
// =====================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub category_id: Option<i64>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub reminder_at: Option<String>,
}

/// Body of `PUT /api/todos/:id`.
///
/// `title` and `completed` keep their stored values when absent; every other
/// field is overwritten with whatever is supplied, absent meaning null.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub category_id: Option<i64>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub reminder_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ScheduleReminderRequest {
    #[serde(deserialize_with = "required_id")]
    pub todo_id: i64,
    #[serde(default)]
    pub title: String,
    pub notes: Option<String>,
    pub reminder_at: Option<String>,
    pub category_name: Option<String>,
}

// =====================================================
// Response Types
// =====================================================

/// Acknowledgement for mutations that return no entity
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
        }
    }

    pub fn with_message(msg: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(msg.into()),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(msg.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

// =====================================================
// Export Types
// =====================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
    pub categories: i64,
}

/// Full dump consumed by external sync agents
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub categories: Vec<Category>,
    pub todos: Vec<Todo>,
    pub stats: ExportStats,
    pub exported_at: String,
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub categories: i64,
    pub todos: i64,
    pub pending_todos: i64,
    pub memos: i64,
    pub queued_reminders: i64,
}

// =====================================================
// Serde helpers
// =====================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(i64),
    Str(String),
}

/// Accepts ids sent either as numbers or as numeric strings (HTML form values).
/// Empty strings count as absent.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IdRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdRepr::Int(id)) => Ok(Some(id)),
        Some(IdRepr::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(IdRepr::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {}", s))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
}

/// Accepts `true`/`false` as well as the `1`/`0` flags SQLite-backed clients send.
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FlagRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlagRepr::Bool(b)) => Ok(Some(b)),
        Some(FlagRepr::Int(1)) => Ok(Some(true)),
        Some(FlagRepr::Int(0)) => Ok(Some(false)),
        Some(FlagRepr::Int(n)) => Err(serde::de::Error::custom(format!(
            "invalid completed flag: {}",
            n
        ))),
    }
}

fn required_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_id(deserializer)?.ok_or_else(|| serde::de::Error::custom("id is required"))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
