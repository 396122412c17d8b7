//! Diesel row models for planning persistence.

use super::schema::{projects, tasks};
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for project records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: Uuid,
    /// Project title.
    pub title: String,
    /// Canonical deadline.
    pub deadline: NaiveDateTime,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for project records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProjectRow {
    /// Project identifier.
    pub id: Uuid,
    /// Project title.
    pub title: String,
    /// Canonical deadline.
    pub deadline: NaiveDateTime,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Update model for mutable project columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = projects)]
pub struct ProjectChangeset {
    /// Project title.
    pub title: String,
    /// Canonical deadline.
    pub deadline: NaiveDateTime,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional canonical deadline.
    pub deadline: Option<NaiveDateTime>,
    /// Completion flag.
    pub completed: bool,
    /// Owning project, if any.
    pub project_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional canonical deadline.
    pub deadline: Option<NaiveDateTime>,
    /// Completion flag.
    pub completed: bool,
    /// Owning project, if any.
    pub project_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Update model for mutable task columns.
///
/// `None` values are written as `NULL` so that cleared fields persist.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional canonical deadline.
    pub deadline: Option<NaiveDateTime>,
    /// Completion flag.
    pub completed: bool,
    /// Owning project, if any.
    pub project_id: Option<Uuid>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
