//! Diesel schema for planning persistence.

diesel::table! {
    /// Project records.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Insertion order.
        position -> Int8,
        /// Project title.
        title -> Text,
        /// Canonical (naive UTC) deadline.
        deadline -> Timestamp,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records, optionally owned by a project.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Insertion order.
        position -> Int8,
        /// Task title.
        title -> Text,
        /// Optional description.
        description -> Nullable<Text>,
        /// Optional canonical (naive UTC) deadline.
        deadline -> Nullable<Timestamp>,
        /// Completion flag.
        completed -> Bool,
        /// Owning project, if any.
        project_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> projects (project_id));
diesel::allow_tables_to_appear_in_same_query!(projects, tasks);

/// Idempotent DDL creating the planning tables.
///
/// `position` columns are sequence-backed so list queries can return
/// records in insertion order. Deleting a project nulls the `project_id` of
/// its tasks rather than deleting them.
pub const CREATE_SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS projects (
    id UUID PRIMARY KEY,
    position BIGSERIAL NOT NULL,
    title TEXT NOT NULL,
    deadline TIMESTAMP NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE TABLE IF NOT EXISTS tasks (
    id UUID PRIMARY KEY,
    position BIGSERIAL NOT NULL,
    title TEXT NOT NULL,
    description TEXT NULL,
    deadline TIMESTAMP NULL,
    completed BOOLEAN NOT NULL DEFAULT FALSE,
    project_id UUID NULL REFERENCES projects (id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_projects_position ON projects (position);
CREATE INDEX IF NOT EXISTS idx_tasks_position ON tasks (position);
CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks (project_id);
CREATE INDEX IF NOT EXISTS idx_tasks_deadline ON tasks (deadline) WHERE deadline IS NOT NULL;
";
