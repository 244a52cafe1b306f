//! Database schema definitions
//!
//! Records are created by the ingestion step that fills the job queue; the
//! scraper only ever updates their `title` column.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS categorized_pages (
    url TEXT PRIMARY KEY NOT NULL,
    web_title TEXT
);
"#;

/// Initializes the database schema
///
/// Safe to call on an existing database; every statement is `IF NOT EXISTS`.
pub fn initialize_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
