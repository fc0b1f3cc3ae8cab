//! SQL schema for the Nippo SQLite store.
//!
//! Executed once at connection startup. The version is recorded in
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per sheet row. row_num is the 1-based sheet position;
-- row 1 holds the header. Rows are never deleted.
CREATE TABLE IF NOT EXISTS sheet_rows (
    row_num  INTEGER PRIMARY KEY,
    cells    TEXT NOT NULL           -- JSON array of cell strings
);

PRAGMA user_version = 1;
";

/// Seeds the header row into an empty sheet.
pub const SEED_HEADER: &str = "
INSERT INTO sheet_rows (row_num, cells)
SELECT 1, ?1
WHERE NOT EXISTS (SELECT 1 FROM sheet_rows)
";
