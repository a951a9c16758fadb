//! SQLite schema definition.

/// Complete database schema for homeo-records.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Documents
-- ============================================================================

-- One JSON object per (collection, key). Patient records live in the
-- 'patients' collection keyed by case number.
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    doc_key TEXT NOT NULL,
    body TEXT NOT NULL CHECK (json_valid(body) AND json_type(body) = 'object'),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (collection, doc_key)
);

CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);

-- Name lookups are the only field query the record service issues.
CREATE INDEX IF NOT EXISTS idx_documents_name
    ON documents(collection, json_extract(body, '$.name'));
"#;
