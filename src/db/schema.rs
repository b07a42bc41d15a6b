pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS refresh_status (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    last_update TEXT NOT NULL,
    items_count INTEGER NOT NULL
);
"#;
