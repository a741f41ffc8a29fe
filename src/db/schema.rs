pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    filename TEXT NOT NULL,
    file_type TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    uploader_id TEXT NOT NULL,
    content BLOB NOT NULL,
    upload_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    repo_url TEXT NOT NULL,
    markdown TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_owner_kind ON documents(uploader_id, kind);
CREATE INDEX IF NOT EXISTS idx_reports_owner ON reports(owner_id);
";
