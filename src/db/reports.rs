use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use crate::errors::CyberImpactError;
use super::connection::db_err;
use super::Database;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReport {
    pub id: String,
    pub owner_id: String,
    pub repo_url: String,
    pub markdown: String,
    pub created_at: String,
}

impl Database {
    pub fn insert_report(&self, owner_id: &str, repo_url: &str, markdown: &str) -> Result<String, CyberImpactError> {
        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reports (id, owner_id, repo_url, markdown, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, owner_id, repo_url, markdown, Utc::now().to_rfc3339()],
        ).map_err(db_err("Failed to store report"))?;
        Ok(id)
    }

    pub fn get_report(&self, id: &str) -> Result<Option<StoredReport>, CyberImpactError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, owner_id, repo_url, markdown, created_at FROM reports WHERE id = ?1",
            params![id],
            |row| Ok(StoredReport {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                repo_url: row.get(2)?,
                markdown: row.get(3)?,
                created_at: row.get(4)?,
            }),
        )
        .optional()
        .map_err(db_err("Query failed"))
    }
}
