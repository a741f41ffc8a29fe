use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use crate::errors::CyberImpactError;
use crate::models::{DocumentKind, DocumentRecord};
use super::connection::db_err;
use super::Database;

const RECORD_COLUMNS: &str = "id, kind, filename, file_type, file_size, upload_date, uploader_id";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentRecord> {
    let kind: String = row.get(1)?;
    let kind = DocumentKind::parse(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, format!("unknown kind {}", kind).into())
    })?;
    Ok(DocumentRecord {
        id: row.get(0)?,
        kind,
        filename: row.get(2)?,
        file_type: row.get(3)?,
        file_size: row.get::<_, i64>(4)? as u64,
        upload_date: row.get(5)?,
        uploader_id: row.get(6)?,
    })
}

impl Database {
    pub fn insert_document(
        &self,
        kind: DocumentKind,
        filename: &str,
        file_type: &str,
        uploader_id: &str,
        content: &[u8],
    ) -> Result<DocumentRecord, CyberImpactError> {
        let record = DocumentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            filename: filename.to_string(),
            file_type: file_type.to_string(),
            file_size: content.len() as u64,
            upload_date: Utc::now().to_rfc3339(),
            uploader_id: uploader_id.to_string(),
        };

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (id, kind, filename, file_type, file_size, uploader_id, content, upload_date) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id,
                kind.as_str(),
                record.filename,
                record.file_type,
                record.file_size as i64,
                record.uploader_id,
                content,
                record.upload_date,
            ],
        ).map_err(db_err("Failed to store document"))?;
        Ok(record)
    }

    /// Newest first.
    pub fn list_documents(&self, uploader_id: &str, kind: DocumentKind) -> Result<Vec<DocumentRecord>, CyberImpactError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents WHERE uploader_id = ?1 AND kind = ?2 ORDER BY upload_date DESC, rowid DESC",
            RECORD_COLUMNS
        )).map_err(db_err("Query failed"))?;

        let rows = stmt.query_map(params![uploader_id, kind.as_str()], record_from_row)
            .map_err(db_err("Query failed"))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err("Row decode failed"))
    }

    pub fn get_document(&self, id: &str) -> Result<Option<DocumentRecord>, CyberImpactError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {} FROM documents WHERE id = ?1", RECORD_COLUMNS),
            params![id],
            record_from_row,
        )
        .optional()
        .map_err(db_err("Query failed"))
    }

    pub fn get_document_content(&self, id: &str) -> Result<Option<Vec<u8>>, CyberImpactError> {
        let conn = self.lock()?;
        conn.query_row("SELECT content FROM documents WHERE id = ?1", params![id], |row| row.get(0))
            .optional()
            .map_err(db_err("Query failed"))
    }

    /// Contents of every document of `kind` the user uploaded, oldest first.
    pub fn document_contents(&self, uploader_id: &str, kind: DocumentKind) -> Result<Vec<(DocumentRecord, Vec<u8>)>, CyberImpactError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, content FROM documents WHERE uploader_id = ?1 AND kind = ?2 ORDER BY upload_date ASC, rowid ASC",
            RECORD_COLUMNS
        )).map_err(db_err("Query failed"))?;

        let rows = stmt.query_map(params![uploader_id, kind.as_str()], |row| {
            Ok((record_from_row(row)?, row.get::<_, Vec<u8>>(7)?))
        }).map_err(db_err("Query failed"))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err("Row decode failed"))
    }

    pub fn delete_document(&self, id: &str) -> Result<bool, CyberImpactError> {
        let conn = self.lock()?;
        let affected = conn.execute("DELETE FROM documents WHERE id = ?1", params![id])
            .map_err(db_err("Delete failed"))?;
        Ok(affected > 0)
    }
}
