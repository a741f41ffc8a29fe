use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::errors::CyberImpactError;

pub struct Database {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(path: &str) -> Result<Self, CyberImpactError> {
        // Ensure parent directory exists
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| CyberImpactError::Database(format!("Failed to open database: {}", e)))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| CyberImpactError::Database(format!("Failed to set pragmas: {}", e)))?;

        let db = Self { conn: Arc::new(Mutex::new(conn)) };
        db.initialize()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self, CyberImpactError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CyberImpactError::Database(format!("Failed to open in-memory db: {}", e)))?;
        let db = Self { conn: Arc::new(Mutex::new(conn)) };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<(), CyberImpactError> {
        let conn = self.lock()?;
        conn.execute_batch(super::schema::CREATE_TABLES)
            .map_err(|e| CyberImpactError::Database(format!("Failed to create tables: {}", e)))?;
        Ok(())
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, CyberImpactError> {
        self.conn
            .lock()
            .map_err(|_| CyberImpactError::Database("connection mutex poisoned".into()))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self { conn: self.conn.clone() }
    }
}

pub(crate) fn db_err(context: &str) -> impl Fn(rusqlite::Error) -> CyberImpactError + '_ {
    move |e| CyberImpactError::Database(format!("{}: {}", context, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_database_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/cyberimpact.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        assert!(path.exists());
        assert!(db.lock().is_ok());
    }

    #[test]
    fn test_clones_share_one_connection() {
        let db = Database::in_memory().unwrap();
        let other = db.clone();
        assert!(Arc::ptr_eq(&db.conn, &other.conn));

        other.lock().unwrap().execute_batch("CREATE TABLE shared_marker (id INTEGER)").unwrap();
        let count: i64 = db
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE name = 'shared_marker'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
