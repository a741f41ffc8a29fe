use tracing::{info, warn};

use super::validation::validate_upload;
use crate::config::UploadConfig;
use crate::db::Database;
use crate::errors::CyberImpactError;
use crate::financial::{parse_inventory, BusinessAsset};
use crate::models::{DocumentKind, DocumentRecord};

/// Per-user document storage. Every read checks ownership; documents owned by
/// someone else look exactly like missing ones.
#[derive(Clone)]
pub struct DocumentStore {
    db: Database,
    config: UploadConfig,
}

impl DocumentStore {
    pub fn new(db: Database, config: UploadConfig) -> Self {
        Self { db, config }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn upload(
        &self,
        kind: DocumentKind,
        filename: &str,
        content: &[u8],
        uploader_id: &str,
    ) -> Result<DocumentRecord, CyberImpactError> {
        let file_type = validate_upload(&self.config, kind, filename, content.len() as u64)?;
        let record = self.db.insert_document(kind, filename, &file_type, uploader_id, content)?;
        info!(id = %record.id, kind = %kind, size = record.file_size, uid = %uploader_id, "Document stored");
        Ok(record)
    }

    pub fn list(&self, uploader_id: &str, kind: DocumentKind) -> Result<Vec<DocumentRecord>, CyberImpactError> {
        self.db.list_documents(uploader_id, kind)
    }

    pub fn get(&self, id: &str, uploader_id: &str) -> Result<DocumentRecord, CyberImpactError> {
        self.db
            .get_document(id)?
            .filter(|record| record.uploader_id == uploader_id)
            .ok_or_else(|| CyberImpactError::NotFound(format!("Document {} not found", id)))
    }

    pub fn content(&self, id: &str, uploader_id: &str) -> Result<(DocumentRecord, Vec<u8>), CyberImpactError> {
        let record = self.get(id, uploader_id)?;
        let bytes = self
            .db
            .get_document_content(id)?
            .ok_or_else(|| CyberImpactError::NotFound(format!("Document {} not found", id)))?;
        Ok((record, bytes))
    }

    pub fn delete(&self, id: &str, uploader_id: &str) -> Result<(), CyberImpactError> {
        self.get(id, uploader_id)?;
        self.db.delete_document(id)?;
        info!(id, uid = %uploader_id, "Document deleted");
        Ok(())
    }

    /// Business assets from the user's JSON inventories. Inventories in other
    /// formats are stored but not parsed; broken ones are skipped with a warning.
    pub fn business_assets(&self, uploader_id: &str) -> Result<Vec<BusinessAsset>, CyberImpactError> {
        let mut assets = Vec::new();
        for (record, bytes) in self.db.document_contents(uploader_id, DocumentKind::AssetInventory)? {
            if record.file_type != ".json" {
                continue;
            }
            match parse_inventory(&bytes) {
                Ok(parsed) => assets.extend(parsed),
                Err(e) => warn!(id = %record.id, filename = %record.filename, error = %e, "Skipping unreadable inventory"),
            }
        }
        Ok(assets)
    }
}
