use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Financial,
    AssetInventory,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Financial => "financial",
            DocumentKind::AssetInventory => "asset_inventory",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "financial" => Some(DocumentKind::Financial),
            "asset_inventory" => Some(DocumentKind::AssetInventory),
            _ => None,
        }
    }

    /// Human label used in API messages.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Financial => "Financial document",
            DocumentKind::AssetInventory => "Asset inventory",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of an uploaded document. Content is fetched separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub kind: DocumentKind,
    pub filename: String,
    /// Lowercase extension including the dot (`.pdf`).
    pub file_type: String,
    pub file_size: u64,
    /// RFC 3339.
    pub upload_date: String,
    pub uploader_id: String,
}
