use std::path::Path;

use crate::config::UploadConfig;
use crate::errors::CyberImpactError;
use crate::models::DocumentKind;

pub fn allowed_extensions(config: &UploadConfig, kind: DocumentKind) -> &[String] {
    match kind {
        DocumentKind::Financial => &config.financial_extensions,
        DocumentKind::AssetInventory => &config.asset_extensions,
    }
}

/// Lowercase extension with its dot, if the name has one.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
}

/// Type first, then size; both before anything is written. Returns the
/// normalized extension.
pub fn validate_upload(
    config: &UploadConfig,
    kind: DocumentKind,
    filename: &str,
    size: u64,
) -> Result<String, CyberImpactError> {
    let allowed = allowed_extensions(config, kind);
    let ext = file_extension(filename)
        .filter(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .ok_or_else(|| {
            CyberImpactError::InvalidFileType(format!(
                "{} must be one of: {}",
                kind.label(),
                allowed.join(", ")
            ))
        })?;

    if size > config.max_file_size {
        return Err(CyberImpactError::FileTooLarge(format!(
            "{} bytes exceeds the {} byte limit",
            size, config.max_file_size
        )));
    }
    Ok(ext)
}
