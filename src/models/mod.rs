pub mod document;
pub mod scan_result;
pub mod vulnerability;

pub use document::{DocumentKind, DocumentRecord};
pub use scan_result::{ScanResult, ToolOutput, ToolResult};
pub use vulnerability::{Severity, Vulnerability};
