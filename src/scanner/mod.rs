pub mod extract;
pub mod invoker;
pub mod registry;
pub mod suggest;

pub use extract::extract_vulnerabilities;
pub use invoker::ScannerInvoker;
pub use registry::{ToolRegistry, ToolSpec};
pub use suggest::suggest_tools;
