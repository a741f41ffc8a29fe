pub mod orchestrator;

pub use orchestrator::{normalize_selection, AssetSource, AnalyzeOutcome, ExecuteOutcome, ScanOrchestrator, ScanOutput};
