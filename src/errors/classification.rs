use super::types::CyberImpactError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl CyberImpactError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        let (error_type, retryable) = match self {
            // Transient upstream failures
            CyberImpactError::RateLimit(_) => ("RateLimitError", true),
            CyberImpactError::Network(_) => ("NetworkError", true),
            CyberImpactError::Timeout(_) => ("TimeoutError", true),
            CyberImpactError::LlmApi(_) => ("LlmApiError", true),
            CyberImpactError::ServiceUnavailable(_) => ("ServiceUnavailableError", true),

            // Caller or configuration mistakes
            CyberImpactError::InvalidRepository(_) => ("InvalidRepositoryError", false),
            CyberImpactError::Unauthorized(_) => ("UnauthorizedError", false),
            CyberImpactError::InvalidFileType(_) => ("InvalidFileTypeError", false),
            CyberImpactError::FileTooLarge(_) => ("FileTooLargeError", false),
            CyberImpactError::NoToolsSelected => ("NoToolsSelectedError", false),
            CyberImpactError::NotFound(_) => ("NotFoundError", false),
            CyberImpactError::BadRequest(_) => ("BadRequestError", false),
            CyberImpactError::Config(_) => ("ConfigError", false),
            CyberImpactError::Yaml(_) => ("YamlError", false),

            // Enrichment failures are reported inline, never retried
            CyberImpactError::ToolExecution(_) => ("ToolExecutionError", false),
            CyberImpactError::SummarizerUnavailable(_) => ("SummarizerUnavailableError", false),
            CyberImpactError::FinancialAnalysisUnavailable(_) => {
                ("FinancialAnalysisUnavailableError", false)
            }

            CyberImpactError::Git(_) => ("GitError", true),
            CyberImpactError::Database(_) => ("DatabaseError", true),
            CyberImpactError::Io(_) => ("IoError", true),
            CyberImpactError::Json(_) => ("JsonError", true),
            CyberImpactError::Internal(_) => ("InternalError", true),
        };

        ErrorClassification { error_type, retryable }
    }
}
