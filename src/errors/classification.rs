use super::types::DashboardError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    /// Whether a manual retry could plausibly succeed. Drives the retry hint
    /// on error banners; nothing retries automatically.
    pub retryable: bool,
}

impl DashboardError {
    /// Classify this error to decide how it is presented to the user.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            DashboardError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            DashboardError::Http { status, .. } => ErrorClassification {
                error_type: "HttpError",
                retryable: *status >= 500 || *status == 429 || *status == 408,
            },
            DashboardError::Decode { .. } => ErrorClassification {
                error_type: "DecodeError",
                retryable: true,
            },

            DashboardError::Validation(_) => ErrorClassification {
                error_type: "ValidationError",
                retryable: false,
            },
            DashboardError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            DashboardError::InvalidArgument(_) => ErrorClassification {
                error_type: "InvalidArgumentError",
                retryable: false,
            },
            DashboardError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },

            DashboardError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: true,
            },
            DashboardError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: true,
            },
            DashboardError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: true,
            },
        }
    }
}
