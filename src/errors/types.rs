use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Transport-level failure: connection refused, DNS, TLS, reset.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The backend answered 2xx but the body did not match the declared shape.
    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DashboardError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            DashboardError::Config(_) | DashboardError::Yaml(_) => 2,
            DashboardError::Validation(_) | DashboardError::InvalidArgument(_) => 3,
            DashboardError::Network(_) => 4,
            DashboardError::Http { .. } => 5,
            DashboardError::Decode { .. } => 6,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_display_includes_status() {
        let err = DashboardError::Http { status: 404, message: "Not found.".into() };
        assert_eq!(err.to_string(), "HTTP 404: Not found.");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_decode_display_names_endpoint() {
        let err = DashboardError::Decode {
            endpoint: "/scan-results/3/".into(),
            message: "missing field `status`".into(),
        };
        assert!(err.to_string().contains("/scan-results/3/"));
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_exit_codes_distinguish_failure_kinds() {
        assert_eq!(DashboardError::Config("x".into()).exit_code(), 2);
        assert_eq!(DashboardError::Validation("x".into()).exit_code(), 3);
        assert_eq!(DashboardError::Network("x".into()).exit_code(), 4);
        assert_eq!(DashboardError::Http { status: 500, message: "x".into() }.exit_code(), 5);
        assert_eq!(
            DashboardError::Decode { endpoint: "/".into(), message: "x".into() }.exit_code(),
            6
        );
        assert_eq!(DashboardError::Internal("x".into()).exit_code(), 1);
    }
}
