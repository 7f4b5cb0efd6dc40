//! Error handling utilities for route handlers

use axum::http::StatusCode;

use crate::error::CoreError;

/// Extension trait for logging errors and converting to StatusCode
pub trait LogErr<T> {
    /// Log error with context and return a custom StatusCode
    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode> {
        self.map_err(|e| {
            tracing::error!("{}: {}", context, e);
            status
        })
    }
}

/// HTTP status for a core error: caller mistakes are 4xx, upstream platform
/// and token failures are 502.
pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::UnsupportedPlatform { .. }
        | CoreError::PastScheduleDate { .. }
        | CoreError::NoAccountsForPlatforms
        | CoreError::StateMismatch => StatusCode::BAD_REQUEST,
        CoreError::AlreadyPublished { .. } => StatusCode::CONFLICT,
        CoreError::VideoNotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::TokenExchangeFailed(_)
        | CoreError::TokenRefreshFailed(_)
        | CoreError::ProfileFetchFailed(_)
        | CoreError::Upload { .. }
        | CoreError::Http(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Extension trait for pipeline results: log with context and map the error
/// onto its status.
pub trait LogCoreErr<T> {
    fn log_api(self, context: &str) -> Result<T, StatusCode>;
}

impl<T> LogCoreErr<T> for Result<T, CoreError> {
    fn log_api(self, context: &str) -> Result<T, StatusCode> {
        let status = match &self {
            Ok(_) => StatusCode::OK,
            Err(e) => status_for(e),
        };
        self.log_status(context, status)
    }
}
