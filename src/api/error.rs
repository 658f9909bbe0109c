use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

pub const GENERIC_ERROR_MESSAGE: &str = "Something bad happened; please try again later.";

/// The only failure callers of the movie API ever see. The underlying cause is logged
/// at the boundary and dropped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Something bad happened; please try again later.")]
pub struct ApiError;

#[derive(Debug, Error)]
pub(crate) enum Failure {
    #[error("no session {0} available")]
    Session(&'static str),
    #[error("session store unreadable: {0:#}")]
    SessionStore(anyhow::Error),
    #[error("Some error occurred: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Error status code {status}, Error body is: {body}")]
    Status { status: StatusCode, body: String },
}

impl Failure {
    /// Logs the detailed cause and collapses it into [`ApiError`].
    pub(crate) fn normalize(self, operation: &str) -> ApiError {
        warn!(operation, "{}", self);
        ApiError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_collapses_to_the_same_message() {
        let failures = [
            Failure::Session("token"),
            Failure::SessionStore(anyhow::anyhow!("disk on fire")),
            Failure::Status {
                status: StatusCode::UNAUTHORIZED,
                body: "Unauthorized".to_string(),
            },
        ];
        for failure in failures {
            let err = failure.normalize("test");
            assert_eq!(err.to_string(), GENERIC_ERROR_MESSAGE);
        }
    }
}
