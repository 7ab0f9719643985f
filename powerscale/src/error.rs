//! Provider-level error taxonomy

use crate::api::ApiError;
use crate::mapper::MappingError;
use crate::version::UnsupportedVersionError;
use thiserror::Error;
use tfplug::types::Diagnostic;

#[derive(Debug, Error)]
pub enum PowerscaleError {
    /// The plan or configuration is unacceptable before any remote call
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    RemoteApi(#[from] ApiError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedVersionError),

    /// The remote object does not exist
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Cancelled(#[from] tfplug::context::Cancelled),
}

pub type Result<T> = std::result::Result<T, PowerscaleError>;

impl PowerscaleError {
    /// True for absent objects, whether detected locally or reported by a 404
    pub fn is_not_found(&self) -> bool {
        match self {
            PowerscaleError::NotFound(_) => true,
            PowerscaleError::RemoteApi(e) => e.is_not_found(),
            _ => false,
        }
    }

    pub fn to_diagnostic(&self, summary: impl Into<String>) -> Diagnostic {
        Diagnostic::error(summary, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{OnefsVersion, ONEFS_9_5};

    #[test]
    fn not_found_covers_remote_404() {
        let remote = PowerscaleError::from(ApiError::ApiError {
            status: 404,
            message: "gone".to_string(),
            details: None,
        });
        assert!(remote.is_not_found());
        assert!(PowerscaleError::NotFound("ldap provider corp".into()).is_not_found());
        assert!(!PowerscaleError::Validation("bad".into()).is_not_found());
    }

    #[test]
    fn diagnostic_carries_error_text() {
        let err = PowerscaleError::from(UnsupportedVersionError {
            feature: "ocsp_server_uris".to_string(),
            required: ONEFS_9_5,
            actual: OnefsVersion::new(9, 4, 0),
        });
        let diag = err.to_diagnostic("Error creating ldap provider - corp");
        assert_eq!(diag.summary, "Error creating ldap provider - corp");
        assert!(diag.detail.contains("requires OneFS 9.5.0"));
    }
}
