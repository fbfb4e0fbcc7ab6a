// Centralized error handling for the tracker

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors produced while decoding announce parameters
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter format: {0}")]
    InvalidFormat(String),

    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("Invalid length for {param}: expected {expected}, got {actual}")]
    InvalidLength {
        param: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Errors produced while decoding an announce response body
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BencodeError {
    #[error("Invalid bencoded response: {0}")]
    Decode(String),

    #[error("Invalid value for key {key}: {reason}")]
    InvalidField { key: &'static str, reason: String },
}

impl From<serde_bencode::Error> for BencodeError {
    fn from(err: serde_bencode::Error) -> Self {
        BencodeError::Decode(err.to_string())
    }
}

/// Errors returned by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Errors that can occur during announce processing
#[derive(Error, Debug)]
pub enum AnnounceError {
    #[error("Malformed announce request: {0}")]
    Malformed(#[from] ValidationError),

    #[error("Storage {stage} failed: {source}")]
    Storage {
        stage: &'static str,
        #[source]
        source: StorageError,
    },
}

impl AnnounceError {
    /// HTTP status for this error.
    ///
    /// Malformed announces have always been answered with 500; `strict`
    /// switches them to 400.
    pub fn status(&self, strict: bool) -> StatusCode {
        match self {
            AnnounceError::Malformed(_) if strict => StatusCode::BAD_REQUEST,
            AnnounceError::Malformed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AnnounceError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response_with(self, strict: bool) -> Response {
        (self.status(strict), self.to_string()).into_response()
    }
}

impl IntoResponse for AnnounceError {
    fn into_response(self) -> Response {
        self.into_response_with(false)
    }
}

/// Reasons a manifest upload is rejected
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Manifest body is empty")]
    Empty,

    #[error("Manifest body is not valid UTF-8")]
    NotUtf8,

    #[error("Manifest body is not a JSON object")]
    NotAnObject,

    #[error("Invalid manifest document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the info hash and manifest registries
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Missing required parameter: {0}")]
    EmptyParameter(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    InvalidManifest(#[from] ManifestError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RegistryError {
    pub fn status(&self) -> StatusCode {
        match self {
            RegistryError::EmptyParameter(_) => StatusCode::BAD_REQUEST,
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::InvalidManifest(_) => StatusCode::BAD_REQUEST,
            RegistryError::Storage(StorageError::Conflict(_)) => StatusCode::CONFLICT,
            RegistryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_announce_is_legacy_500() {
        let err = AnnounceError::from(ValidationError::MissingParameter("info_hash"));
        assert_eq!(err.status(false), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.status(true), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_announce_error_ignores_strict() {
        let err = AnnounceError::Storage {
            stage: "read",
            source: StorageError::Unavailable("down".to_string()),
        };
        assert_eq!(err.status(true), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Storage read failed: Storage backend unavailable: down");
    }

    #[test]
    fn test_registry_error_statuses() {
        assert_eq!(
            RegistryError::EmptyParameter("name").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RegistryError::NotFound("tag".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RegistryError::from(ManifestError::Empty).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RegistryError::from(StorageError::Conflict("name".to_string())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RegistryError::from(StorageError::Backend(anyhow::anyhow!("boom"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_registry_error_response_is_plain_text() {
        use http_body_util::BodyExt;

        let response = RegistryError::NotFound("repo:tag".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"Not found: repo:tag");
    }
}
