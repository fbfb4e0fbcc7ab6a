use crate::core::error::ManifestError;
use serde::Deserialize;

/// Distribution metadata stored under a tag name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    pub tag_name: String,
    /// Raw manifest document, stored and served verbatim
    pub manifest: String,
    pub flags: i64,
}

impl Manifest {
    pub fn new(tag_name: impl Into<String>, manifest: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            manifest: manifest.into(),
            flags: 0,
        }
    }
}

/// The part of an image manifest the tracker insists on
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestHeader {
    schema_version: u32,
    #[serde(default)]
    media_type: Option<String>,
}

/// Check that `body` is a manifest document and return it as text.
///
/// The body must be UTF-8 JSON holding an object with an integer
/// `schemaVersion`. The returned slice is the untouched input.
pub fn validate_manifest(body: &[u8]) -> Result<&str, ManifestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ManifestError::Empty);
    }

    let text = std::str::from_utf8(body).map_err(|_| ManifestError::NotUtf8)?;

    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(ManifestError::NotAnObject);
    }

    let header: ManifestHeader = serde_json::from_value(value)?;
    tracing::debug!(
        schema_version = header.schema_version,
        media_type = ?header.media_type,
        "Manifest document accepted"
    );

    Ok(text)
}

#[cfg(test)]
pub(crate) const SAMPLE_MANIFEST: &str = r#"{
     "schemaVersion": 2,
     "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
     "config": {
        "mediaType": "application/octet-stream",
        "size": 11936,
        "digest": "sha256:d2176faa6180566e5e6727e101ba26b13c19ef35f171c9b4419c4d50626aad9d"
     },
     "layers": [{
        "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip",
        "size": 52998821,
        "digest": "sha256:1508613826413590a9fdb496cbedb0c2ebf564cfbcd2c85c2a07bb3a40813233"
     },
     {
        "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip",
        "size": 115242848,
        "digest": "sha256:f1f1d5da237f1b069eae23cdc9b291e217a4c1fda8f29262c4275a786a4dd322"
      }]}"#;
