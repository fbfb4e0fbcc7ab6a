//! Storage backend interface
//!
//! Peer records are keyed by `(info_hash, peer_id)`; the info hash is
//! hex-encoded whenever a backend needs a textual key. Implementations must
//! be safe for concurrent use; the tracker performs no locking of its own.

pub mod memory;

use crate::models::manifest::Manifest;
use crate::models::peer::{InfoHash, PeerInfo};
use crate::models::torrent::TorrentInfo;
use async_trait::async_trait;

pub use crate::core::error::StorageError;
pub use memory::MemoryStorage;

pub type StorageResult<T> = Result<T, StorageError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// All known peers for `info_hash`; empty when there are none
    async fn read(&self, info_hash: &InfoHash) -> StorageResult<Vec<PeerInfo>>;

    /// Insert or overwrite the record for `(peer.info_hash, peer.peer_id)`
    async fn update(&self, peer: &PeerInfo) -> StorageResult<()>;

    /// `Ok(None)` when no torrent is registered under `name`
    async fn read_torrent(&self, name: &str) -> StorageResult<Option<TorrentInfo>>;

    async fn create_torrent(&self, torrent: &TorrentInfo) -> StorageResult<()>;

    /// `Ok(None)` when no manifest is stored under `name`
    async fn read_manifest(&self, name: &str) -> StorageResult<Option<Manifest>>;

    async fn update_manifest(&self, manifest: &Manifest) -> StorageResult<()>;
}
