use super::{Storage, StorageError, StorageResult};
use crate::models::manifest::Manifest;
use crate::models::peer::{AnnounceEvent, InfoHash, PeerId, PeerInfo};
use crate::models::torrent::TorrentInfo;
use crate::utils::time::{current_timestamp, is_expired};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Clone, Debug)]
struct PeerRecord {
    peer: PeerInfo,
    last_announce: i64,
}

/// In-memory storage backend
///
/// Peers are grouped per swarm under the hex-encoded info hash.
pub struct MemoryStorage {
    peers: DashMap<String, DashMap<PeerId, PeerRecord>>,
    torrents: DashMap<String, TorrentInfo>,
    manifests: DashMap<String, Manifest>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            peers: DashMap::new(),
            torrents: DashMap::new(),
            manifests: DashMap::new(),
        }
    }

    fn update_at(&self, peer: &PeerInfo, timestamp: i64) {
        let swarm = self
            .peers
            .entry(peer.info_hash.to_hex())
            .or_insert_with(DashMap::new);

        swarm.insert(
            peer.peer_id,
            PeerRecord {
                peer: peer.clone(),
                last_announce: timestamp,
            },
        );
    }

    /// Drop peers that sent `stopped` or have been silent longer than `timeout` seconds.
    ///
    /// Returns the number of peers removed.
    pub fn reap(&self, timeout: i64) -> usize {
        self.reap_at(timeout, current_timestamp())
    }

    fn reap_at(&self, timeout: i64, current_time: i64) -> usize {
        let mut removed_count = 0;

        for swarm in self.peers.iter() {
            let before = swarm.len();
            swarm.retain(|_, record| {
                record.peer.event != Some(AnnounceEvent::Stopped)
                    && !is_expired(record.last_announce, timeout, current_time)
            });
            removed_count += before - swarm.len();
        }

        self.peers.retain(|_, swarm| !swarm.is_empty());

        removed_count
    }

    /// Get the total number of peers across all swarms
    pub fn total_peers(&self) -> usize {
        self.peers.iter().map(|entry| entry.value().len()).sum()
    }

    /// Get the number of swarms with at least one peer
    pub fn active_swarms(&self) -> usize {
        self.peers.len()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, info_hash: &InfoHash) -> StorageResult<Vec<PeerInfo>> {
        let peers = match self.peers.get(&info_hash.to_hex()) {
            Some(swarm) => swarm.iter().map(|entry| entry.peer.clone()).collect(),
            None => Vec::new(),
        };
        Ok(peers)
    }

    async fn update(&self, peer: &PeerInfo) -> StorageResult<()> {
        self.update_at(peer, current_timestamp());
        Ok(())
    }

    async fn read_torrent(&self, name: &str) -> StorageResult<Option<TorrentInfo>> {
        Ok(self.torrents.get(name).map(|entry| entry.value().clone()))
    }

    async fn create_torrent(&self, torrent: &TorrentInfo) -> StorageResult<()> {
        match self.torrents.entry(torrent.torrent_name.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(format!(
                "torrent '{}' is already registered",
                torrent.torrent_name
            ))),
            Entry::Vacant(slot) => {
                slot.insert(torrent.clone());
                Ok(())
            }
        }
    }

    async fn read_manifest(&self, name: &str) -> StorageResult<Option<Manifest>> {
        Ok(self.manifests.get(name).map(|entry| entry.value().clone()))
    }

    async fn update_manifest(&self, manifest: &Manifest) -> StorageResult<()> {
        self.manifests
            .insert(manifest.tag_name.clone(), manifest.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_helpers::peer;

    #[tokio::test]
    async fn test_read_unknown_info_hash_is_empty() {
        let storage = MemoryStorage::new();
        let peers = storage.read(&InfoHash([9u8; 20])).await.unwrap();
        assert!(peers.is_empty());
    }

    #[tokio::test]
    async fn test_update_then_read() {
        let storage = MemoryStorage::new();
        let p = peer(1, "dca1", 100);

        storage.update(&p).await.unwrap();

        let peers = storage.read(&p.info_hash).await.unwrap();
        assert_eq!(peers, vec![p]);
    }

    #[tokio::test]
    async fn test_reannounce_overwrites() {
        let storage = MemoryStorage::new();
        let mut p = peer(1, "dca1", 100);
        storage.update(&p).await.unwrap();

        p.bytes_left = 0;
        p.bytes_downloaded = 100;
        storage.update(&p).await.unwrap();

        let peers = storage.read(&p.info_hash).await.unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].bytes_left, 0);
        assert_eq!(peers[0].bytes_downloaded, 100);
        assert_eq!(storage.total_peers(), 1);
    }

    #[tokio::test]
    async fn test_swarms_are_separate() {
        let storage = MemoryStorage::new();
        let a = peer(1, "dca1", 100);
        let mut b = peer(2, "dca1", 100);
        b.info_hash = InfoHash([0xbb; 20]);

        storage.update(&a).await.unwrap();
        storage.update(&b).await.unwrap();

        assert_eq!(storage.read(&a.info_hash).await.unwrap(), vec![a]);
        assert_eq!(storage.read(&b.info_hash).await.unwrap(), vec![b]);
        assert_eq!(storage.active_swarms(), 2);
    }

    #[tokio::test]
    async fn test_create_torrent_once() {
        let storage = MemoryStorage::new();
        let torrent = TorrentInfo::new("asdfhjkl", "12345678901234567890");

        storage.create_torrent(&torrent).await.unwrap();
        assert_eq!(
            storage.read_torrent("asdfhjkl").await.unwrap(),
            Some(torrent.clone())
        );

        let again = storage
            .create_torrent(&TorrentInfo::new("asdfhjkl", "other"))
            .await;
        assert!(matches!(again, Err(StorageError::Conflict(_))));
        assert_eq!(
            storage.read_torrent("asdfhjkl").await.unwrap().unwrap().info_hash,
            "12345678901234567890"
        );
    }

    #[tokio::test]
    async fn test_read_missing_torrent() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read_torrent("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_manifest_upsert() {
        let storage = MemoryStorage::new();
        storage
            .update_manifest(&Manifest::new("repo:tag1", "{\"schemaVersion\":1}"))
            .await
            .unwrap();
        storage
            .update_manifest(&Manifest::new("repo:tag1", "{\"schemaVersion\":2}"))
            .await
            .unwrap();

        let stored = storage.read_manifest("repo:tag1").await.unwrap().unwrap();
        assert_eq!(stored.manifest, "{\"schemaVersion\":2}");
        assert_eq!(storage.read_manifest("repo:tag2").await.unwrap(), None);
    }

    #[test]
    fn test_reap_stale_and_stopped() {
        let storage = MemoryStorage::new();
        let now = 10_000;

        storage.update_at(&peer(1, "dca1", 0), now - 100);
        storage.update_at(&peer(2, "dca1", 0), now - 2000);
        let mut stopped = peer(3, "dca1", 0);
        stopped.event = Some(AnnounceEvent::Stopped);
        storage.update_at(&stopped, now);

        let removed = storage.reap_at(1000, now);
        assert_eq!(removed, 2);
        assert_eq!(storage.total_peers(), 1);
    }

    #[test]
    fn test_reap_drops_empty_swarms() {
        let storage = MemoryStorage::new();
        storage.update_at(&peer(1, "dca1", 0), 0);

        assert_eq!(storage.reap_at(100, 1000), 1);
        assert_eq!(storage.active_swarms(), 0);
    }

    #[test]
    fn test_reap_nothing_stale() {
        let storage = MemoryStorage::new();
        storage.update_at(&peer(1, "dca1", 0), 950);
        storage.update_at(&peer(2, "dca1", 0), 900);

        assert_eq!(storage.reap_at(100, 1000), 0);
        assert_eq!(storage.total_peers(), 2);
    }
}
