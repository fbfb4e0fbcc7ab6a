/// Registry entry mapping a human-readable name to its info hash
///
/// The info hash is kept exactly as it was registered; it is handed back
/// verbatim by `GET /infohash`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TorrentInfo {
    pub torrent_name: String,
    pub info_hash: String,
}

impl TorrentInfo {
    pub fn new(torrent_name: impl Into<String>, info_hash: impl Into<String>) -> Self {
        Self {
            torrent_name: torrent_name.into(),
            info_hash: info_hash.into(),
        }
    }
}
