pub mod manifest;
pub mod peer;
pub mod torrent;
