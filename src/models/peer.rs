use crate::core::error::ValidationError;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Length in bytes of info hashes and peer ids
pub const ID_LEN: usize = 20;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $param:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; ID_LEN]);

        impl $name {
            /// Build from raw wire bytes, rejecting anything that is not exactly 20 bytes
            pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
                let array: [u8; ID_LEN] =
                    bytes.try_into().map_err(|_| ValidationError::InvalidLength {
                        param: $param,
                        expected: ID_LEN,
                        actual: bytes.len(),
                    })?;
                Ok(Self(array))
            }

            pub fn from_hex(hex_str: &str) -> Result<Self, ValidationError> {
                let bytes = hex::decode(hex_str)
                    .map_err(|e| ValidationError::InvalidHex(format!("{}: {}", $param, e)))?;
                Self::from_bytes(&bytes)
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }
    };
}

opaque_id!(
    /// Opaque 20-byte content identifier
    InfoHash,
    "info_hash"
);

opaque_id!(
    /// Opaque 20-byte peer identifier
    PeerId,
    "peer_id"
);

/// Lifecycle hint sent with an announce; `None` on a `PeerInfo` means keep-alive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnounceEvent {
    Started,
    Completed,
    Stopped,
}

impl AnnounceEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnounceEvent::Started => "started",
            AnnounceEvent::Completed => "completed",
            AnnounceEvent::Stopped => "stopped",
        }
    }
}

impl FromStr for AnnounceEvent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(AnnounceEvent::Started),
            "completed" => Ok(AnnounceEvent::Completed),
            "stopped" => Ok(AnnounceEvent::Stopped),
            other => Err(ValidationError::InvalidFormat(format!(
                "event must be 'started', 'completed', 'stopped' or empty, got '{}'",
                other
            ))),
        }
    }
}

/// Liveness and progress of one peer within one swarm
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerInfo {
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub ip: IpAddr,
    pub port: u16,
    /// Datacenter / locality tag
    pub dc: String,
    pub bytes_downloaded: u64,
    pub bytes_uploaded: u64,
    /// Bytes left to download (0 for seeders)
    pub bytes_left: u64,
    pub event: Option<AnnounceEvent>,
}

impl PeerInfo {
    pub fn is_seeder(&self) -> bool {
        self.bytes_left == 0
    }
}
