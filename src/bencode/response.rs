use super::encoder::{encode_list, BencodeEncode};
use crate::core::error::BencodeError;
use crate::models::peer::{PeerId, PeerInfo};
use crate::policy::Handout;
use serde::Deserialize;
use std::net::IpAddr;

/// The part of a peer record other peers get to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosedPeer {
    pub peer_id: PeerId,
    pub ip: IpAddr,
    pub port: u16,
}

impl From<&PeerInfo> for DisclosedPeer {
    fn from(peer: &PeerInfo) -> Self {
        Self {
            peer_id: peer.peer_id,
            ip: peer.ip,
            port: peer.port,
        }
    }
}

// Keys in sorted order: "ip" < "peer id" < "port"
impl BencodeEncode for DisclosedPeer {
    fn bencode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"d");

        "ip".bencode(buf);
        self.ip.to_string().bencode(buf);

        "peer id".bencode(buf);
        self.peer_id.to_hex().bencode(buf);

        "port".bencode(buf);
        self.port.bencode(buf);

        buf.extend_from_slice(b"e");
    }
}

/// Body of a successful announce
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnouncerResponse {
    pub interval: i64,
    pub peers: Vec<DisclosedPeer>,
}

impl From<&Handout> for AnnouncerResponse {
    fn from(handout: &Handout) -> Self {
        Self {
            interval: handout.interval,
            peers: handout.peers.iter().map(DisclosedPeer::from).collect(),
        }
    }
}

impl AnnouncerResponse {
    /// Bencode as `d8:intervali<n>e5:peersl<peer dicts>ee`
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + self.peers.len() * 80);

        buf.extend_from_slice(b"d");

        "interval".bencode(&mut buf);
        self.interval.bencode(&mut buf);

        "peers".bencode(&mut buf);
        encode_list(&self.peers, &mut buf);

        buf.extend_from_slice(b"e");

        buf
    }

    /// Parse a response body as a client would see it
    pub fn decode(bytes: &[u8]) -> Result<Self, BencodeError> {
        let wire = serde_bencode::from_bytes::<WireResponse>(bytes)?;

        let peers = wire
            .peers
            .into_iter()
            .map(DisclosedPeer::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            interval: wire.interval,
            peers,
        })
    }
}

#[derive(Deserialize)]
struct WireResponse {
    interval: i64,
    peers: Vec<WirePeer>,
}

#[derive(Deserialize)]
struct WirePeer {
    ip: String,
    #[serde(rename = "peer id")]
    peer_id: String,
    port: u16,
}

impl TryFrom<WirePeer> for DisclosedPeer {
    type Error = BencodeError;

    fn try_from(wire: WirePeer) -> Result<Self, Self::Error> {
        let peer_id = PeerId::from_hex(&wire.peer_id).map_err(|e| BencodeError::InvalidField {
            key: "peer id",
            reason: e.to_string(),
        })?;

        let ip = wire.ip.parse::<IpAddr>().map_err(|e| BencodeError::InvalidField {
            key: "ip",
            reason: e.to_string(),
        })?;

        Ok(Self {
            peer_id,
            ip,
            port: wire.port,
        })
    }
}
