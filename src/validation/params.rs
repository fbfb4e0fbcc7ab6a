use crate::core::error::ValidationError;
use crate::models::peer::{AnnounceEvent, InfoHash, PeerId, PeerInfo};
use percent_encoding::percent_decode_str;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tracing::warn;

/// Decoded announce query
///
/// `info_hash` and `peer_id` arrive percent-encoded and are treated as raw
/// bytes; they are never required to be valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceRequest {
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    /// `None` when the client sent no usable `ip`
    pub ip: Option<IpAddr>,
    pub port: u16,
    pub dc: String,
    pub downloaded: u64,
    pub uploaded: u64,
    pub left: u64,
    pub event: Option<AnnounceEvent>,
}

impl AnnounceRequest {
    /// Parse the raw query string of `/announce`.
    ///
    /// Only `info_hash` and `peer_id` are required. Absent counters default to
    /// zero; counters that are present but not numbers are rejected.
    pub fn parse(raw_query: Option<&str>) -> Result<Self, ValidationError> {
        let query_str = raw_query.unwrap_or("");

        let mut info_hash: Option<Vec<u8>> = None;
        let mut peer_id: Option<Vec<u8>> = None;
        let mut ip = "";
        let mut port = "";
        let mut dc = "";
        let mut downloaded = "";
        let mut uploaded = "";
        let mut left = "";
        let mut event = "";

        for pair in query_str.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "info_hash" => info_hash = Some(decode_component(value)),
                "peer_id" => peer_id = Some(decode_component(value)),
                "ip" => ip = value,
                "port" => port = value,
                "dc" => dc = value,
                "downloaded" => downloaded = value,
                "uploaded" => uploaded = value,
                "left" => left = value,
                "event" => event = value,
                _ => {}
            }
        }

        let info_hash = info_hash
            .filter(|bytes| !bytes.is_empty())
            .ok_or(ValidationError::MissingParameter("info_hash"))?;
        let peer_id = peer_id
            .filter(|bytes| !bytes.is_empty())
            .ok_or(ValidationError::MissingParameter("peer_id"))?;

        Ok(Self {
            info_hash: InfoHash::from_bytes(&info_hash)?,
            peer_id: PeerId::from_bytes(&peer_id)?,
            ip: parse_ip(&decode_text(ip)),
            port: parse_number("port", port)?,
            dc: decode_text(dc),
            downloaded: parse_number("downloaded", downloaded)?,
            uploaded: parse_number("uploaded", uploaded)?,
            left: parse_number("left", left)?,
            event: parse_event(&decode_text(event)),
        })
    }

    /// Build the peer record, using `fallback_ip` when the request carried no `ip`
    pub fn into_peer_info(self, fallback_ip: Option<IpAddr>) -> PeerInfo {
        let ip = self
            .ip
            .or(fallback_ip)
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        PeerInfo {
            info_hash: self.info_hash,
            peer_id: self.peer_id,
            ip,
            port: self.port,
            dc: self.dc,
            bytes_downloaded: self.downloaded,
            bytes_uploaded: self.uploaded,
            bytes_left: self.left,
            event: self.event,
        }
    }
}

// Form encoding turns spaces into '+'; a literal '+' always arrives as %2B
fn decode_component(value: &str) -> Vec<u8> {
    percent_decode_str(&value.replace('+', " ")).collect()
}

fn decode_text(value: &str) -> String {
    String::from_utf8_lossy(&decode_component(value)).into_owned()
}

/// Accept the legacy 32-bit integer form as well as textual addresses
fn parse_ip(value: &str) -> Option<IpAddr> {
    if value.is_empty() {
        return None;
    }

    if let Ok(n) = value.parse::<u32>() {
        return Some(IpAddr::V4(Ipv4Addr::from(n)));
    }

    match value.parse::<IpAddr>() {
        Ok(ip) => Some(ip),
        Err(_) => {
            warn!(ip = %value, "Ignoring unparsable ip parameter");
            None
        }
    }
}

fn parse_number<T: FromStr + Default>(param: &'static str, value: &str) -> Result<T, ValidationError> {
    if value.is_empty() {
        return Ok(T::default());
    }

    value.parse().map_err(|_| {
        ValidationError::InvalidFormat(format!("{} must be a non-negative integer, got '{}'", param, value))
    })
}

fn parse_event(value: &str) -> Option<AnnounceEvent> {
    if value.is_empty() {
        return None;
    }

    match value.parse() {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "Treating unknown event as keep-alive");
            None
        }
    }
}
