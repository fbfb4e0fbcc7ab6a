use super::PriorityKind;
use crate::models::peer::PeerInfo;

/// Orders handout candidates, most preferred first
pub trait PeerPriority: Send + Sync {
    fn name(&self) -> &'static str;

    /// Reorder `peers` in place. Must be a stable ordering.
    fn order(&self, requester: &PeerInfo, peers: &mut [PeerInfo]);
}

pub fn build(kind: PriorityKind) -> Box<dyn PeerPriority> {
    match kind {
        PriorityKind::Default => Box::new(NoPriority),
        PriorityKind::Datacenter => Box::new(DatacenterPriority),
        PriorityKind::Completeness => Box::new(CompletenessPriority),
    }
}

pub struct NoPriority;

impl PeerPriority for NoPriority {
    fn name(&self) -> &'static str {
        "default"
    }

    fn order(&self, _requester: &PeerInfo, _peers: &mut [PeerInfo]) {}
}

/// Same-datacenter peers ahead of remote ones. A requester without a dc
/// tag matches nobody, so the order is left alone.
pub struct DatacenterPriority;

impl PeerPriority for DatacenterPriority {
    fn name(&self) -> &'static str {
        "datacenter"
    }

    fn order(&self, requester: &PeerInfo, peers: &mut [PeerInfo]) {
        if requester.dc.is_empty() {
            return;
        }
        peers.sort_by_key(|p| p.dc != requester.dc);
    }
}

/// Peers closest to completion first; seeders lead
pub struct CompletenessPriority;

impl PeerPriority for CompletenessPriority {
    fn name(&self) -> &'static str {
        "completeness"
    }

    fn order(&self, _requester: &PeerInfo, peers: &mut [PeerInfo]) {
        peers.sort_by_key(|p| p.bytes_left);
    }
}
