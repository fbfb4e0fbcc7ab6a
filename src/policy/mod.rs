//! Peer handout policy
//!
//! A policy is a priority strategy (how candidates are ordered) paired with a
//! sampling strategy (how many of them, and which, are disclosed). Strategy
//! names are resolved once, when the policy is built from configuration.

pub mod priority;
pub mod sampling;

use crate::core::config::PeerHandoutConfig;
use crate::models::peer::PeerInfo;
use rand::RngCore;
use serde::Deserialize;

pub use priority::PeerPriority;
pub use sampling::PeerSampling;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityKind {
    /// Keep the order storage returned
    #[default]
    Default,
    /// Peers in the requester's datacenter first
    Datacenter,
    /// Peers with the fewest bytes left first
    Completeness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingKind {
    /// Every candidate
    #[default]
    Default,
    /// Uniform random subset of at most `limit` peers
    Random,
    /// Random subset of at most `limit` peers weighted toward the head of the ordering
    Top,
}

/// Peers selected for one announce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handout {
    pub interval: i64,
    pub peers: Vec<PeerInfo>,
}

pub struct PeerHandoutPolicy {
    priority: Box<dyn PeerPriority>,
    sampling: Box<dyn PeerSampling>,
    interval: i64,
}

impl PeerHandoutPolicy {
    pub fn new(config: &PeerHandoutConfig) -> Self {
        Self {
            priority: priority::build(config.priority),
            sampling: sampling::build(config.sampling, config.limit),
            interval: config.interval,
        }
    }

    pub fn priority_name(&self) -> &'static str {
        self.priority.name()
    }

    pub fn sampling_name(&self) -> &'static str {
        self.sampling.name()
    }

    /// Select the peers to disclose to `requester` out of `peers`
    pub fn select(&self, requester: &PeerInfo, peers: Vec<PeerInfo>) -> Handout {
        self.select_with_rng(requester, peers, &mut rand::rng())
    }

    pub fn select_with_rng(
        &self,
        requester: &PeerInfo,
        peers: Vec<PeerInfo>,
        rng: &mut dyn RngCore,
    ) -> Handout {
        let mut candidates: Vec<PeerInfo> = peers
            .into_iter()
            .filter(|p| p.peer_id != requester.peer_id)
            .collect();

        self.priority.order(requester, &mut candidates);
        let peers = self.sampling.sample(candidates, rng);

        Handout {
            interval: self.interval,
            peers,
        }
    }
}

impl Default for PeerHandoutPolicy {
    fn default() -> Self {
        Self::new(&PeerHandoutConfig::default())
    }
}
