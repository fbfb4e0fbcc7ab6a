use super::SamplingKind;
use crate::models::peer::PeerInfo;
use rand::seq::index;
use rand::{Rng, RngCore};

/// Picks the disclosed subset out of priority-ordered candidates.
///
/// Implementations never return more than their bound and return every
/// candidate when there are fewer than the bound. Relative priority order
/// of the chosen peers is preserved.
pub trait PeerSampling: Send + Sync {
    fn name(&self) -> &'static str;

    fn sample(&self, peers: Vec<PeerInfo>, rng: &mut dyn RngCore) -> Vec<PeerInfo>;
}

pub fn build(kind: SamplingKind, limit: usize) -> Box<dyn PeerSampling> {
    match kind {
        SamplingKind::Default => Box::new(AllPeers),
        SamplingKind::Random => Box::new(UniformSampling { limit }),
        SamplingKind::Top => Box::new(TopBiasedSampling { limit }),
    }
}

pub struct AllPeers;

impl PeerSampling for AllPeers {
    fn name(&self) -> &'static str {
        "default"
    }

    fn sample(&self, peers: Vec<PeerInfo>, _rng: &mut dyn RngCore) -> Vec<PeerInfo> {
        peers
    }
}

pub struct UniformSampling {
    pub limit: usize,
}

impl PeerSampling for UniformSampling {
    fn name(&self) -> &'static str {
        "random"
    }

    fn sample(&self, peers: Vec<PeerInfo>, rng: &mut dyn RngCore) -> Vec<PeerInfo> {
        if peers.len() <= self.limit {
            return peers;
        }

        let mut chosen = index::sample(rng, peers.len(), self.limit).into_vec();
        chosen.sort_unstable();
        keep_indices(peers, &chosen)
    }
}

/// Weighted sampling without replacement, weight of rank `i` is `1 / (i + 1)`.
///
/// Uses the Efraimidis-Spirakis key `u^(1/w)`, which for these weights is
/// `u^(i + 1)`; the `limit` largest keys win.
pub struct TopBiasedSampling {
    pub limit: usize,
}

impl PeerSampling for TopBiasedSampling {
    fn name(&self) -> &'static str {
        "top"
    }

    fn sample(&self, peers: Vec<PeerInfo>, rng: &mut dyn RngCore) -> Vec<PeerInfo> {
        if peers.len() <= self.limit {
            return peers;
        }

        let mut keyed: Vec<(f64, usize)> = (0..peers.len())
            .map(|rank| {
                let u: f64 = rng.random();
                (u.powi(rank as i32 + 1), rank)
            })
            .collect();
        keyed.sort_unstable_by(|a, b| b.0.total_cmp(&a.0));

        let mut chosen: Vec<usize> = keyed[..self.limit].iter().map(|(_, rank)| *rank).collect();
        chosen.sort_unstable();
        keep_indices(peers, &chosen)
    }
}

// `chosen` must be sorted ascending
fn keep_indices(peers: Vec<PeerInfo>, chosen: &[usize]) -> Vec<PeerInfo> {
    let mut wanted = chosen.iter().peekable();
    let mut kept = Vec::with_capacity(chosen.len());

    for (idx, peer) in peers.into_iter().enumerate() {
        if wanted.peek() == Some(&&idx) {
            kept.push(peer);
            wanted.next();
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_helpers::{ids, peer};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn candidates(n: u8) -> Vec<PeerInfo> {
        (1..=n).map(|i| peer(i, "dca1", 0)).collect()
    }

    #[test]
    fn test_all_peers() {
        let mut rng = StdRng::seed_from_u64(1);
        let sampled = AllPeers.sample(candidates(100), &mut rng);
        assert_eq!(sampled.len(), 100);
    }

    #[test]
    fn test_uniform_respects_bound() {
        let sampling = UniformSampling { limit: 5 };
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let sampled = sampling.sample(candidates(30), &mut rng);
            assert_eq!(sampled.len(), 5);

            let unique: HashSet<u8> = ids(&sampled).into_iter().collect();
            assert_eq!(unique.len(), 5);
        }
    }

    #[test]
    fn test_uniform_fewer_than_bound_returns_all() {
        let sampling = UniformSampling { limit: 10 };
        let mut rng = StdRng::seed_from_u64(42);

        let sampled = sampling.sample(candidates(4), &mut rng);
        assert_eq!(ids(&sampled), vec![1, 2, 3, 4]);

        let sampled = sampling.sample(vec![], &mut rng);
        assert!(sampled.is_empty());
    }

    #[test]
    fn test_uniform_preserves_relative_order() {
        let sampling = UniformSampling { limit: 7 };
        let mut rng = StdRng::seed_from_u64(3);

        let sampled = ids(&sampling.sample(candidates(40), &mut rng));
        let mut sorted = sampled.clone();
        sorted.sort_unstable();
        assert_eq!(sampled, sorted);
    }

    #[test]
    fn test_uniform_is_deterministic_for_seed() {
        let sampling = UniformSampling { limit: 6 };

        let a = sampling.sample(candidates(50), &mut StdRng::seed_from_u64(9));
        let b = sampling.sample(candidates(50), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_top_biased_respects_bound() {
        let sampling = TopBiasedSampling { limit: 8 };
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let sampled = sampling.sample(candidates(25), &mut rng);
            assert_eq!(sampled.len(), 8);

            let unique: HashSet<u8> = ids(&sampled).into_iter().collect();
            assert_eq!(unique.len(), 8);
        }

        let sampled = sampling.sample(candidates(3), &mut rng);
        assert_eq!(ids(&sampled), vec![1, 2, 3]);
    }

    #[test]
    fn test_top_biased_preserves_relative_order() {
        let sampling = TopBiasedSampling { limit: 6 };

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let sampled = ids(&sampling.sample(candidates(30), &mut rng));
            assert_eq!(sampled.len(), 6);
            assert!(sampled.windows(2).all(|w| w[0] < w[1]), "seed {}: {:?}", seed, sampled);
        }
    }

    #[test]
    fn test_top_biased_favors_head() {
        let sampling = TopBiasedSampling { limit: 5 };
        let mut rng = StdRng::seed_from_u64(2024);

        let mut head_hits = 0;
        let mut tail_hits = 0;
        for _ in 0..500 {
            for id in ids(&sampling.sample(candidates(50), &mut rng)) {
                if id <= 5 {
                    head_hits += 1;
                } else if id > 45 {
                    tail_hits += 1;
                }
            }
        }

        assert!(head_hits > tail_hits * 3, "head={} tail={}", head_hits, tail_hits);
    }

    #[test]
    fn test_keep_indices() {
        let kept = keep_indices(candidates(6), &[0, 2, 5]);
        assert_eq!(ids(&kept), vec![1, 3, 6]);
    }
}
