//! Cyclic swap chain discovery
//!
//! Finds closed chains of three or more requests where every participant
//! can move into the next participant's posting and the last can move into
//! the first's.
//!
//! # Algorithm
//!
//! 1. Collect matchable nodes (target first, duplicates and malformed records dropped)
//! 2. Build the directed swap graph: `u → v` iff `u` is compatible with `v`
//!    and wants `v`'s current location
//! 3. Depth-first search from the target over simple paths, each stack frame
//!    owning its own path
//! 4. Re-validate every closed path, deduplicate by rotation
//! 5. Sort shortest first
//!
//! # Example
//!
//! ```text
//! X at A, wants B
//! Y at B, wants C
//! Z at C, wants A
//!
//! Graph: X → Y → Z → X
//! Chain: [X, Y, Z]  (X takes B, Y takes C, Z takes A)
//! ```
//!
//! Enumeration is exponential in the worst case. Pools are bounded by the
//! size of an organizational unit, and the depth is capped by the pool size
//! and `max_cycle_length`.

use crate::config::MatchingConfig;
use crate::predicate::can_move_into;
use crate::types::{RequestId, SwapChain, TransferRequest};
use std::collections::HashSet;

/// Shortest chain that is not a direct swap
pub const MIN_CYCLE_LENGTH: usize = 3;

/// Cycle finder
#[derive(Debug, Clone, Default)]
pub struct CycleFinder {
    /// Longest chain to explore (None = pool size)
    max_cycle_length: Option<usize>,

    /// Maximum chains returned (0 = unlimited)
    max_cycles: usize,
}

impl CycleFinder {
    /// Create new cycle finder
    pub fn new(max_cycle_length: Option<usize>, max_cycles: usize) -> Self {
        Self {
            max_cycle_length,
            max_cycles,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.max_cycle_length, config.max_cycles)
    }

    /// All chains of length >= 3 through `target`, shortest first
    pub fn find_cycles(&self, target: &TransferRequest, pool: &[TransferRequest]) -> Vec<SwapChain> {
        if !target.is_matchable() {
            tracing::debug!("Request {} is not matchable, skipping cycle search", target.id);
            return Vec::new();
        }

        let nodes = collect_nodes(target, pool);
        if nodes.len() < MIN_CYCLE_LENGTH {
            return Vec::new();
        }

        let adjacency = build_adjacency(&nodes);
        let depth_limit = self
            .max_cycle_length
            .map_or(nodes.len(), |max| max.min(nodes.len()));

        let mut seen: HashSet<Vec<RequestId>> = HashSet::new();
        let mut chains = Vec::new();

        for path in closed_paths(&adjacency, depth_limit) {
            let participants: Vec<TransferRequest> =
                path.iter().map(|&i| nodes[i].clone()).collect();

            if !is_closed_chain(&participants) {
                tracing::warn!(
                    "Discarding chain through {} that failed re-validation",
                    target.id
                );
                continue;
            }

            // Every path starts at the target, so rotations cannot arise from
            // one search; this only guards the output if the search changes
            if !seen.insert(rotation_key(&participants)) {
                continue;
            }

            chains.push(SwapChain { participants });
        }

        chains.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.ids().cmp(&b.ids())));

        if self.max_cycles > 0 && chains.len() > self.max_cycles {
            tracing::info!(
                "Request {}: truncating {} chains to {}",
                target.id,
                chains.len(),
                self.max_cycles
            );
            chains.truncate(self.max_cycles);
        }

        tracing::debug!(
            "Request {}: {} chains among {} nodes (depth limit {})",
            target.id,
            chains.len(),
            nodes.len(),
            depth_limit
        );

        chains
    }
}

/// [`CycleFinder::find_cycles`] with default limits
pub fn find_cycles(target: &TransferRequest, pool: &[TransferRequest]) -> Vec<SwapChain> {
    CycleFinder::default().find_cycles(target, pool)
}

/// Whether the participants form a valid chain: at least three, all
/// distinct, every hop (including last → first) a valid move
pub fn is_closed_chain(participants: &[TransferRequest]) -> bool {
    let n = participants.len();
    if n < MIN_CYCLE_LENGTH {
        return false;
    }

    let distinct: HashSet<RequestId> = participants.iter().map(|p| p.id).collect();
    if distinct.len() != n {
        return false;
    }

    (0..n).all(|i| can_move_into(&participants[i], &participants[(i + 1) % n]))
}

/// Target at index 0, then each distinct matchable pool entry
fn collect_nodes<'a>(target: &'a TransferRequest, pool: &'a [TransferRequest]) -> Vec<&'a TransferRequest> {
    let mut ids = HashSet::from([target.id]);
    let mut nodes = vec![target];

    for candidate in pool {
        if !ids.insert(candidate.id) {
            continue;
        }
        if !candidate.is_matchable() {
            tracing::debug!("Skipping malformed candidate {}", candidate.id);
            continue;
        }
        nodes.push(candidate);
    }

    nodes
}

fn build_adjacency(nodes: &[&TransferRequest]) -> Vec<Vec<usize>> {
    (0..nodes.len())
        .map(|u| {
            (0..nodes.len())
                .filter(|&v| v != u && can_move_into(nodes[u], nodes[v]))
                .collect()
        })
        .collect()
}

/// Simple paths from node 0 that close back to node 0 with length >= 3
fn closed_paths(adjacency: &[Vec<usize>], depth_limit: usize) -> Vec<Vec<usize>> {
    let mut closed = Vec::new();
    let mut stack: Vec<Vec<usize>> = vec![vec![0]];

    while let Some(path) = stack.pop() {
        let Some(&last) = path.last() else { continue };

        // Reverse so lower-index neighbours are explored first
        for &next in adjacency[last].iter().rev() {
            if next == 0 {
                if path.len() >= MIN_CYCLE_LENGTH {
                    closed.push(path.clone());
                }
                continue;
            }

            if path.len() >= depth_limit || path.contains(&next) {
                continue;
            }

            let mut extended = path.clone();
            extended.push(next);
            stack.push(extended);
        }
    }

    closed
}

/// Participant ids rotated to start at the smallest id
fn rotation_key(participants: &[TransferRequest]) -> Vec<RequestId> {
    let ids: Vec<RequestId> = participants.iter().map(|p| p.id).collect();
    let start = ids
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map_or(0, |(i, _)| i);

    ids[start..].iter().chain(ids[..start].iter()).copied().collect()
}
