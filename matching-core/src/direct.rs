//! Direct (two-party) match finder

use crate::predicate::is_direct_match;
use crate::types::TransferRequest;

/// Every request in `pool` that forms a mutual swap with `target`
///
/// Results keep pool order. The target itself is excluded by id even if
/// the pool contains it.
pub fn find_direct_matches<'a>(
    target: &TransferRequest,
    pool: &'a [TransferRequest],
) -> Vec<&'a TransferRequest> {
    if !target.is_matchable() {
        tracing::debug!("Request {} is not matchable, skipping direct search", target.id);
        return Vec::new();
    }

    let matches: Vec<&TransferRequest> = pool
        .iter()
        .filter(|candidate| candidate.id != target.id)
        .filter(|candidate| {
            if !candidate.is_matchable() {
                tracing::debug!("Skipping malformed candidate {}", candidate.id);
                return false;
            }
            is_direct_match(target, candidate)
        })
        .collect();

    tracing::debug!(
        "Request {}: {} direct matches in pool of {}",
        target.id,
        matches.len(),
        pool.len()
    );

    matches
}
