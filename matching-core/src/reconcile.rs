//! Staleness reconciliation
//!
//! After a request is edited, every live relationship it takes part in is
//! re-checked against the counterpart's current request. Relationships
//! that no longer describe a direct match, or whose counterpart request is
//! gone, are returned marked `no_longer_matching`. Persisting them is up
//! to the caller.
//!
//! Blocked relationships are left alone: a block is the counterpart's
//! decision and does not depend on the requests still matching.

use crate::predicate::is_direct_match;
use crate::types::{MatchRelationship, RequestId, TransferRequest, UserId};
use chrono::Utc;
use std::collections::HashMap;

/// Read access to the current version of peer requests
pub trait RequestLookup {
    /// Request by id
    fn request_by_id(&self, id: &RequestId) -> Option<TransferRequest>;

    /// The owner's active request
    fn request_by_owner(&self, owner: &UserId) -> Option<TransferRequest>;
}

impl RequestLookup for HashMap<RequestId, TransferRequest> {
    fn request_by_id(&self, id: &RequestId) -> Option<TransferRequest> {
        self.get(id).cloned()
    }

    fn request_by_owner(&self, owner: &UserId) -> Option<TransferRequest> {
        self.values().find(|r| &r.owner_id == owner).cloned()
    }
}

impl RequestLookup for [TransferRequest] {
    fn request_by_id(&self, id: &RequestId) -> Option<TransferRequest> {
        self.iter().find(|r| &r.id == id).cloned()
    }

    fn request_by_owner(&self, owner: &UserId) -> Option<TransferRequest> {
        self.iter().find(|r| &r.owner_id == owner).cloned()
    }
}

/// Relationships involving `edited` that must become `no_longer_matching`
pub fn reconcile<L>(
    edited: &TransferRequest,
    relationships: &[MatchRelationship],
    peers: &L,
) -> Vec<MatchRelationship>
where
    L: RequestLookup + ?Sized,
{
    let now = Utc::now();
    let mut downgrades = Vec::new();

    for relationship in relationships {
        if !relationship.status.is_reconcilable() {
            continue;
        }

        let Some(side) = relationship.side_of(edited) else {
            continue;
        };

        let counterpart = relationship.counterpart(side);
        let peer = match counterpart.request_id {
            Some(id) => peers.request_by_id(id),
            None => peers.request_by_owner(counterpart.user_id),
        };

        let still_matching = match &peer {
            Some(peer) => is_direct_match(edited, peer),
            None => {
                tracing::debug!(
                    "Relationship {}: counterpart {} has no request",
                    relationship.id,
                    counterpart.user_id
                );
                false
            }
        };

        if !still_matching {
            tracing::info!(
                "Relationship {} ({}) no longer matching after edit of {}",
                relationship.id,
                relationship.status,
                edited.id
            );
            downgrades.push(relationship.downgraded(now));
        }
    }

    downgrades
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, RelationshipStatus};

    fn create_request(owner: &str, cur: &str, wanted: &[&str]) -> TransferRequest {
        TransferRequest::new(
            UserId::new(owner),
            Location::new(cur, "DIV"),
            wanted.iter().map(|w| Location::new(*w, "DIV")).collect(),
        )
        .with_organization(Some("Engineering"), None, Some("JE"))
    }

    fn accepted(from: &TransferRequest, to: &TransferRequest) -> MatchRelationship {
        MatchRelationship {
            status: RelationshipStatus::Accepted,
            responded_at: Some(Utc::now()),
            ..MatchRelationship::between(from, to)
        }
    }

    #[test]
    fn test_downgrade_after_wanted_edit() {
        let x = create_request("x", "A", &["B"]);
        let y = create_request("y", "B", &["A"]);
        let rel = accepted(&x, &y);

        let mut x_edited = x.clone();
        x_edited.wanted_locations = vec![Location::new("C", "DIV")];

        let peers = HashMap::from([(y.id, y.clone())]);
        let downgrades = reconcile(&x_edited, &[rel.clone()], &peers);

        assert_eq!(downgrades.len(), 1);
        assert_eq!(downgrades[0].id, rel.id);
        assert_eq!(downgrades[0].status, RelationshipStatus::NoLongerMatching);
    }

    #[test]
    fn test_still_matching_left_alone() {
        let x = create_request("x", "A", &["B"]);
        let y = create_request("y", "B", &["A"]);
        let rel = accepted(&y, &x);

        let mut x_edited = x.clone();
        x_edited.wanted_locations.push(Location::new("C", "DIV"));

        assert!(reconcile(&x_edited, &[rel], &[y][..]).is_empty());
    }

    #[test]
    fn test_missing_peer_downgrades() {
        let x = create_request("x", "A", &["B"]);
        let y = create_request("y", "B", &["A"]);
        let rel = accepted(&x, &y);

        let peers: HashMap<RequestId, TransferRequest> = HashMap::new();
        let downgrades = reconcile(&x, &[rel], &peers);
        assert_eq!(downgrades.len(), 1);
    }

    #[test]
    fn test_skips_blocked_and_unrelated() {
        let x = create_request("x", "A", &["C"]);
        let y = create_request("y", "B", &["A"]);
        let z = create_request("z", "D", &["A"]);

        let blocked = MatchRelationship {
            status: RelationshipStatus::Blocked,
            ..MatchRelationship::between(&y, &x)
        };
        let other = accepted(&y, &z);

        let peers = HashMap::from([(y.id, y.clone()), (z.id, z.clone())]);
        assert!(reconcile(&x, &[blocked, other], &peers).is_empty());
    }

    #[test]
    fn test_user_only_relationship_resolved_by_owner() {
        let x = create_request("x", "A", &["C"]);
        let y = create_request("y", "B", &["A"]);
        let rel = MatchRelationship {
            from_request_id: None,
            to_request_id: None,
            ..accepted(&x, &y)
        };

        let downgrades = reconcile(&x, &[rel], &[y][..]);
        assert_eq!(downgrades.len(), 1);
    }

    #[test]
    fn test_idempotent() {
        let x = create_request("x", "A", &["C"]);
        let y = create_request("y", "B", &["A"]);
        let rels = vec![accepted(&x, &y), MatchRelationship::between(&y, &x)];
        let peers = HashMap::from([(y.id, y.clone())]);

        let first = reconcile(&x, &rels, &peers);
        assert_eq!(first.len(), 2);

        // Apply, then run again
        let applied: Vec<MatchRelationship> = rels
            .iter()
            .map(|r| first.iter().find(|d| d.id == r.id).cloned().unwrap_or_else(|| r.clone()))
            .collect();
        assert!(reconcile(&x, &applied, &peers).is_empty());
    }
}
