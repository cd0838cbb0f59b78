//! Property-based tests for matching invariants
//!
//! These tests use proptest over small location and department alphabets
//! so that matches and chains actually occur:
//! - Symmetry: is_direct_match(a, b) == is_direct_match(b, a)
//! - Self-exclusion: a request never matches itself
//! - Chain minimality and closure
//! - Reconciler idempotence

use matching_core::{
    find_cycles, find_direct_matches, is_compatible, is_direct_match, reconcile,
    wants_location_of, Location, MatchRelationship, RelationshipStatus, RequestId,
    TransferRequest, UserId,
};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

/// Strategy for locations drawn from a small grid
fn location_strategy() -> impl Strategy<Value = Location> {
    (0u8..3, 0u8..2).prop_map(|(z, d)| Location::new(format!("Z{z}"), format!("D{d}")))
}

/// Strategy for optional organizational fields, including the empty wildcard
fn org_field_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("Engineering".to_string())),
        Just(Some("Traffic".to_string())),
    ]
}

/// Strategy for well-formed requests
fn request_strategy() -> impl Strategy<Value = TransferRequest> {
    (
        org_field_strategy(),
        org_field_strategy(),
        location_strategy(),
        prop::collection::vec(location_strategy(), 1..=3),
    )
        .prop_map(|(department, post, current, wanted)| {
            let mut request = TransferRequest::new(UserId::new("emp"), current, wanted);
            request.department = department;
            request.post = post;
            request
        })
}

fn pool_strategy() -> impl Strategy<Value = Vec<TransferRequest>> {
    prop::collection::vec(request_strategy(), 0..7)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: direct matching is symmetric
    #[test]
    fn prop_direct_match_symmetric(a in request_strategy(), b in request_strategy()) {
        prop_assert_eq!(is_direct_match(&a, &b), is_direct_match(&b, &a));
    }

    /// Property: a request is never its own match
    #[test]
    fn prop_self_excluded(target in request_strategy(), mut pool in pool_strategy()) {
        pool.push(target.clone());
        let matches = find_direct_matches(&target, &pool);
        prop_assert!(matches.iter().all(|m| m.id != target.id));
    }

    /// Property: an empty department is compatible with any department
    #[test]
    fn prop_empty_department_wildcard(mut a in request_strategy(), mut b in request_strategy()) {
        a.department = Some(String::new());
        a.sub_department = None;
        a.post = None;
        b.sub_department = None;
        b.post = None;
        prop_assert!(is_compatible(&a, &b));
    }

    /// Property: every direct match satisfies the full predicate
    #[test]
    fn prop_direct_matches_sound(target in request_strategy(), pool in pool_strategy()) {
        for m in find_direct_matches(&target, &pool) {
            prop_assert!(is_compatible(&target, m));
            prop_assert!(wants_location_of(&target, m));
            prop_assert!(wants_location_of(m, &target));
        }
    }

    /// Property: chains have length >= 3, distinct ids, contain the target,
    /// and every hop (with wraparound) is a valid move
    #[test]
    fn prop_cycles_minimal_and_closed(target in request_strategy(), pool in pool_strategy()) {
        let chains = find_cycles(&target, &pool);

        for chain in &chains {
            let n = chain.len();
            prop_assert!(n >= 3);
            prop_assert!(chain.contains(&target.id));

            let ids: HashSet<RequestId> = chain.ids().into_iter().collect();
            prop_assert_eq!(ids.len(), n);

            for i in 0..n {
                let a = &chain.participants[i];
                let b = &chain.participants[(i + 1) % n];
                prop_assert!(wants_location_of(a, b));
                prop_assert!(is_compatible(a, b));
            }
        }
    }

    /// Property: no two chains are rotations of each other
    #[test]
    fn prop_cycles_deduplicated(target in request_strategy(), pool in pool_strategy()) {
        let chains = find_cycles(&target, &pool);
        let mut keys = HashSet::new();

        for chain in &chains {
            let mut ids = chain.ids();
            let start = ids.iter().enumerate().min_by_key(|(_, id)| **id).map(|(i, _)| i).unwrap_or(0);
            ids.rotate_left(start);
            prop_assert!(keys.insert(ids));
        }
    }

    /// Property: chains are ordered shortest first
    #[test]
    fn prop_cycles_sorted(target in request_strategy(), pool in pool_strategy()) {
        let chains = find_cycles(&target, &pool);
        prop_assert!(chains.windows(2).all(|w| w[0].len() <= w[1].len()));
    }

    /// Property: applying the reconciler's downgrades and running it again
    /// yields nothing
    #[test]
    fn prop_reconcile_idempotent(edited in request_strategy(), peers in pool_strategy()) {
        let relationships: Vec<MatchRelationship> = peers
            .iter()
            .map(|peer| MatchRelationship {
                status: RelationshipStatus::Accepted,
                ..MatchRelationship::between(&edited, peer)
            })
            .collect();
        let lookup: HashMap<RequestId, TransferRequest> =
            peers.iter().map(|p| (p.id, p.clone())).collect();

        let first = reconcile(&edited, &relationships, &lookup);
        for downgrade in &first {
            prop_assert_eq!(downgrade.status, RelationshipStatus::NoLongerMatching);
        }

        let applied: Vec<MatchRelationship> = relationships
            .iter()
            .map(|r| first.iter().find(|d| d.id == r.id).cloned().unwrap_or_else(|| r.clone()))
            .collect();

        prop_assert!(reconcile(&edited, &applied, &lookup).is_empty());
    }
}

#[test]
fn test_scenario_three_cycle_has_no_pair_result() {
    let org = |r: TransferRequest| r.with_organization(Some("Engineering"), None, Some("JE"));
    let x = org(TransferRequest::new(UserId::new("x"), Location::new("A", "1"), vec![Location::new("B", "2")]));
    let y = org(TransferRequest::new(UserId::new("y"), Location::new("B", "2"), vec![Location::new("C", "3")]));
    let z = org(TransferRequest::new(UserId::new("z"), Location::new("C", "3"), vec![Location::new("A", "1")]));
    let pool = vec![x.clone(), y.clone(), z.clone()];

    let chains = find_cycles(&x, &pool);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].ids(), vec![x.id, y.id, z.id]);
    assert!(find_direct_matches(&x, &pool).is_empty());
}
