//! Match predicate
//!
//! Two requests can swap when their organizational classification is
//! compatible and each wants a location the other currently holds.
//!
//! # Compatibility
//!
//! Department, sub-department and post are compared pairwise. A field that
//! is absent or empty on either side is a wildcard; otherwise the values
//! must be equal (case-sensitive).
//!
//! # Example
//!
//! ```text
//! X: Engineering/JE at ZoneA/Div1, wants [ZoneB/Div2]
//! Y: Engineering/JE at ZoneB/Div2, wants [ZoneA/Div1]
//!
//! wants_location_of(X, Y) = true
//! wants_location_of(Y, X) = true
//! is_direct_match(X, Y)   = true
//! ```

use crate::types::TransferRequest;

fn field_compatible(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => a == b,
        _ => true,
    }
}

/// Organizational compatibility under wildcard-if-absent rules
pub fn is_compatible(a: &TransferRequest, b: &TransferRequest) -> bool {
    field_compatible(a.department.as_deref(), b.department.as_deref())
        && field_compatible(a.sub_department.as_deref(), b.sub_department.as_deref())
        && field_compatible(a.post.as_deref(), b.post.as_deref())
}

/// True when `b`'s current location is one of `a`'s wanted locations
pub fn wants_location_of(a: &TransferRequest, b: &TransferRequest) -> bool {
    preference_rank(a, b).is_some()
}

/// Zero-based preference slot of `a` that `b`'s current location fills
///
/// Matching treats every slot alike; the rank only orders results for display.
pub fn preference_rank(a: &TransferRequest, b: &TransferRequest) -> Option<usize> {
    let current = b.current_location.as_ref()?;
    a.wanted_locations.iter().position(|wanted| wanted == current)
}

/// Directed edge of the swap graph: `a` can move into `b`'s posting
pub fn can_move_into(a: &TransferRequest, b: &TransferRequest) -> bool {
    is_compatible(a, b) && wants_location_of(a, b)
}

/// Mutual two-party swap. Symmetric; never true for the same request.
pub fn is_direct_match(a: &TransferRequest, b: &TransferRequest) -> bool {
    a.id != b.id && is_compatible(a, b) && wants_location_of(a, b) && wants_location_of(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, UserId};

    fn req(dept: Option<&str>, post: Option<&str>, cur: (&str, &str), wanted: &[(&str, &str)]) -> TransferRequest {
        TransferRequest::new(
            UserId::new("u"),
            Location::new(cur.0, cur.1),
            wanted.iter().map(|(z, d)| Location::new(*z, *d)).collect(),
        )
        .with_organization(dept, None, post)
    }

    #[test]
    fn test_scenario_direct_match() {
        let x = req(Some("Engineering"), Some("JE"), ("ZoneA", "Div1"), &[("ZoneB", "Div2")]);
        let y = req(Some("Engineering"), Some("JE"), ("ZoneB", "Div2"), &[("ZoneA", "Div1")]);

        assert!(is_direct_match(&x, &y));
        assert!(is_direct_match(&y, &x));
    }

    #[test]
    fn test_department_mismatch() {
        let x = req(Some("Engineering"), Some("JE"), ("ZoneA", "Div1"), &[("ZoneB", "Div2")]);
        let y = req(Some("Traffic"), Some("JE"), ("ZoneB", "Div2"), &[("ZoneA", "Div1")]);

        assert!(!is_compatible(&x, &y));
        assert!(!is_direct_match(&x, &y));
    }

    #[test]
    fn test_wildcards() {
        let x = req(None, Some("JE"), ("A", "1"), &[("B", "2")]);
        let y = req(Some("Traffic"), Some("JE"), ("B", "2"), &[("A", "1")]);
        assert!(is_compatible(&x, &y));

        let empty = req(Some(""), None, ("A", "1"), &[("B", "2")]);
        assert!(is_compatible(&empty, &y));
        assert!(is_compatible(&y, &empty));
    }

    #[test]
    fn test_case_sensitive() {
        let x = req(Some("engineering"), None, ("A", "1"), &[("B", "2")]);
        let y = req(Some("Engineering"), None, ("B", "2"), &[("A", "1")]);
        assert!(!is_compatible(&x, &y));
    }

    #[test]
    fn test_any_preference_slot_matches() {
        let x = req(None, None, ("A", "1"), &[("C", "3"), ("D", "4"), ("B", "2")]);
        let y = req(None, None, ("B", "2"), &[("A", "1")]);

        assert_eq!(preference_rank(&x, &y), Some(2));
        assert_eq!(preference_rank(&y, &x), Some(0));
        assert!(is_direct_match(&x, &y));
    }

    #[test]
    fn test_zone_and_division_both_required() {
        let x = req(None, None, ("A", "1"), &[("B", "9")]);
        let y = req(None, None, ("B", "2"), &[("A", "1")]);
        assert!(!wants_location_of(&x, &y));
    }

    #[test]
    fn test_self_is_not_a_match() {
        let x = req(None, None, ("A", "1"), &[("A", "1")]);
        assert!(!is_direct_match(&x, &x));
    }

    #[test]
    fn test_missing_current_location_never_wanted() {
        let x = req(None, None, ("A", "1"), &[("B", "2")]);
        let mut y = req(None, None, ("B", "2"), &[("A", "1")]);
        y.current_location = None;

        assert!(!wants_location_of(&x, &y));
        assert!(!is_direct_match(&x, &y));
    }
}
