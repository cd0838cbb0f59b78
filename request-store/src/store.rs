//! In-memory document store for requests and relationships
//!
//! Each document lives under its own `DashMap` shard lock, so concurrent
//! writes to one document are serialized (last write wins) while reads of
//! other documents proceed in parallel.
//!
//! Two indexes make the uniqueness rules atomic:
//! - owner → request: at most one active request per owner
//! - unordered request pair → relationship: at most one live relationship
//!   between two requests
//!
//! An index entry is claimed under its shard lock before the document is
//! written, so two racing inserts cannot both pass the check. Locks are
//! always taken index first, document map second.

use crate::document::RequestDocument;
use crate::{Error, Result};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use matching_core::{
    MatchRelationship, RelationshipId, RelationshipStatus, RequestId, RequestLookup,
    RequestStatus, TransferRequest, UserId,
};
use std::sync::Arc;

/// Equality predicate over request fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFilter {
    /// Owner equals
    Owner(UserId),
    /// Department equals (None matches absent)
    Department(Option<String>),
    /// Sub-department equals
    SubDepartment(Option<String>),
    /// Post equals
    Post(Option<String>),
    /// Status equals
    Status(RequestStatus),
}

impl RequestFilter {
    fn matches(&self, request: &TransferRequest) -> bool {
        match self {
            RequestFilter::Owner(owner) => &request.owner_id == owner,
            RequestFilter::Department(value) => &request.department == value,
            RequestFilter::SubDepartment(value) => &request.sub_department == value,
            RequestFilter::Post(value) => &request.post == value,
            RequestFilter::Status(status) => &request.status == status,
        }
    }
}

/// Equality predicate over relationship fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipFilter {
    /// Sender equals
    FromUser(UserId),
    /// Recipient equals
    ToUser(UserId),
    /// Sender request equals
    FromRequest(RequestId),
    /// Recipient request equals
    ToRequest(RequestId),
    /// Status equals
    Status(RelationshipStatus),
}

impl RelationshipFilter {
    fn matches(&self, relationship: &MatchRelationship) -> bool {
        match self {
            RelationshipFilter::FromUser(user) => &relationship.from_user_id == user,
            RelationshipFilter::ToUser(user) => &relationship.to_user_id == user,
            RelationshipFilter::FromRequest(id) => relationship.from_request_id.as_ref() == Some(id),
            RelationshipFilter::ToRequest(id) => relationship.to_request_id.as_ref() == Some(id),
            RelationshipFilter::Status(status) => &relationship.status == status,
        }
    }
}

/// Request and relationship store
#[derive(Debug, Clone, Default)]
pub struct RequestStore {
    // Map: request_id -> request
    requests: Arc<DashMap<RequestId, TransferRequest>>,
    // Map: relationship_id -> relationship
    relationships: Arc<DashMap<RelationshipId, MatchRelationship>>,
    // Map: owner -> active request_id
    owners: Arc<DashMap<UserId, RequestId>>,
    // Map: (lower request_id, higher request_id) -> live relationship_id
    pairs: Arc<DashMap<(RequestId, RequestId), RelationshipId>>,
}

/// Index key for the unordered pair of requests a relationship links
fn pair_key(relationship: &MatchRelationship) -> Option<(RequestId, RequestId)> {
    let (a, b) = (relationship.from_request_id?, relationship.to_request_id?);
    Some(if a <= b { (a, b) } else { (b, a) })
}

impl RequestStore {
    /// Create empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a document and store it under a fresh id
    ///
    /// Fails with [`Error::DuplicateActiveRequest`] when the owner already
    /// has a request.
    pub fn create_request(&self, document: RequestDocument) -> Result<TransferRequest> {
        let now = Utc::now();
        let request = document.into_request(RequestId::new(), now, now)?;

        match self.owners.entry(request.owner_id.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateActiveRequest(request.owner_id)),
            Entry::Vacant(slot) => {
                self.requests.insert(request.id, request.clone());
                slot.insert(request.id);

                tracing::debug!("Created request {} for {}", request.id, request.owner_id);
                Ok(request)
            }
        }
    }

    /// Replace a request's contents, keeping id, owner and creation time
    ///
    /// Returns the previous and the new version.
    pub fn update_request(
        &self,
        id: &RequestId,
        mut document: RequestDocument,
    ) -> Result<(TransferRequest, TransferRequest)> {
        let mut entry = self
            .requests
            .get_mut(id)
            .ok_or(Error::RequestNotFound(*id))?;

        let before = entry.value().clone();
        document.owner_id = Some(before.owner_id.to_string());
        let after = document.into_request(before.id, before.created_at, Utc::now())?;
        *entry.value_mut() = after.clone();

        tracing::debug!("Updated request {}", id);
        Ok((before, after))
    }

    /// Remove a request and release its owner's claim
    pub fn delete_request(&self, id: &RequestId) -> Result<TransferRequest> {
        let (_, request) = self.requests.remove(id).ok_or(Error::RequestNotFound(*id))?;
        self.owners.remove_if(&request.owner_id, |_, claimed| claimed == id);

        tracing::debug!("Deleted request {}", id);
        Ok(request)
    }

    /// Get a request
    pub fn get_request(&self, id: &RequestId) -> Option<TransferRequest> {
        self.requests.get(id).map(|entry| entry.value().clone())
    }

    /// Requests satisfying every filter, oldest first
    pub fn query_requests(&self, filters: &[RequestFilter]) -> Vec<TransferRequest> {
        let mut results: Vec<TransferRequest> = self
            .requests
            .iter()
            .filter(|entry| filters.iter().all(|f| f.matches(entry.value())))
            .map(|entry| entry.value().clone())
            .collect();

        results.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        results
    }

    /// Every other request the target could possibly match
    ///
    /// With `prefilter` set, only requests whose department, sub-department
    /// and post are equal to the target's or absent are returned. This is the
    /// compatibility rule itself, so the match results are the same as for a
    /// full scan.
    pub fn candidate_pool(&self, target: &TransferRequest, prefilter: bool) -> Vec<TransferRequest> {
        let mut pool = self.query_requests(&[RequestFilter::Status(RequestStatus::Pending)]);
        pool.retain(|candidate| candidate.id != target.id);

        if prefilter {
            pool.retain(|candidate| matching_core::is_compatible(target, candidate));
        }

        pool
    }

    /// Number of stored requests
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Store a new relationship
    ///
    /// Fails with [`Error::DuplicateRelationship`] when another relationship
    /// between the same two requests is still live, whichever side sent it.
    /// A `no_longer_matching` one is superseded.
    pub fn insert_relationship(&self, relationship: MatchRelationship) -> Result<()> {
        let Some(key) = pair_key(&relationship) else {
            self.store_relationship(relationship);
            return Ok(());
        };

        match self.pairs.entry(key) {
            Entry::Occupied(mut slot) => {
                let existing = *slot.get();
                let live = self
                    .relationships
                    .get(&existing)
                    .is_some_and(|r| r.status != RelationshipStatus::NoLongerMatching);
                if live {
                    return Err(Error::DuplicateRelationship(existing));
                }
                slot.insert(relationship.id);
                self.store_relationship(relationship);
            }
            Entry::Vacant(slot) => {
                slot.insert(relationship.id);
                self.store_relationship(relationship);
            }
        }

        Ok(())
    }

    fn store_relationship(&self, relationship: MatchRelationship) {
        tracing::debug!(
            "Stored relationship {} ({} -> {})",
            relationship.id,
            relationship.from_user_id,
            relationship.to_user_id
        );
        self.relationships.insert(relationship.id, relationship);
    }

    /// Overwrite an existing relationship
    pub fn update_relationship(&self, relationship: MatchRelationship) -> Result<()> {
        let mut entry = self
            .relationships
            .get_mut(&relationship.id)
            .ok_or(Error::RelationshipNotFound(relationship.id))?;
        *entry.value_mut() = relationship;
        Ok(())
    }

    /// Get a relationship
    pub fn get_relationship(&self, id: &RelationshipId) -> Option<MatchRelationship> {
        self.relationships.get(id).map(|entry| entry.value().clone())
    }

    /// Relationships satisfying every filter, oldest first
    pub fn query_relationships(&self, filters: &[RelationshipFilter]) -> Vec<MatchRelationship> {
        let mut results: Vec<MatchRelationship> = self
            .relationships
            .iter()
            .filter(|entry| filters.iter().all(|f| f.matches(entry.value())))
            .map(|entry| entry.value().clone())
            .collect();

        results.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        results
    }

    /// Relationships that reference the request or, for user-only records, its owner
    pub fn relationships_for(&self, request: &TransferRequest) -> Vec<MatchRelationship> {
        let mut results: Vec<MatchRelationship> = self
            .relationships
            .iter()
            .filter(|entry| entry.value().involves(request))
            .map(|entry| entry.value().clone())
            .collect();

        results.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        results
    }
}

impl RequestLookup for RequestStore {
    fn request_by_id(&self, id: &RequestId) -> Option<TransferRequest> {
        self.get_request(id)
    }

    fn request_by_owner(&self, owner: &UserId) -> Option<TransferRequest> {
        let id = *self.owners.get(owner)?;
        self.get_request(&id)
    }
}
