//! Swap desk
//!
//! Wires the request store to the matching engine.
//!
//! # Flows
//!
//! - **Matching**: load the target, build its candidate pool, run the finders
//! - **Edits**: update the document, reconcile when a matching field
//!   changed, persist the downgrades
//! - **Relationships**: send, respond (accept/reject/block) and undo
//!
//! Requests whose owners are on either side of a blocked relationship with
//! the target's owner are left out of its matches.

use crate::{
    config::Config,
    document::RequestDocument,
    metrics::Metrics,
    store::RequestStore,
    Error, Result,
};
use chrono::Utc;
use matching_core::{
    preference_rank, MatchEngine, MatchRelationship, RelationshipId, RelationshipStatus,
    RequestId, SwapChain, TransferRequest, UserId,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Counterpart's answer to a swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Agree to swap
    Accept,
    /// Decline
    Reject,
    /// Decline and hide the sender from future matches
    Block,
}

impl From<Response> for RelationshipStatus {
    fn from(response: Response) -> Self {
        match response {
            Response::Accept => RelationshipStatus::Accepted,
            Response::Reject => RelationshipStatus::Rejected,
            Response::Block => RelationshipStatus::Blocked,
        }
    }
}

/// Result of editing a request
#[derive(Debug, Clone)]
pub struct EditOutcome {
    /// Request after the edit
    pub request: TransferRequest,

    /// Relationships downgraded and persisted as a consequence
    pub downgraded: Vec<MatchRelationship>,
}

/// Swap desk service
#[derive(Debug)]
pub struct SwapDesk {
    /// Document store
    store: Arc<RequestStore>,

    /// Matching engine
    engine: MatchEngine,

    /// Metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl SwapDesk {
    /// Create new swap desk over a store
    pub fn new(store: Arc<RequestStore>, config: Config) -> Result<Self> {
        config.matching.validate()?;

        Ok(Self {
            store,
            engine: MatchEngine::new(config.matching.clone()),
            metrics: Metrics::new()?,
            config,
        })
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<RequestStore> {
        &self.store
    }

    /// Metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Submit a new request; one active request per owner
    pub fn submit_request(&self, document: RequestDocument) -> Result<TransferRequest> {
        let request = self.store.create_request(document)?;
        tracing::info!("Request {} submitted by {}", request.id, request.owner_id);
        Ok(request)
    }

    /// Apply an edit and downgrade relationships it invalidates
    pub fn edit_request(&self, id: &RequestId, document: RequestDocument) -> Result<EditOutcome> {
        let (before, after) = self.store.update_request(id, document)?;

        let relationships = self.store.relationships_for(&after);
        let downgraded = self
            .engine
            .reconcile_edit(&before, &after, &relationships, self.store.as_ref());

        self.persist_downgrades(&downgraded)?;

        Ok(EditOutcome {
            request: after,
            downgraded,
        })
    }

    /// Delete a request; its live relationships become `no_longer_matching`
    pub fn withdraw_request(&self, id: &RequestId) -> Result<Vec<MatchRelationship>> {
        let removed = self.store.delete_request(id)?;
        let now = Utc::now();

        let downgraded: Vec<MatchRelationship> = self
            .store
            .relationships_for(&removed)
            .iter()
            .filter(|r| r.status.is_reconcilable())
            .map(|r| r.downgraded(now))
            .collect();

        self.persist_downgrades(&downgraded)?;
        tracing::info!(
            "Request {} withdrawn, {} relationships downgraded",
            removed.id,
            downgraded.len()
        );

        Ok(downgraded)
    }

    /// Direct matches for a request, best preference slot first, then most recent
    pub fn direct_matches(&self, id: &RequestId) -> Result<Vec<TransferRequest>> {
        let target = self.get_request(id)?;
        // Linear scan, so the whole pool is searched
        let pool = self.pool_for(&target, self.config.store.prefilter_pool);

        let started = Instant::now();
        let mut matches: Vec<TransferRequest> = self
            .engine
            .find_direct_matches(&target, &pool)
            .into_iter()
            .cloned()
            .collect();
        self.metrics
            .record_direct_matches(matches.len(), started.elapsed().as_secs_f64());

        matches.sort_by(|a, b| {
            preference_rank(&target, a)
                .cmp(&preference_rank(&target, b))
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });

        tracing::info!("Request {}: {} direct matches", target.id, matches.len());
        Ok(matches)
    }

    /// Swap chains of three or more through a request, shortest first
    pub fn cycles(&self, id: &RequestId) -> Result<Vec<SwapChain>> {
        let target = self.get_request(id)?;
        // Intermediate hops only need to be compatible with their neighbours,
        // so the pool cannot be narrowed to the target's classification
        let pool = self.capped(&target, self.pool_for(&target, false));

        let started = Instant::now();
        let chains = self.engine.find_cycles(&target, &pool);
        self.metrics
            .record_cycles(chains.len(), started.elapsed().as_secs_f64());

        tracing::info!("Request {}: {} swap chains", target.id, chains.len());
        Ok(chains)
    }

    /// Send a swap request from one request's owner to a matched counterpart
    pub fn send_swap_request(&self, from: &RequestId, to: &RequestId) -> Result<MatchRelationship> {
        let sender = self.get_request(from)?;
        let recipient = self.get_request(to)?;

        if !matching_core::is_direct_match(&sender, &recipient) {
            return Err(Error::NotMatching(sender.id, recipient.id));
        }

        let relationship = MatchRelationship::between(&sender, &recipient);
        self.store.insert_relationship(relationship.clone())?;

        tracing::info!(
            "Swap request {} sent from {} to {}",
            relationship.id,
            relationship.from_user_id,
            relationship.to_user_id
        );
        Ok(relationship)
    }

    /// Record the recipient's answer to a pending swap request
    pub fn respond(
        &self,
        id: &RelationshipId,
        responder: &UserId,
        response: Response,
    ) -> Result<MatchRelationship> {
        let relationship = self.get_relationship(id, responder)?;

        if relationship.status != RelationshipStatus::Pending {
            return Err(Error::InvalidTransition {
                from: relationship.status,
                reason: format!("cannot respond with {:?}", response),
            });
        }

        let updated = MatchRelationship {
            status: response.into(),
            responded_at: Some(Utc::now()),
            ..relationship
        };
        self.store.update_relationship(updated.clone())?;

        tracing::info!("Relationship {} {}", updated.id, updated.status);
        Ok(updated)
    }

    /// Revert an accept, reject or block to pending
    pub fn undo(&self, id: &RelationshipId, responder: &UserId) -> Result<MatchRelationship> {
        let relationship = self.get_relationship(id, responder)?;

        if !matches!(
            relationship.status,
            RelationshipStatus::Accepted | RelationshipStatus::Rejected | RelationshipStatus::Blocked
        ) {
            return Err(Error::InvalidTransition {
                from: relationship.status,
                reason: "nothing to undo".to_string(),
            });
        }

        let updated = MatchRelationship {
            status: RelationshipStatus::Pending,
            responded_at: None,
            ..relationship
        };
        self.store.update_relationship(updated.clone())?;

        tracing::info!("Relationship {} reverted to pending", updated.id);
        Ok(updated)
    }

    fn get_request(&self, id: &RequestId) -> Result<TransferRequest> {
        self.store.get_request(id).ok_or(Error::RequestNotFound(*id))
    }

    /// Relationship that `responder` is the recipient of
    fn get_relationship(&self, id: &RelationshipId, responder: &UserId) -> Result<MatchRelationship> {
        let relationship = self
            .store
            .get_relationship(id)
            .ok_or(Error::RelationshipNotFound(*id))?;

        if &relationship.to_user_id != responder {
            return Err(Error::NotAuthorized(responder.clone(), *id));
        }

        Ok(relationship)
    }

    /// Candidate pool minus blocked owners
    fn pool_for(&self, target: &TransferRequest, prefilter: bool) -> Vec<TransferRequest> {
        let blocked: HashSet<UserId> = self
            .store
            .relationships_for(target)
            .into_iter()
            .filter(|r| r.status == RelationshipStatus::Blocked)
            .map(|r| {
                if r.from_user_id == target.owner_id {
                    r.to_user_id
                } else {
                    r.from_user_id
                }
            })
            .collect();

        let mut pool = self.store.candidate_pool(target, prefilter);
        pool.retain(|candidate| !blocked.contains(&candidate.owner_id));
        pool
    }

    /// Cycle-search pool limited to the `max_pool_size` most recent requests
    fn capped(&self, target: &TransferRequest, mut pool: Vec<TransferRequest>) -> Vec<TransferRequest> {
        let max = self.config.store.max_pool_size;
        if max > 0 && pool.len() > max {
            tracing::warn!(
                "Candidate pool for {} has {} requests, keeping the {} most recent",
                target.id,
                pool.len(),
                max
            );
            pool.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            pool.truncate(max);
        }

        pool
    }

    fn persist_downgrades(&self, downgraded: &[MatchRelationship]) -> Result<()> {
        for relationship in downgraded {
            self.store.update_relationship(relationship.clone())?;
        }

        if !downgraded.is_empty() {
            self.metrics.record_downgrades(downgraded.len());
            tracing::info!("Persisted {} relationship downgrades", downgraded.len());
        }

        Ok(())
    }
}
