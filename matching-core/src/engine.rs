//! Matching engine
//!
//! Bundles the finders and the reconciler behind one configured value.

use crate::{
    config::MatchingConfig,
    cycles::CycleFinder,
    direct,
    reconcile::{self, RequestLookup},
    types::*,
};

/// Configured entry point for matching and reconciliation
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    /// Cycle finder
    cycles: CycleFinder,

    /// Configuration
    config: MatchingConfig,
}

impl MatchEngine {
    /// Create new matching engine
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            cycles: CycleFinder::from_config(&config),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Mutual two-party swaps for `target`
    pub fn find_direct_matches<'a>(
        &self,
        target: &TransferRequest,
        pool: &'a [TransferRequest],
    ) -> Vec<&'a TransferRequest> {
        direct::find_direct_matches(target, pool)
    }

    /// Swap chains of three or more through `target`
    pub fn find_cycles(&self, target: &TransferRequest, pool: &[TransferRequest]) -> Vec<SwapChain> {
        self.cycles.find_cycles(target, pool)
    }

    /// Downgrades for an edited request
    pub fn reconcile<L>(
        &self,
        edited: &TransferRequest,
        relationships: &[MatchRelationship],
        peers: &L,
    ) -> Vec<MatchRelationship>
    where
        L: RequestLookup + ?Sized,
    {
        reconcile::reconcile(edited, relationships, peers)
    }

    /// Downgrades for an edit, skipped when no matching field changed
    pub fn reconcile_edit<L>(
        &self,
        before: &TransferRequest,
        after: &TransferRequest,
        relationships: &[MatchRelationship],
        peers: &L,
    ) -> Vec<MatchRelationship>
    where
        L: RequestLookup + ?Sized,
    {
        if !edit_affects_matching(before, after) {
            tracing::debug!("Edit of {} touched no matching fields", after.id);
            return Vec::new();
        }

        self.reconcile(after, relationships, peers)
    }
}
