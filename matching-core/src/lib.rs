//! Mutual transfer matching core
//!
//! Decides which outstanding transfer requests can swap postings.
//!
//! # Architecture

#![forbid(unsafe_code)]
//!
//! - **Predicate**: organizational compatibility plus wanted/current location checks
//! - **Direct matches**: two employees who each hold the posting the other wants
//! - **Cycles**: chains of three or more employees where each moves into the next one's posting
//! - **Reconciliation**: after an edit, downgrade relationships that no longer match
//!
//! Everything here is pure over its inputs. Loading requests and persisting
//! relationship updates belong to the caller.
//!
//! # Example
//!
//! ```
//! use matching_core::{find_cycles, find_direct_matches, Location, TransferRequest, UserId};
//!
//! let x = TransferRequest::new(UserId::new("x"), Location::new("NR", "DLI"), vec![Location::new("WR", "BCT")]);
//! let y = TransferRequest::new(UserId::new("y"), Location::new("WR", "BCT"), vec![Location::new("NR", "DLI")]);
//!
//! let pool = vec![y.clone()];
//! assert_eq!(find_direct_matches(&x, &pool).len(), 1);
//! assert!(find_cycles(&x, &pool).is_empty());
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod predicate;
pub mod direct;
pub mod cycles;
pub mod reconcile;
pub mod error;
pub mod config;
pub mod engine;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use config::MatchingConfig;
pub use engine::MatchEngine;
pub use predicate::{can_move_into, is_compatible, is_direct_match, preference_rank, wants_location_of};
pub use direct::find_direct_matches;
pub use cycles::{find_cycles, is_closed_chain, CycleFinder};
pub use reconcile::{reconcile, RequestLookup};
