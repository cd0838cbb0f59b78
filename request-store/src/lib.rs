//! Request store and swap desk
//!
//! Reference document store for transfer requests and match relationships,
//! plus the service that runs the matching core against it.
//!
//! # Architecture

#![forbid(unsafe_code)]
//!
//! - **Documents**: loosely shaped input normalized into typed requests at the boundary
//! - **Store**: `DashMap`-backed CRUD with query-by-equality
//! - **Desk**: matching queries, edit reconciliation, relationship lifecycle
//! - **Metrics**: Prometheus counters and latency histogram
//!
//! # Example
//!
//! ```
//! use request_store::{Config, RequestDocument, LocationDocument, RequestStore, SwapDesk};
//! use std::sync::Arc;
//!
//! # fn main() -> request_store::Result<()> {
//! let desk = SwapDesk::new(Arc::new(RequestStore::new()), Config::default())?;
//!
//! let x = desk.submit_request(RequestDocument {
//!     owner_id: Some("x".into()),
//!     current_location: Some(LocationDocument::new("NR", "DLI")),
//!     wanted_locations: vec![LocationDocument::new("WR", "BCT")],
//!     ..Default::default()
//! })?;
//! desk.submit_request(RequestDocument {
//!     owner_id: Some("y".into()),
//!     current_location: Some(LocationDocument::new("WR", "BCT")),
//!     wanted_locations: vec![LocationDocument::new("NR", "DLI")],
//!     ..Default::default()
//! })?;
//!
//! assert_eq!(desk.direct_matches(&x.id)?.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod error;
pub mod config;
pub mod document;
pub mod store;
pub mod desk;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use config::Config;
pub use document::{LocationDocument, RequestDocument};
pub use store::{RelationshipFilter, RequestFilter, RequestStore};
pub use desk::{EditOutcome, Response, SwapDesk};
pub use metrics::Metrics;
