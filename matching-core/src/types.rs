//! Core types for the matching engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Maximum number of ranked wanted locations per request
pub const MAX_WANTED_LOCATIONS: usize = 3;

/// Transfer request identifier (assigned by the repository)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new time-ordered request ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employee identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create new user ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A posting location: railway zone plus division within the zone
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Railway zone
    pub zone: String,

    /// Division within the zone
    pub division: String,
}

impl Location {
    /// Create new location
    pub fn new(zone: impl Into<String>, division: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            division: division.into(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.zone, self.division)
    }
}

/// Request status, owned by the surrounding application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Active and visible to matching
    #[default]
    Pending,
}

/// An employee's outstanding transfer request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Request ID
    pub id: RequestId,

    /// Owning employee
    pub owner_id: UserId,

    /// Department (absent = any)
    pub department: Option<String>,

    /// Sub-department (absent = any)
    pub sub_department: Option<String>,

    /// Post / designation (absent = any)
    pub post: Option<String>,

    /// Where the employee currently works
    pub current_location: Option<Location>,

    /// Ranked preferences, first choice first
    pub wanted_locations: Vec<Location>,

    /// Contact number (never used for matching)
    #[serde(default)]
    pub contact_number: Option<String>,

    /// Display name (never used for matching)
    #[serde(default)]
    pub employee_name: Option<String>,

    /// Request status
    #[serde(default)]
    pub status: RequestStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl TransferRequest {
    /// Create a request with a fresh ID and timestamps
    pub fn new(
        owner_id: UserId,
        current_location: Location,
        wanted_locations: Vec<Location>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RequestId::new(),
            owner_id,
            department: None,
            sub_department: None,
            post: None,
            current_location: Some(current_location),
            wanted_locations,
            contact_number: None,
            employee_name: None,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the organizational classification
    pub fn with_organization(
        mut self,
        department: Option<&str>,
        sub_department: Option<&str>,
        post: Option<&str>,
    ) -> Self {
        self.department = department.map(str::to_string);
        self.sub_department = sub_department.map(str::to_string);
        self.post = post.map(str::to_string);
        self
    }

    /// Whether the record can take part in matching at all
    pub fn is_matchable(&self) -> bool {
        self.current_location.is_some() && !self.wanted_locations.is_empty()
    }

    /// Check the record invariants enforced at the repository boundary
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.as_str().trim().is_empty() {
            return Err(Error::InvalidRequest("owner id is empty".to_string()));
        }

        if self.current_location.is_none() {
            return Err(Error::InvalidRequest(format!(
                "request {} has no current location",
                self.id
            )));
        }

        if self.wanted_locations.is_empty() {
            return Err(Error::InvalidRequest(format!(
                "request {} has no wanted locations",
                self.id
            )));
        }

        if self.wanted_locations.len() > MAX_WANTED_LOCATIONS {
            return Err(Error::InvalidRequest(format!(
                "request {} has {} wanted locations (max {})",
                self.id,
                self.wanted_locations.len(),
                MAX_WANTED_LOCATIONS
            )));
        }

        Ok(())
    }

    /// Fields that influence matching
    pub fn matching_key(&self) -> MatchingKey<'_> {
        MatchingKey {
            department: self.department.as_deref(),
            sub_department: self.sub_department.as_deref(),
            post: self.post.as_deref(),
            current_location: self.current_location.as_ref(),
            wanted_locations: &self.wanted_locations,
        }
    }
}

/// Borrowed view of the fields read by the match predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingKey<'a> {
    /// Department
    pub department: Option<&'a str>,
    /// Sub-department
    pub sub_department: Option<&'a str>,
    /// Post
    pub post: Option<&'a str>,
    /// Current location
    pub current_location: Option<&'a Location>,
    /// Wanted locations
    pub wanted_locations: &'a [Location],
}

/// True when an edit touched any field the match predicate reads
pub fn edit_affects_matching(before: &TransferRequest, after: &TransferRequest) -> bool {
    before.matching_key() != after.matching_key()
}

/// Relationship identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(Uuid);

impl RelationshipId {
    /// Generate new relationship ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RelationshipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relationship status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    /// Sent, awaiting the counterpart's response
    Pending,
    /// Counterpart accepted
    Accepted,
    /// Counterpart rejected
    Rejected,
    /// Counterpart blocked the sender
    Blocked,
    /// Underlying requests were edited and no longer match
    NoLongerMatching,
}

impl RelationshipStatus {
    /// Statuses the reconciler re-evaluates
    pub fn is_reconcilable(&self) -> bool {
        matches!(
            self,
            RelationshipStatus::Pending
                | RelationshipStatus::Accepted
                | RelationshipStatus::Rejected
        )
    }
}

impl std::fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RelationshipStatus::Pending => "pending",
            RelationshipStatus::Accepted => "accepted",
            RelationshipStatus::Rejected => "rejected",
            RelationshipStatus::Blocked => "blocked",
            RelationshipStatus::NoLongerMatching => "no_longer_matching",
        };
        f.write_str(s)
    }
}

/// A swap request sent from one employee to a matched counterpart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRelationship {
    /// Relationship ID
    pub id: RelationshipId,

    /// Sender's request, when recorded
    pub from_request_id: Option<RequestId>,

    /// Counterpart's request, when recorded
    pub to_request_id: Option<RequestId>,

    /// Sender
    pub from_user_id: UserId,

    /// Counterpart (the responding party)
    pub to_user_id: UserId,

    /// Status
    pub status: RelationshipStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// When the counterpart (or reconciler) last changed the status
    pub responded_at: Option<DateTime<Utc>>,
}

impl MatchRelationship {
    /// Create a pending relationship between two requests
    pub fn between(from: &TransferRequest, to: &TransferRequest) -> Self {
        Self {
            id: RelationshipId::new(),
            from_request_id: Some(from.id),
            to_request_id: Some(to.id),
            from_user_id: from.owner_id.clone(),
            to_user_id: to.owner_id.clone(),
            status: RelationshipStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    /// Which side the request is on, if it participates
    pub fn side_of(&self, request: &TransferRequest) -> Option<Side> {
        if self.from_request_id == Some(request.id) {
            return Some(Side::From);
        }
        if self.to_request_id == Some(request.id) {
            return Some(Side::To);
        }

        // Records that only carry user ids are matched by owner
        if self.from_request_id.is_none() && self.from_user_id == request.owner_id {
            return Some(Side::From);
        }
        if self.to_request_id.is_none() && self.to_user_id == request.owner_id {
            return Some(Side::To);
        }

        None
    }

    /// Whether the relationship references the given request or its owner
    pub fn involves(&self, request: &TransferRequest) -> bool {
        self.side_of(request).is_some()
    }

    /// The counterpart of `side`
    pub fn counterpart(&self, side: Side) -> Counterpart<'_> {
        match side {
            Side::From => Counterpart {
                request_id: self.to_request_id.as_ref(),
                user_id: &self.to_user_id,
            },
            Side::To => Counterpart {
                request_id: self.from_request_id.as_ref(),
                user_id: &self.from_user_id,
            },
        }
    }

    /// Copy of this relationship marked `no_longer_matching`
    pub fn downgraded(&self, at: DateTime<Utc>) -> Self {
        Self {
            status: RelationshipStatus::NoLongerMatching,
            responded_at: Some(at),
            ..self.clone()
        }
    }
}

/// Side of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Sender
    From,
    /// Recipient
    To,
}

/// Reference to the other party of a relationship
#[derive(Debug, Clone, Copy)]
pub struct Counterpart<'a> {
    /// Counterpart's request, if recorded
    pub request_id: Option<&'a RequestId>,
    /// Counterpart's user
    pub user_id: &'a UserId,
}

/// One hop of a swap chain: `mover` relocates into `location`, vacated by `vacated_by`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Request whose owner moves
    pub mover: RequestId,

    /// Request whose owner currently holds the location
    pub vacated_by: RequestId,

    /// Location changing hands
    pub location: Location,
}

/// A closed chain of three or more swaps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapChain {
    /// Participants in order; each wants the next one's location,
    /// the last wants the first's
    pub participants: Vec<TransferRequest>,
}

impl SwapChain {
    /// Number of participants
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participant IDs in order
    pub fn ids(&self) -> Vec<RequestId> {
        self.participants.iter().map(|p| p.id).collect()
    }

    /// Whether the request takes part
    pub fn contains(&self, id: &RequestId) -> bool {
        self.participants.iter().any(|p| &p.id == id)
    }

    /// The hops that make up the chain, including the wraparound
    pub fn links(&self) -> Vec<ChainLink> {
        let n = self.participants.len();
        (0..n)
            .filter_map(|i| {
                let mover = &self.participants[i];
                let holder = &self.participants[(i + 1) % n];
                holder.current_location.as_ref().map(|location| ChainLink {
                    mover: mover.id,
                    vacated_by: holder.id,
                    location: location.clone(),
                })
            })
            .collect()
    }
}
