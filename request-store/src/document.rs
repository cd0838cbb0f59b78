//! Raw request documents and boundary validation
//!
//! Documents arrive loosely shaped (every field optional, strings untrimmed).
//! They are normalized into typed [`TransferRequest`] records here so the
//! matching core only ever sees well-formed input:
//!
//! - strings are trimmed; empty organizational fields become wildcards (`None`)
//! - wanted locations with an empty zone or division are dropped, repeats removed
//! - owner, current location and 1..=3 wanted locations are required

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use matching_core::{Location, RequestId, RequestStatus, TransferRequest, UserId, MAX_WANTED_LOCATIONS};
use serde::{Deserialize, Serialize};

/// Location as stored in documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationDocument {
    /// Zone
    pub zone: Option<String>,
    /// Division
    pub division: Option<String>,
}

impl LocationDocument {
    /// Create from zone and division
    pub fn new(zone: &str, division: &str) -> Self {
        Self {
            zone: Some(zone.to_string()),
            division: Some(division.to_string()),
        }
    }

    fn normalize(&self) -> Option<Location> {
        let zone = non_empty(self.zone.as_deref())?;
        let division = non_empty(self.division.as_deref())?;
        Some(Location::new(zone, division))
    }
}

/// Transfer request as submitted or stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestDocument {
    /// Owning employee
    pub owner_id: Option<String>,
    /// Department
    pub department: Option<String>,
    /// Sub-department
    pub sub_department: Option<String>,
    /// Post
    pub post: Option<String>,
    /// Current posting
    pub current_location: Option<LocationDocument>,
    /// Ranked wanted postings
    pub wanted_locations: Vec<LocationDocument>,
    /// Contact number
    pub contact_number: Option<String>,
    /// Display name
    pub employee_name: Option<String>,
}

impl RequestDocument {
    /// Normalize into a typed request
    pub fn into_request(
        self,
        id: RequestId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<TransferRequest> {
        let owner_id = non_empty(self.owner_id.as_deref())
            .ok_or_else(|| Error::InvalidDocument("ownerId is required".to_string()))?;

        let current_location = self
            .current_location
            .as_ref()
            .and_then(LocationDocument::normalize)
            .ok_or_else(|| {
                Error::InvalidDocument(format!("request for {} has no current location", owner_id))
            })?;

        let mut wanted_locations: Vec<Location> = Vec::new();
        for location in self.wanted_locations.iter().filter_map(LocationDocument::normalize) {
            if !wanted_locations.contains(&location) {
                wanted_locations.push(location);
            }
        }

        if wanted_locations.is_empty() || wanted_locations.len() > MAX_WANTED_LOCATIONS {
            return Err(Error::InvalidDocument(format!(
                "request for {} needs 1 to {} wanted locations, got {}",
                owner_id,
                MAX_WANTED_LOCATIONS,
                wanted_locations.len()
            )));
        }

        let request = TransferRequest {
            id,
            owner_id: UserId::new(owner_id),
            department: non_empty(self.department.as_deref()).map(str::to_string),
            sub_department: non_empty(self.sub_department.as_deref()).map(str::to_string),
            post: non_empty(self.post.as_deref()).map(str::to_string),
            current_location: Some(current_location),
            wanted_locations,
            contact_number: non_empty(self.contact_number.as_deref()).map(str::to_string),
            employee_name: non_empty(self.employee_name.as_deref()).map(str::to_string),
            status: RequestStatus::Pending,
            created_at,
            updated_at,
        };

        request.validate()?;
        Ok(request)
    }
}

impl From<&TransferRequest> for RequestDocument {
    fn from(request: &TransferRequest) -> Self {
        let location = |l: &Location| LocationDocument::new(&l.zone, &l.division);
        Self {
            owner_id: Some(request.owner_id.to_string()),
            department: request.department.clone(),
            sub_department: request.sub_department.clone(),
            post: request.post.clone(),
            current_location: request.current_location.as_ref().map(location),
            wanted_locations: request.wanted_locations.iter().map(location).collect(),
            contact_number: request.contact_number.clone(),
            employee_name: request.employee_name.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
