//! The immutable operating context of a register session.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::org::{Company, Location, User};
use crate::selection::SelectionError;

/// Authenticated operator plus the company and location they sell for.
///
/// A `Session` can only be built through [`Session::new`], which guarantees
/// that the location belongs to the company. Fields are read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    user: User,
    company: Company,
    location: Location,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Create a session for a consistent company/location pair.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidSelection`] if `location` does not
    /// belong to `company`.
    pub fn new(user: User, company: Company, location: Location) -> Result<Self, SelectionError> {
        if !location.belongs_to(&company) {
            return Err(SelectionError::InvalidSelection {
                company_id: company.id,
                location_id: location.id,
            });
        }
        Ok(Self {
            user,
            company,
            location,
            started_at: Utc::now(),
        })
    }

    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub const fn company(&self) -> &Company {
        &self.company
    }

    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// When the session was resolved.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
