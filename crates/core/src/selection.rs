//! Company and location selection.
//!
//! The operator picks a company, then one of that company's locations, then
//! continues into a [`Session`]. Selection moves through three states:
//!
//! ```text
//! NoCompany --select_company--> CompanyChosen --select_location--> FullyResolved
//!                                    ^                                  |
//!                                    +---------select_company-----------+
//! ```
//!
//! Choosing a company always clears the chosen location and the location
//! list, and issues a [`LocationTicket`] for the location fetch. Location
//! responses delivered with an outdated ticket are dropped, so a slow
//! response for a previously chosen company can never populate the list for
//! the current one.

use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::LoadOutcome;
use crate::types::{Company, CompanyId, Location, LocationId, Session, User};

/// Errors raised by the selection state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The company was not in the most recent company list.
    #[error("unknown company: {0}")]
    UnknownCompany(CompanyId),

    /// The location is not in the chosen company's location list.
    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    /// A location was chosen before any company.
    #[error("select a company before choosing a location")]
    NoCompany,

    /// `resolve` was called before both a company and a location were chosen.
    #[error("company and location must both be selected")]
    Incomplete,

    /// The location does not belong to the company.
    #[error("location {location_id} does not belong to company {company_id}")]
    InvalidSelection {
        company_id: CompanyId,
        location_id: LocationId,
    },
}

/// Where the operator is in the selection flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    NoCompany,
    CompanyChosen,
    FullyResolved,
}

/// Handle for one in-flight location fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTicket {
    company_id: CompanyId,
    epoch: u64,
}

impl LocationTicket {
    /// Company whose locations should be fetched.
    #[must_use]
    pub const fn company_id(&self) -> &CompanyId {
        &self.company_id
    }
}

/// Selection state for one login.
#[derive(Debug, Clone, Default)]
pub struct ContextSelection {
    companies: Vec<Company>,
    company: Option<Company>,
    locations: Vec<Location>,
    locations_loaded: bool,
    location: Option<Location>,
    epoch: u64,
}

impl ContextSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list of selectable companies.
    ///
    /// Any previous choice is discarded and in-flight location fetches
    /// become stale.
    pub fn set_companies(&mut self, companies: Vec<Company>) {
        debug!(count = companies.len(), "Company list replaced");
        self.companies = companies;
        self.reset_company();
    }

    #[must_use]
    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    /// Choose a company from the current list.
    ///
    /// Clears the chosen location and the location list. The returned ticket
    /// must accompany the location fetch result in
    /// [`apply_locations`](Self::apply_locations).
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownCompany`] if `company_id` is not in
    /// the company list. The current selection is left untouched.
    pub fn select_company(&mut self, company_id: &CompanyId) -> Result<LocationTicket, SelectionError> {
        let company = self
            .companies
            .iter()
            .find(|c| &c.id == company_id)
            .cloned()
            .ok_or_else(|| SelectionError::UnknownCompany(company_id.clone()))?;

        self.epoch += 1;
        self.company = Some(company);
        self.location = None;
        self.locations.clear();
        self.locations_loaded = false;
        debug!(company_id = %company_id, epoch = self.epoch, "Company selected");

        Ok(LocationTicket {
            company_id: company_id.clone(),
            epoch: self.epoch,
        })
    }

    /// Return to [`SelectionState::NoCompany`].
    pub fn reset_company(&mut self) {
        self.epoch += 1;
        self.company = None;
        self.location = None;
        self.locations.clear();
        self.locations_loaded = false;
    }

    /// Deliver the result of a location fetch.
    ///
    /// Results for superseded tickets are dropped whatever they contain.
    /// Locations that do not belong to the chosen company are discarded.
    ///
    /// # Errors
    ///
    /// Returns the fetch's own error when a current ticket failed; the
    /// location list stays empty.
    pub fn apply_locations<E>(
        &mut self,
        ticket: &LocationTicket,
        result: Result<Vec<Location>, E>,
    ) -> Result<LoadOutcome, E> {
        let current = self
            .company
            .as_ref()
            .is_some_and(|c| c.id == ticket.company_id);
        if ticket.epoch != self.epoch || !current {
            warn!(company_id = %ticket.company_id, "Dropping superseded location response");
            return Ok(LoadOutcome::Stale);
        }

        let locations = result?;
        let total = locations.len();
        self.locations = locations
            .into_iter()
            .filter(|l| l.company_id == ticket.company_id)
            .collect();
        if self.locations.len() < total {
            warn!(
                company_id = %ticket.company_id,
                dropped = total - self.locations.len(),
                "Discarded locations belonging to another company"
            );
        }
        self.locations_loaded = true;
        debug!(company_id = %ticket.company_id, count = self.locations.len(), "Locations loaded");
        Ok(LoadOutcome::Applied)
    }

    /// Locations of the chosen company. Empty until loaded, and empty when
    /// the company has no locations.
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Whether the location list for the chosen company has arrived.
    #[must_use]
    pub const fn locations_loaded(&self) -> bool {
        self.locations_loaded
    }

    /// Choose one of the chosen company's locations.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::NoCompany`] if no company is chosen
    /// - [`SelectionError::UnknownLocation`] if the location is not listed
    /// - [`SelectionError::InvalidSelection`] if it belongs to another company
    pub fn select_location(&mut self, location_id: &LocationId) -> Result<(), SelectionError> {
        let company = self.company.as_ref().ok_or(SelectionError::NoCompany)?;
        let location = self
            .locations
            .iter()
            .find(|l| &l.id == location_id)
            .ok_or_else(|| SelectionError::UnknownLocation(location_id.clone()))?;

        if !location.belongs_to(company) {
            return Err(SelectionError::InvalidSelection {
                company_id: company.id.clone(),
                location_id: location_id.clone(),
            });
        }

        debug!(location_id = %location_id, "Location selected");
        self.location = Some(location.clone());
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> SelectionState {
        match (&self.company, &self.location) {
            (None, _) => SelectionState::NoCompany,
            (Some(_), None) => SelectionState::CompanyChosen,
            (Some(_), Some(_)) => SelectionState::FullyResolved,
        }
    }

    #[must_use]
    pub const fn selected_company(&self) -> Option<&Company> {
        self.company.as_ref()
    }

    #[must_use]
    pub const fn selected_location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Build the session for `user` from the current choice.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Incomplete`] unless both a company and a
    /// location are chosen.
    pub fn resolve(&self, user: User) -> Result<Session, SelectionError> {
        match (&self.company, &self.location) {
            (Some(company), Some(location)) => {
                Session::new(user, company.clone(), location.clone())
            }
            _ => Err(SelectionError::Incomplete),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::UserId;

    fn company(id: &str) -> Company {
        Company {
            id: CompanyId::new(id),
            name: format!("Company {id}"),
        }
    }

    fn location(id: &str, company_id: &str) -> Location {
        Location {
            id: LocationId::new(id),
            name: format!("Store {id}"),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            company_id: CompanyId::new(company_id),
        }
    }

    fn operator() -> User {
        User {
            id: UserId::new("u-1"),
            display_name: "Sam".to_string(),
        }
    }

    fn with_companies() -> ContextSelection {
        let mut selection = ContextSelection::new();
        selection.set_companies(vec![company("a"), company("b")]);
        selection
    }

    #[test]
    fn test_initial_state() {
        let selection = with_companies();
        assert_eq!(selection.state(), SelectionState::NoCompany);
        assert_eq!(selection.resolve(operator()), Err(SelectionError::Incomplete));
    }

    #[test]
    fn test_full_flow_resolves_session() {
        let mut selection = with_companies();
        let ticket = selection.select_company(&CompanyId::new("a")).unwrap();
        assert_eq!(selection.state(), SelectionState::CompanyChosen);
        assert_eq!(ticket.company_id().as_str(), "a");

        selection
            .apply_locations::<()>(&ticket, Ok(vec![location("a1", "a"), location("a2", "a")]))
            .unwrap();
        selection.select_location(&LocationId::new("a2")).unwrap();
        assert_eq!(selection.state(), SelectionState::FullyResolved);

        let session = selection.resolve(operator()).unwrap();
        assert_eq!(session.company().id.as_str(), "a");
        assert_eq!(session.location().id.as_str(), "a2");
    }

    #[test]
    fn test_unknown_company_is_rejected() {
        let mut selection = with_companies();
        assert_eq!(
            selection.select_company(&CompanyId::new("zzz")),
            Err(SelectionError::UnknownCompany(CompanyId::new("zzz")))
        );
        assert_eq!(selection.state(), SelectionState::NoCompany);
    }

    #[test]
    fn test_location_requires_company() {
        let mut selection = with_companies();
        assert_eq!(
            selection.select_location(&LocationId::new("a1")),
            Err(SelectionError::NoCompany)
        );
    }

    #[test]
    fn test_reselecting_company_clears_location() {
        let mut selection = with_companies();
        let ticket = selection.select_company(&CompanyId::new("a")).unwrap();
        selection
            .apply_locations::<()>(&ticket, Ok(vec![location("a1", "a")]))
            .unwrap();
        selection.select_location(&LocationId::new("a1")).unwrap();
        assert_eq!(selection.state(), SelectionState::FullyResolved);

        selection.select_company(&CompanyId::new("b")).unwrap();

        assert_eq!(selection.state(), SelectionState::CompanyChosen);
        assert!(selection.selected_location().is_none());
        assert!(selection.locations().is_empty());
        assert!(!selection.locations_loaded());
        assert_eq!(selection.resolve(operator()), Err(SelectionError::Incomplete));
        // The old company's location is not selectable any more.
        assert_eq!(
            selection.select_location(&LocationId::new("a1")),
            Err(SelectionError::UnknownLocation(LocationId::new("a1")))
        );
    }

    #[test]
    fn test_stale_location_response_is_dropped() {
        let mut selection = with_companies();
        let ticket_a = selection.select_company(&CompanyId::new("a")).unwrap();
        let ticket_b = selection.select_company(&CompanyId::new("b")).unwrap();

        let outcome = selection
            .apply_locations::<()>(&ticket_a, Ok(vec![location("a1", "a")]))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(selection.locations().is_empty());

        let outcome = selection
            .apply_locations::<()>(&ticket_b, Ok(vec![location("b1", "b")]))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(selection.locations().len(), 1);
    }

    #[test]
    fn test_stale_after_reselecting_same_company() {
        let mut selection = with_companies();
        let first = selection.select_company(&CompanyId::new("a")).unwrap();
        let _second = selection.select_company(&CompanyId::new("a")).unwrap();
        assert_eq!(
            selection.apply_locations::<()>(&first, Ok(vec![location("a1", "a")])),
            Ok(LoadOutcome::Stale)
        );
    }

    #[test]
    fn test_empty_location_list_is_not_an_error() {
        let mut selection = with_companies();
        let ticket = selection.select_company(&CompanyId::new("a")).unwrap();
        let outcome = selection.apply_locations::<()>(&ticket, Ok(vec![])).unwrap();

        assert_eq!(outcome, LoadOutcome::Applied);
        assert!(selection.locations_loaded());
        assert!(selection.locations().is_empty());
        assert_eq!(selection.state(), SelectionState::CompanyChosen);
    }

    #[test]
    fn test_failed_location_fetch_returns_error() {
        let mut selection = with_companies();
        let ticket = selection.select_company(&CompanyId::new("a")).unwrap();
        assert_eq!(
            selection.apply_locations(&ticket, Err("offline")),
            Err("offline")
        );
        assert!(!selection.locations_loaded());
    }

    #[test]
    fn test_foreign_locations_are_discarded() {
        let mut selection = with_companies();
        let ticket = selection.select_company(&CompanyId::new("a")).unwrap();
        selection
            .apply_locations::<()>(&ticket, Ok(vec![location("a1", "a"), location("b1", "b")]))
            .unwrap();

        assert_eq!(selection.locations().len(), 1);
        assert_eq!(
            selection.select_location(&LocationId::new("b1")),
            Err(SelectionError::UnknownLocation(LocationId::new("b1")))
        );
    }

    #[test]
    fn test_set_companies_resets_selection() {
        let mut selection = with_companies();
        let ticket = selection.select_company(&CompanyId::new("a")).unwrap();
        selection.set_companies(vec![company("a")]);

        assert_eq!(selection.state(), SelectionState::NoCompany);
        assert_eq!(
            selection.apply_locations::<()>(&ticket, Ok(vec![location("a1", "a")])),
            Ok(LoadOutcome::Stale)
        );
    }
}
