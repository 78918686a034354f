//! Operator and organisation reference data.
//!
//! Companies and locations are fetched from the back office and never
//! mutated client-side.

use serde::{Deserialize, Serialize};

use super::id::{CompanyId, LocationId, UserId};

/// An authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Back-office user ID.
    pub id: UserId,
    /// Name shown in the register header.
    pub display_name: String,
}

/// A company the operator can sell for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

/// A store location belonging to one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub address: String,
    pub city: String,
    /// Owning company.
    pub company_id: CompanyId,
}

impl Location {
    /// Whether this location belongs to `company`.
    #[must_use]
    pub fn belongs_to(&self, company: &Company) -> bool {
        self.company_id == company.id
    }

    /// One-line description used on receipts (`"name, address, city"`).
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{}, {}, {}", self.name, self.address, self.city)
    }

    /// Label used in location pickers (`"name - city"`).
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {}", self.name, self.city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downtown() -> Location {
        Location {
            id: LocationId::new("loc-1"),
            name: "Downtown".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            company_id: CompanyId::new("acme"),
        }
    }

    #[test]
    fn test_belongs_to() {
        let acme = Company {
            id: CompanyId::new("acme"),
            name: "Acme".to_string(),
        };
        let globex = Company {
            id: CompanyId::new("globex"),
            name: "Globex".to_string(),
        };
        assert!(downtown().belongs_to(&acme));
        assert!(!downtown().belongs_to(&globex));
    }

    #[test]
    fn test_summary_and_label() {
        assert_eq!(downtown().summary(), "Downtown, 1 Main St, Springfield");
        assert_eq!(downtown().label(), "Downtown - Springfield");
    }
}
