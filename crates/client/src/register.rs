//! The register: one operator, one session, one cart.
//!
//! [`Register`] owns all client state and moves through three phases:
//!
//! ```text
//! LoggedOut --login--> Selecting --start_session--> Selling
//!     ^                                                |
//!     +------------------------logout------------------+
//! ```
//!
//! Network calls go through the [`BackOffice`] the register was built with.
//! The async operations (`login`, `select_company`, `start_session`,
//! `reload_catalog`) fetch and apply in one step. A UI that wants to keep
//! handling input while a fetch runs can use the split form instead:
//! [`Register::choose_company`] / [`Register::deliver_locations`] and
//! [`Register::begin_catalog_load`] / [`Register::deliver_catalog`]. Responses
//! delivered for a superseded ticket are dropped.

use std::sync::Arc;

use till_core::{
    CartEngine, Catalog, CatalogTicket, CategoryFilter, Company, CompanyId, ContextSelection,
    FlatRateTax, LineItem, LoadOutcome, Location, LocationId, LocationTicket, MoneyTotals, Product,
    ProductId, SelectionState, Session, TaxPolicy, User,
};
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, BackOffice, Credentials};
use crate::error::{PosError, Result};
use crate::receipt::Receipt;

const LOGGED_OUT: &str = "logged out";
const SELECTING: &str = "selecting a location";
const SELLING: &str = "selling";

enum Phase {
    LoggedOut,
    Selecting {
        user: User,
        selection: ContextSelection,
    },
    Selling(Box<Selling>),
}

struct Selling {
    session: Session,
    catalog: Catalog,
    cart: CartEngine,
}

/// Point-of-sale controller over a back office `B`.
pub struct Register<B> {
    back_office: B,
    tax_policy: Arc<dyn TaxPolicy>,
    phase: Phase,
}

impl<B: BackOffice> Register<B> {
    /// Logged-out register taxing at [`FlatRateTax::DEFAULT_RATE`].
    #[must_use]
    pub fn new(back_office: B) -> Self {
        Self::with_tax_policy(back_office, Arc::new(FlatRateTax::default()))
    }

    #[must_use]
    pub fn with_tax_policy(back_office: B, tax_policy: Arc<dyn TaxPolicy>) -> Self {
        Self {
            back_office,
            tax_policy,
            phase: Phase::LoggedOut,
        }
    }

    pub const fn back_office(&self) -> &B {
        &self.back_office
    }

    /// Human-readable name of the current phase.
    pub const fn phase_name(&self) -> &'static str {
        match self.phase {
            Phase::LoggedOut => LOGGED_OUT,
            Phase::Selecting { .. } => SELECTING,
            Phase::Selling(_) => SELLING,
        }
    }

    /// The logged-in operator, if any.
    pub fn user(&self) -> Option<&User> {
        match &self.phase {
            Phase::LoggedOut => None,
            Phase::Selecting { user, .. } => Some(user),
            Phase::Selling(selling) => Some(selling.session.user()),
        }
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Authenticate the operator.
    ///
    /// # Errors
    ///
    /// - `WrongPhase` if someone is already logged in
    /// - `InvalidCredentials` if the back office rejects the credentials
    /// - `ServiceUnavailable` if the back office cannot be reached
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&User> {
        if !matches!(self.phase, Phase::LoggedOut) {
            return Err(PosError::WrongPhase(self.phase_name()));
        }

        let user = self.back_office.authenticate(credentials).await?;
        info!(user_id = %user.id, "Operator logged in");
        self.phase = Phase::Selecting {
            user,
            selection: ContextSelection::new(),
        };
        self.user().ok_or(PosError::WrongPhase(LOGGED_OUT))
    }

    /// Drop the session and any open cart. Always succeeds.
    pub fn logout(&mut self) {
        if let Some(user) = self.user() {
            info!(user_id = %user.id, "Operator logged out");
        }
        self.phase = Phase::LoggedOut;
    }

    // =========================================================================
    // Context selection
    // =========================================================================

    /// Fetch the companies the operator may sell for.
    ///
    /// Replaces any earlier list and clears the current choice.
    ///
    /// # Errors
    ///
    /// `WrongPhase` outside selection, `ServiceUnavailable` on fetch failure.
    /// A failed fetch leaves the previous list and choice in place.
    #[instrument(skip(self))]
    pub async fn load_companies(&mut self) -> Result<&[Company]> {
        self.selection_mut()?;
        let companies = self.back_office.list_companies().await?;
        let selection = self.selection_mut()?;
        selection.set_companies(companies);
        Ok(selection.companies())
    }

    /// Choose a company and fetch its locations.
    ///
    /// # Errors
    ///
    /// - `WrongPhase` outside selection
    /// - `InvalidSelection` if the company was not offered
    /// - `ServiceUnavailable` if the location fetch fails; the company stays
    ///   chosen with no locations, so the call can be retried
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn select_company(&mut self, company_id: &CompanyId) -> Result<&[Location]> {
        let ticket = self.choose_company(company_id)?;
        let result = self.back_office.list_locations(ticket.company_id()).await;
        self.deliver_locations(&ticket, result)?;
        Ok(self.selection()?.locations())
    }

    /// Choose a company without fetching.
    ///
    /// The caller fetches `ticket.company_id()`'s locations and hands the
    /// result to [`deliver_locations`](Self::deliver_locations).
    ///
    /// # Errors
    ///
    /// `WrongPhase` outside selection, `InvalidSelection` if the company was
    /// not offered.
    pub fn choose_company(&mut self, company_id: &CompanyId) -> Result<LocationTicket> {
        Ok(self.selection_mut()?.select_company(company_id)?)
    }

    /// Apply a location fetch started by [`choose_company`](Self::choose_company).
    ///
    /// # Errors
    ///
    /// `WrongPhase` outside selection, `ServiceUnavailable` if the current
    /// fetch failed. Failures of superseded fetches are ignored.
    pub fn deliver_locations(
        &mut self,
        ticket: &LocationTicket,
        result: std::result::Result<Vec<Location>, ApiError>,
    ) -> Result<LoadOutcome> {
        Ok(self.selection_mut()?.apply_locations(ticket, result)?)
    }

    /// Choose one of the chosen company's locations.
    ///
    /// # Errors
    ///
    /// `WrongPhase` outside selection, `InvalidSelection` if no company is
    /// chosen or the location is not one of its locations.
    pub fn select_location(&mut self, location_id: &LocationId) -> Result<()> {
        Ok(self.selection_mut()?.select_location(location_id)?)
    }

    /// Current selection, while selecting.
    pub fn selection(&self) -> Result<&ContextSelection> {
        match &self.phase {
            Phase::Selecting { selection, .. } => Ok(selection),
            _ => Err(PosError::WrongPhase(self.phase_name())),
        }
    }

    fn selection_mut(&mut self) -> Result<&mut ContextSelection> {
        let phase = self.phase_name();
        match &mut self.phase {
            Phase::Selecting { selection, .. } => Ok(selection),
            _ => Err(PosError::WrongPhase(phase)),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Resolve the selection into a session and load its catalog.
    ///
    /// # Errors
    ///
    /// - `WrongPhase` outside selection
    /// - `InvalidSelection` unless a company and one of its locations are
    ///   chosen
    /// - `ServiceUnavailable` if the first catalog load fails; the register
    ///   is selling regardless, with an empty catalog, and
    ///   [`reload_catalog`](Self::reload_catalog) can be retried
    #[instrument(skip(self))]
    pub async fn start_session(&mut self) -> Result<&Session> {
        let session = match &self.phase {
            Phase::Selecting { user, selection } => {
                if selection.state() != SelectionState::FullyResolved {
                    debug!(state = ?selection.state(), "Session requested before selection resolved");
                }
                selection.resolve(user.clone())?
            }
            _ => return Err(PosError::WrongPhase(self.phase_name())),
        };

        info!(
            company_id = %session.company().id,
            location_id = %session.location().id,
            "Session started"
        );
        let location = session.location().clone();
        self.phase = Phase::Selling(Box::new(Selling {
            catalog: Catalog::new(location.id.clone()),
            cart: CartEngine::with_tax_policy(location, Arc::clone(&self.tax_policy)),
            session,
        }));

        self.reload_catalog().await?;
        self.session()
    }

    /// The active session, while selling.
    pub fn session(&self) -> Result<&Session> {
        Ok(&self.selling()?.session)
    }

    fn selling(&self) -> Result<&Selling> {
        match &self.phase {
            Phase::Selling(selling) => Ok(selling),
            _ => Err(PosError::WrongPhase(self.phase_name())),
        }
    }

    fn selling_mut(&mut self) -> Result<&mut Selling> {
        let phase = self.phase_name();
        match &mut self.phase {
            Phase::Selling(selling) => Ok(selling),
            _ => Err(PosError::WrongPhase(phase)),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the session location's products.
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless selling, `ServiceUnavailable` if the fetch fails.
    /// A failed reload keeps the products already loaded.
    #[instrument(skip(self))]
    pub async fn reload_catalog(&mut self) -> Result<LoadOutcome> {
        let ticket = self.begin_catalog_load()?;
        let result = self.back_office.load_catalog(ticket.location_id()).await;
        self.deliver_catalog(&ticket, result)
    }

    /// Start a catalog load without fetching.
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless selling.
    pub fn begin_catalog_load(&mut self) -> Result<CatalogTicket> {
        Ok(self.selling_mut()?.catalog.begin_load())
    }

    /// Apply a load started by [`begin_catalog_load`](Self::begin_catalog_load).
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless selling, `ServiceUnavailable` if the current load
    /// failed.
    pub fn deliver_catalog(
        &mut self,
        ticket: &CatalogTicket,
        result: std::result::Result<Vec<Product>, ApiError>,
    ) -> Result<LoadOutcome> {
        let catalog = &mut self.selling_mut()?.catalog;
        catalog.apply(ticket, result).map_err(|e| {
            warn!(
                error = %e,
                kept = catalog.products().len(),
                "Catalog load failed, keeping previous products"
            );
            PosError::from(e)
        })
    }

    /// The loaded catalog, while selling.
    pub fn catalog(&self) -> Result<&Catalog> {
        Ok(&self.selling()?.catalog)
    }

    /// Catalog products matching `filter` and `search`, in catalog order.
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless selling.
    pub fn visible_products<'a>(
        &'a self,
        filter: &'a CategoryFilter,
        search: &str,
    ) -> Result<impl Iterator<Item = &'a Product> + Clone + use<'a, B>> {
        Ok(self.selling()?.catalog.filtered(filter, search))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of a catalog product.
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless selling, `NotFound` if the product is not in the
    /// loaded catalog.
    pub fn add_item(&mut self, product_id: &ProductId) -> Result<()> {
        let Selling { catalog, cart, .. } = self.selling_mut()?;
        let product = catalog
            .product(product_id)
            .ok_or_else(|| PosError::NotFound(format!("product {product_id} in catalog")))?;
        cart.add_item(product);
        Ok(())
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless selling, `NotFound` when a positive quantity is
    /// set on a product with no line.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<()> {
        Ok(self.selling_mut()?.cart.set_quantity(product_id, quantity)?)
    }

    /// # Errors
    ///
    /// `WrongPhase` unless selling, `NotFound` if the product has no line.
    pub fn increment(&mut self, product_id: &ProductId) -> Result<()> {
        Ok(self.selling_mut()?.cart.increment(product_id)?)
    }

    /// Decrement a line, removing it at zero.
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless selling, `NotFound` if the product has no line.
    pub fn decrement(&mut self, product_id: &ProductId) -> Result<()> {
        Ok(self.selling_mut()?.cart.decrement(product_id)?)
    }

    /// # Errors
    ///
    /// `WrongPhase` unless selling. Removing an absent product is a no-op.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<()> {
        self.selling_mut()?.cart.remove_item(product_id);
        Ok(())
    }

    /// # Errors
    ///
    /// `WrongPhase` unless selling.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.selling_mut()?.cart.clear();
        Ok(())
    }

    /// Cart lines in display order.
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless selling.
    pub fn lines(&self) -> Result<&[LineItem]> {
        Ok(self.selling()?.cart.lines())
    }

    /// # Errors
    ///
    /// `WrongPhase` unless selling.
    pub fn cart(&self) -> Result<&CartEngine> {
        Ok(&self.selling()?.cart)
    }

    /// Totals of the current cart, computed on every call.
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless selling.
    pub fn totals(&self) -> Result<MoneyTotals> {
        Ok(self.selling()?.cart.compute_totals())
    }

    /// Complete the sale and empty the cart.
    ///
    /// No payment is taken.
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless selling, `EmptyCart` if there is nothing to sell.
    #[instrument(skip(self))]
    pub fn checkout(&mut self) -> Result<Receipt> {
        let Selling { session, cart, .. } = self.selling_mut()?;
        if cart.is_empty() {
            return Err(PosError::EmptyCart);
        }

        let receipt = Receipt::from_cart(session, cart);
        cart.clear();
        info!(
            sale_id = %receipt.sale_id,
            lines = receipt.lines.len(),
            total = %receipt.totals.total,
            "Sale completed"
        );
        Ok(receipt)
    }
}
