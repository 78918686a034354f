//! Read-only commands: companies, locations and catalog listings.

use till_core::{
    CategoryFilter, CompanyId, DEFAULT_CATEGORIES, IconLookup, KeywordIcons, LocationId,
};

use super::{CommandError, open_register, open_session};

/// Print the companies the operator may sell for.
pub async fn companies(operator: Option<&str>) -> Result<(), CommandError> {
    let mut register = open_register(operator).await?;
    let companies = register.load_companies().await?;

    #[allow(clippy::print_stdout)]
    {
        if companies.is_empty() {
            println!("No companies available.");
        }
        for company in companies {
            println!("{:>8}  {}", company.id, company.name);
        }
    }
    Ok(())
}

/// Print a company's locations.
pub async fn locations(operator: Option<&str>, company: &CompanyId) -> Result<(), CommandError> {
    let mut register = open_register(operator).await?;
    register.load_companies().await?;
    let locations = register.select_company(company).await?;

    #[allow(clippy::print_stdout)]
    {
        if locations.is_empty() {
            println!("No locations available.");
        }
        for location in locations {
            println!("{:>8}  {:<40} {}", location.id, location.label(), location.address);
        }
    }
    Ok(())
}

/// Print the products at a location that pass the filters.
pub async fn catalog(
    operator: Option<&str>,
    company: &CompanyId,
    location: &LocationId,
    category: &CategoryFilter,
    search: &str,
) -> Result<(), CommandError> {
    let register = open_session(operator, company, location).await?;
    let icons = KeywordIcons;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", category_tabs(category));
        let mut shown = 0_usize;
        for product in register.visible_products(category, search)? {
            println!(
                "{} {:>8}  {:<32} {:>10}  {}",
                icons.icon_for(product),
                product.id,
                product.name,
                product.unit_price,
                product.sku.as_deref().unwrap_or("-"),
            );
            shown += 1;
        }
        if shown == 0 {
            println!("No products match \"{search}\" in {category}.");
        }
    }
    Ok(())
}

/// The register's category tabs on one line, the active one in brackets.
fn category_tabs(active: &CategoryFilter) -> String {
    DEFAULT_CATEGORIES
        .iter()
        .map(|tab| {
            if tab.parse::<CategoryFilter>().is_ok_and(|filter| &filter == active) {
                format!("[{tab}]")
            } else {
                (*tab).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
