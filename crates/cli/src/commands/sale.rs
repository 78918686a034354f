//! The `sale` command: build a cart and optionally check it out.

use till_core::{CompanyId, LocationId};
use tracing::info;

use super::{CommandError, ItemSpec, open_session};

/// Add `items` to a fresh cart at `location`, then print the cart or check
/// out and print the receipt as JSON.
pub async fn run(
    operator: Option<&str>,
    company: &CompanyId,
    location: &LocationId,
    items: &[ItemSpec],
    checkout: bool,
) -> Result<(), CommandError> {
    let mut register = open_session(operator, company, location).await?;

    for item in items {
        register.add_item(&item.product_id)?;
        if let Some(quantity) = item.quantity {
            register.set_quantity(&item.product_id, quantity)?;
        }
    }

    if checkout {
        let receipt = register.checkout()?;
        info!(sale_id = %receipt.sale_id, "Receipt issued");
        let json = serde_json::to_string_pretty(&receipt)?;

        #[allow(clippy::print_stdout)]
        {
            println!("{json}");
        }
        return Ok(());
    }

    let totals = register.totals()?;

    #[allow(clippy::print_stdout)]
    {
        for line in register.lines()? {
            println!(
                "{:<32} {:>4} × {:>10} = {:>10}",
                line.name(),
                line.quantity(),
                line.unit_price(),
                line.line_total()
            );
        }
        println!("{:>62}", format!("Subtotal {}", totals.subtotal));
        println!("{:>62}", format!("Tax {}", totals.tax));
        println!("{:>62}", format!("Total {}", totals.total));
    }
    Ok(())
}
