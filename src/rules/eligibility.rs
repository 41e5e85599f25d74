use thiserror::Error;

use crate::entity::products::Model as ProductModel;

/// The subset of a product that decides whether a quantity can be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerms {
    pub is_available: bool,
    pub stock_quantity: i32,
    pub min_order_quantity: i32,
    pub max_order_quantity: Option<i32>,
}

impl From<&ProductModel> for OrderTerms {
    fn from(product: &ProductModel) -> Self {
        Self {
            is_available: product.is_available,
            stock_quantity: product.stock_quantity,
            min_order_quantity: product.min_order_quantity,
            max_order_quantity: product.max_order_quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Ineligible {
    #[error("product is not available")]
    Unavailable,
    #[error("product is out of stock")]
    OutOfStock,
    #[error("minimum order quantity is {min}")]
    BelowMinimum { min: i32 },
    #[error("maximum order quantity is {max}")]
    AboveMaximum { max: i32 },
    #[error("only {stock} in stock")]
    InsufficientStock { stock: i32 },
}

/// Returns the first rule the requested quantity breaks.
///
/// Checks run in a fixed order: availability, stock on hand, minimum,
/// maximum, then quantity against stock.
pub fn check_order_quantity(terms: &OrderTerms, quantity: i32) -> Result<(), Ineligible> {
    if !terms.is_available {
        return Err(Ineligible::Unavailable);
    }
    if terms.stock_quantity <= 0 {
        return Err(Ineligible::OutOfStock);
    }
    if quantity < terms.min_order_quantity {
        return Err(Ineligible::BelowMinimum {
            min: terms.min_order_quantity,
        });
    }
    if let Some(max) = terms.max_order_quantity {
        if quantity > max {
            return Err(Ineligible::AboveMaximum { max });
        }
    }
    if quantity > terms.stock_quantity {
        return Err(Ineligible::InsufficientStock {
            stock: terms.stock_quantity,
        });
    }
    Ok(())
}

pub fn is_orderable(terms: &OrderTerms, quantity: i32) -> bool {
    check_order_quantity(terms, quantity).is_ok()
}
