use regional_marketplace_api::rules::eligibility::{
    Ineligible, OrderTerms, check_order_quantity, is_orderable,
};

fn terms() -> OrderTerms {
    OrderTerms {
        is_available: true,
        stock_quantity: 10,
        min_order_quantity: 2,
        max_order_quantity: Some(5),
    }
}

#[test]
fn quantity_within_all_bounds_is_orderable() {
    assert!(is_orderable(&terms(), 2));
    assert!(is_orderable(&terms(), 5));
    assert_eq!(check_order_quantity(&terms(), 3), Ok(()));
}

#[test]
fn unavailable_product_is_never_orderable() {
    let terms = OrderTerms {
        is_available: false,
        ..terms()
    };
    assert_eq!(check_order_quantity(&terms, 3), Err(Ineligible::Unavailable));
}

#[test]
fn empty_stock_is_reported_before_quantity_rules() {
    let terms = OrderTerms {
        stock_quantity: 0,
        ..terms()
    };
    // quantity 1 is also below the minimum; stock wins
    assert_eq!(check_order_quantity(&terms, 1), Err(Ineligible::OutOfStock));
}

#[test]
fn below_minimum_is_rejected() {
    assert_eq!(
        check_order_quantity(&terms(), 1),
        Err(Ineligible::BelowMinimum { min: 2 })
    );
}

#[test]
fn above_maximum_is_rejected_even_with_stock() {
    assert_eq!(
        check_order_quantity(&terms(), 6),
        Err(Ineligible::AboveMaximum { max: 5 })
    );
}

#[test]
fn quantity_above_stock_is_rejected() {
    let terms = OrderTerms {
        stock_quantity: 3,
        max_order_quantity: None,
        ..terms()
    };
    assert_eq!(
        check_order_quantity(&terms, 4),
        Err(Ineligible::InsufficientStock { stock: 3 })
    );
    assert!(is_orderable(&terms, 3));
}

#[test]
fn no_maximum_means_only_stock_caps_quantity() {
    let terms = OrderTerms {
        max_order_quantity: None,
        ..terms()
    };
    assert!(is_orderable(&terms, 10));
    assert!(!is_orderable(&terms, 11));
}

#[test]
fn rejection_reasons_read_naturally() {
    assert_eq!(
        Ineligible::BelowMinimum { min: 2 }.to_string(),
        "minimum order quantity is 2"
    );
    assert_eq!(Ineligible::OutOfStock.to_string(), "product is out of stock");
}
